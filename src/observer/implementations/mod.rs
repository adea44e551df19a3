pub mod profile_provisioner;

pub use profile_provisioner::ProfileProvisioner;
