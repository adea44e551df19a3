pub mod error;
pub mod implementations;
pub mod pipeline;
pub mod traits;

pub use error::ObserverError;
pub use implementations::ProfileProvisioner;
pub use pipeline::ObserverPipeline;
pub use traits::{Observer, Operation, UserObserver};
