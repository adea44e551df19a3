pub mod format;
pub mod pagination;
pub mod projection;

pub use format::naturaltime;
pub use pagination::{Page, PageRequest};
pub use projection::Projector;
