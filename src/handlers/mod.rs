// One module per resource. Collection handlers are `list` and `create`,
// item handlers `retrieve`, `update` and `destroy`.

pub mod auth;
pub mod categories;
pub mod comments;
pub mod followers;
pub mod likes;
pub mod posts;
pub mod products;
pub mod profiles;
pub mod root;
pub mod utils;
