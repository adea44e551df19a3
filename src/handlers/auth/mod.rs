// handlers/auth/mod.rs - Identity endpoints
//
// POST /auth/registration/   create a user (and, through observers, its profile)
// POST /auth/login/          exchange credentials for a bearer token
// GET  /auth/user/           the authenticated user

pub mod login;
pub mod registration;
pub mod user;

pub use login::login_post;
pub use registration::registration_post;
pub use user::{user_get, CurrentUser};
