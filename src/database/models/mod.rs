pub mod category;
pub mod comment;
pub mod follower;
pub mod like;
pub mod post;
pub mod product;
pub mod profile;
pub mod user;

pub use category::{Category, CategoryChanges, NewCategory};
pub use comment::{Comment, CommentChanges, NewComment};
pub use follower::{Follower, NewFollower};
pub use like::{Like, NewLike};
pub use post::{NewPost, Post, PostChanges, DEFAULT_IMAGE_FILTER, IMAGE_FILTERS};
pub use product::{NewProduct, Product, ProductChanges};
pub use profile::{NewProfile, Profile, ProfileChanges};
pub use user::{NewUser, User, UserChanges};

/// Rows that belong to exactly one user
pub trait Owned {
    fn owner_id(&self) -> i64;
}

macro_rules! impl_owned {
    ($($ty:ty),*) => {
        $(impl Owned for $ty {
            fn owner_id(&self) -> i64 {
                self.owner_id
            }
        })*
    };
}

impl_owned!(Profile, Post, Comment, Like, Follower, Product);
