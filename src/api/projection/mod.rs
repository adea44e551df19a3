// Response-shaped views of stored rows. Each view is computed from the row and
// the requester; nothing here writes to the store.

mod category;
mod comment;
mod follower;
mod like;
mod post;
mod product;
mod profile;

pub use category::CategoryView;
pub use comment::CommentView;
pub use follower::FollowerView;
pub use like::LikeView;
pub use post::{comments_count, like_id, likes_count, PostView};
pub use product::{category_name, ProductView};
pub use profile::{following_id, ProfileView};

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::api::format::naturaltime;
use crate::database::models::{Profile, User};
use crate::database::{Database, DatabaseError};
use crate::filter::FilterData;
use crate::middleware::Requester;

/// Per-request projection context
pub struct Projector<'a> {
    pub db: &'a Database,
    pub requester: &'a Requester,
    pub now: DateTime<Utc>,
}

impl<'a> Projector<'a> {
    pub fn new(db: &'a Database, requester: &'a Requester) -> Self {
        Self {
            db,
            requester,
            now: Utc::now(),
        }
    }

    pub fn timestamp(&self, value: DateTime<Utc>) -> String {
        naturaltime(value, self.now)
    }

    /// Display handle for a user id
    pub async fn username(&self, user_id: i64) -> Result<String, DatabaseError> {
        Ok(self
            .db
            .repo::<User>()
            .get(user_id)
            .await?
            .map(|user| user.username)
            .unwrap_or_default())
    }

    pub async fn profile_of(&self, user_id: i64) -> Result<Option<Profile>, DatabaseError> {
        self.db
            .repo::<Profile>()
            .select_one(FilterData::new().with_where(json!({ "owner_id": user_id })))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Like, NewLike, NewPost, NewUser, Post};
    use crate::middleware::AuthUser;

    async fn user(db: &Database, name: &str) -> User {
        db.repo::<User>()
            .insert(&NewUser {
                username: name.to_string(),
                password_hash: String::new(),
                is_staff: false,
            })
            .await
            .unwrap()
    }

    fn requester(user: &User) -> Requester {
        Requester::User(AuthUser {
            user_id: user.id,
            username: user.username.clone(),
            is_staff: false,
        })
    }

    #[tokio::test]
    async fn post_view_is_relative_to_the_requester() {
        let db = Database::memory();
        let ann = user(&db, "ann").await;
        let bob = user(&db, "bob").await;
        let post: Post = db
            .repo::<Post>()
            .insert(&NewPost {
                owner_id: ann.id,
                title: "p1".to_string(),
                content: String::new(),
                image: "/media/default_post.jpg".to_string(),
                image_filter: "normal".to_string(),
            })
            .await
            .unwrap();
        let like: Like = db
            .repo::<Like>()
            .insert(&NewLike {
                owner_id: bob.id,
                post_id: post.id,
            })
            .await
            .unwrap();

        let as_bob = requester(&bob);
        let view = PostView::project(&post, &Projector::new(&db, &as_bob)).await.unwrap();
        assert_eq!(view.owner, "ann");
        assert!(!view.is_owner);
        assert_eq!(view.like_id, Some(like.id));
        assert_eq!((view.likes_count, view.comments_count), (1, 0));
        assert_eq!(view.created_at, "now");

        let as_ann = requester(&ann);
        let view = PostView::project(&post, &Projector::new(&db, &as_ann)).await.unwrap();
        assert!(view.is_owner);
        assert_eq!(view.like_id, None);
        // Users created without the lifecycle hook have no profile
        assert_eq!(view.profile_id, None);

        let anonymous = Requester::Anonymous;
        assert_eq!(like_id(&db, &post, &anonymous).await.unwrap(), None);
    }
}
