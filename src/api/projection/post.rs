use serde::Serialize;
use serde_json::json;

use crate::api::projection::Projector;
use crate::database::models::{Comment, Like, Post};
use crate::database::{Database, DatabaseError};
use crate::filter::FilterData;
use crate::middleware::Requester;
use crate::permissions::is_owner;

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: i64,
    pub owner: String,
    pub is_owner: bool,
    pub profile_id: Option<i64>,
    pub profile_image: Option<String>,
    pub title: String,
    pub content: String,
    pub image: String,
    pub image_filter: String,
    pub like_id: Option<i64>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl PostView {
    pub async fn project(post: &Post, ctx: &Projector<'_>) -> Result<Self, DatabaseError> {
        let profile = ctx.profile_of(post.owner_id).await?;
        Ok(Self {
            id: post.id,
            owner: ctx.username(post.owner_id).await?,
            is_owner: is_owner(post.owner_id, ctx.requester),
            profile_id: profile.as_ref().map(|p| p.id),
            profile_image: profile.map(|p| p.image),
            title: post.title.clone(),
            content: post.content.clone(),
            image: post.image.clone(),
            image_filter: post.image_filter.clone(),
            like_id: like_id(ctx.db, post, ctx.requester).await?,
            likes_count: likes_count(ctx.db, post).await?,
            comments_count: comments_count(ctx.db, post).await?,
            created_at: ctx.timestamp(post.created_at),
            updated_at: ctx.timestamp(post.updated_at),
        })
    }
}

/// The requester's like on this post, if any
pub async fn like_id(db: &Database, post: &Post, requester: &Requester) -> Result<Option<i64>, DatabaseError> {
    let Some(user_id) = requester.user_id() else {
        return Ok(None);
    };
    let like = db
        .repo::<Like>()
        .select_one(FilterData::new().with_where(json!({ "owner_id": user_id, "post_id": post.id })))
        .await?;
    Ok(like.map(|l| l.id))
}

pub async fn likes_count(db: &Database, post: &Post) -> Result<i64, DatabaseError> {
    db.repo::<Like>()
        .count(FilterData::new().with_where(json!({ "post_id": post.id })))
        .await
}

pub async fn comments_count(db: &Database, post: &Post) -> Result<i64, DatabaseError> {
    db.repo::<Comment>()
        .count(FilterData::new().with_where(json!({ "post_id": post.id })))
        .await
}
