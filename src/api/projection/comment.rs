use serde::Serialize;

use crate::api::projection::Projector;
use crate::database::models::Comment;
use crate::database::DatabaseError;
use crate::permissions::is_owner;

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub owner: String,
    pub is_owner: bool,
    pub profile_id: Option<i64>,
    pub profile_image: Option<String>,
    pub post: i64,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CommentView {
    pub async fn project(comment: &Comment, ctx: &Projector<'_>) -> Result<Self, DatabaseError> {
        let profile = ctx.profile_of(comment.owner_id).await?;
        Ok(Self {
            id: comment.id,
            owner: ctx.username(comment.owner_id).await?,
            is_owner: is_owner(comment.owner_id, ctx.requester),
            profile_id: profile.as_ref().map(|p| p.id),
            profile_image: profile.map(|p| p.image),
            post: comment.post_id,
            content: comment.content.clone(),
            created_at: ctx.timestamp(comment.created_at),
            updated_at: ctx.timestamp(comment.updated_at),
        })
    }
}
