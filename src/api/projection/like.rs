use serde::Serialize;

use crate::api::projection::Projector;
use crate::database::models::Like;
use crate::database::DatabaseError;

#[derive(Debug, Serialize)]
pub struct LikeView {
    pub id: i64,
    pub owner: String,
    pub post: i64,
    pub created_at: String,
}

impl LikeView {
    pub async fn project(like: &Like, ctx: &Projector<'_>) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: like.id,
            owner: ctx.username(like.owner_id).await?,
            post: like.post_id,
            created_at: ctx.timestamp(like.created_at),
        })
    }
}
