use serde::Serialize;

use crate::api::projection::Projector;
use crate::database::models::Follower;
use crate::database::DatabaseError;

#[derive(Debug, Serialize)]
pub struct FollowerView {
    pub id: i64,
    pub owner: String,
    pub followed: i64,
    pub followed_name: String,
    pub created_at: String,
}

impl FollowerView {
    pub async fn project(follower: &Follower, ctx: &Projector<'_>) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: follower.id,
            owner: ctx.username(follower.owner_id).await?,
            followed: follower.followed_id,
            followed_name: ctx.username(follower.followed_id).await?,
            created_at: ctx.timestamp(follower.created_at),
        })
    }
}
