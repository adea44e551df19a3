use serde::Serialize;
use serde_json::json;

use crate::api::projection::Projector;
use crate::database::models::{Follower, Post, Profile};
use crate::database::{Database, DatabaseError};
use crate::filter::FilterData;
use crate::middleware::Requester;
use crate::permissions::is_owner;

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: i64,
    pub owner: String,
    pub is_owner: bool,
    pub following_id: Option<i64>,
    pub name: String,
    pub content: String,
    pub image: String,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl ProfileView {
    pub async fn project(profile: &Profile, ctx: &Projector<'_>) -> Result<Self, DatabaseError> {
        let owner = profile.owner_id;
        Ok(Self {
            id: profile.id,
            owner: ctx.username(owner).await?,
            is_owner: is_owner(owner, ctx.requester),
            following_id: following_id(ctx.db, profile, ctx.requester).await?,
            name: profile.name.clone(),
            content: profile.content.clone(),
            image: profile.image.clone(),
            posts_count: count::<Post>(ctx.db, json!({ "owner_id": owner })).await?,
            followers_count: count::<Follower>(ctx.db, json!({ "followed_id": owner })).await?,
            following_count: count::<Follower>(ctx.db, json!({ "owner_id": owner })).await?,
            created_at: ctx.timestamp(profile.created_at),
            updated_at: ctx.timestamp(profile.updated_at),
        })
    }
}

/// The requester's follow edge to this profile's owner, if any
pub async fn following_id(
    db: &Database,
    profile: &Profile,
    requester: &Requester,
) -> Result<Option<i64>, DatabaseError> {
    let Some(user_id) = requester.user_id() else {
        return Ok(None);
    };
    let edge = db
        .repo::<Follower>()
        .select_one(FilterData::new().with_where(json!({ "owner_id": user_id, "followed_id": profile.owner_id })))
        .await?;
    Ok(edge.map(|f| f.id))
}

async fn count<E: crate::database::Entity>(db: &Database, where_clause: serde_json::Value) -> Result<i64, DatabaseError> {
    db.repo::<E>().count(FilterData::new().with_where(where_clause)).await
}
