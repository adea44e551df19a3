// handlers/auth/user.rs - GET /auth/user/

use axum::extract::{Extension, State};
use serde::Serialize;
use serde_json::json;

use crate::database::models::{Profile, User};
use crate::database::{Database, DatabaseError};
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::state::AppState;

/// The user as seen by its own client
#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub profile_id: Option<i64>,
    pub profile_image: Option<String>,
}

impl CurrentUser {
    pub async fn load(db: &Database, user: &User) -> Result<Self, DatabaseError> {
        let profile = db
            .repo::<Profile>()
            .select_one(FilterData::new().with_where(json!({ "owner_id": user.id })))
            .await?;
        Ok(Self {
            id: user.id,
            username: user.username.clone(),
            profile_id: profile.as_ref().map(|p| p.id),
            profile_image: profile.map(|p| p.image),
        })
    }
}

/// GET /auth/user/ - Requires a bearer token
pub async fn user_get(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> ApiResult<CurrentUser> {
    let auth = requester.require()?;
    // The token can outlive the account
    let user = state.db.repo::<User>().select_404(auth.user_id).await?;
    Ok(ApiResponse::success(CurrentUser::load(&state.db, &user).await?))
}
