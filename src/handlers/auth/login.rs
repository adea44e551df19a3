// handlers/auth/login.rs - POST /auth/login/

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::handlers::utils::Validator;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::user::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: CurrentUser,
}

/// POST /auth/login/ - Authenticate and receive a bearer JWT
///
/// Unknown usernames and wrong passwords are indistinguishable to the client.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(payload) = payload?;

    let mut v = Validator::new();
    let username = v.require("username", payload.username);
    let password = v.require("password", payload.password);
    v.finish()?;
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::bad_request("Invalid input."));
    };

    let user = state.users().authenticate(&username, &password).await?;
    let token = generate_jwt(&Claims::for_user(&user))?;
    tracing::debug!("Issued token for user {}", user.id);

    Ok(ApiResponse::success(LoginResponse {
        token,
        user: CurrentUser::load(&state.db, &user).await?,
    }))
}
