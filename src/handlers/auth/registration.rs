// handlers/auth/registration.rs - POST /auth/registration/

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::utils::Validator;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserError;
use crate::state::AppState;

use super::user::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub username: Option<String>,
    pub password1: Option<String>,
    pub password2: Option<String>,
}

/// POST /auth/registration/ - Create an account; its profile is provisioned alongside
pub async fn registration_post(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> ApiResult<CurrentUser> {
    let Json(payload) = payload?;

    let mut v = Validator::new();
    let username = v.require("username", payload.username);
    let password1 = v.require("password1", payload.password1);
    let password2 = v.require("password2", payload.password2);
    if password1.is_some() && password2.is_some() && password1 != password2 {
        v.add("non_field_errors", "The two password fields didn't match.");
    }
    v.finish()?;
    let (Some(username), Some(password)) = (username, password1) else {
        return Err(ApiError::bad_request("Invalid input."));
    };

    let user = state
        .users()
        .create_user(&username, &password, false)
        .await
        .map_err(|e| match e {
            UserError::InvalidPassword(msg) => ApiError::field("password1", msg),
            e => e.into(),
        })?;

    Ok(ApiResponse::created(CurrentUser::load(&state.db, &user).await?))
}
