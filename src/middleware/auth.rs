use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            is_staff: claims.is_staff,
        }
    }
}

/// Who is calling. Every request carries one in its extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    User(AuthUser),
}

impl Requester {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Requester::Anonymous => None,
            Requester::User(user) => Some(user.user_id),
        }
    }

    /// The authenticated user, or 401 for anonymous callers
    pub fn require(&self) -> Result<&AuthUser, ApiError> {
        match self {
            Requester::User(user) => Ok(user),
            Requester::Anonymous => Err(ApiError::unauthorized("Authentication credentials were not provided.")),
        }
    }
}

/// Resolve the bearer token, if any, into a Requester.
/// No Authorization header means anonymous; a bad token is rejected outright.
pub async fn requester_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let requester = match extract_jwt_from_headers(&headers) {
        Ok(None) => Requester::Anonymous,
        Ok(Some(token)) => match validate_jwt(&token) {
            Ok(claims) => {
                tracing::debug!("Authenticated request for user {}", claims.sub);
                Requester::User(AuthUser::from(claims))
            }
            Err(e) => return ApiError::from(e).into_response(),
        },
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    request.extensions_mut().insert(requester);
    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_jwt_from_headers(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_jwt_from_headers(&headers), Ok(Some("abc.def".to_string())));

        headers.insert("authorization", HeaderValue::from_static("Token abc"));
        assert!(extract_jwt_from_headers(&headers).is_err());
    }

    #[test]
    fn anonymous_cannot_be_required() {
        let err = Requester::Anonymous.require().unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert_eq!(Requester::Anonymous.user_id(), None);
    }
}
