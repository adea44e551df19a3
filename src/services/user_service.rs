use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::{self, AuthError};
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::schema::USERS_USERNAME_KEY;
use crate::database::{Database, DatabaseError};
use crate::filter::FilterData;
use crate::observer::{ObserverError, ObserverPipeline, Operation};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("A user with that username already exists.")]
    AlreadyExists,

    #[error("{0}")]
    InvalidUsername(String),

    #[error("{0}")]
    InvalidPassword(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Observer(#[from] ObserverError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Identity lifecycle: creation (with observers), authentication, promotion
pub struct UserService {
    db: Database,
    observers: Arc<ObserverPipeline>,
}

impl UserService {
    pub fn new(db: Database, observers: Arc<ObserverPipeline>) -> Self {
        Self { db, observers }
    }

    /// Create a user and run creation observers in the same transaction
    pub async fn create_user(&self, username: &str, password: &str, is_staff: bool) -> Result<User, UserError> {
        validate_username(username)?;
        validate_password(password)?;
        let password_hash = auth::hash_password(password)?;

        let mut tx = self.db.begin().await?;
        let user: User = tx
            .insert(&NewUser {
                username: username.to_string(),
                password_hash,
                is_staff,
            })
            .await
            .map_err(|e| match e {
                e if e.is_constraint(USERS_USERNAME_KEY) => UserError::AlreadyExists,
                e => UserError::Database(e),
            })?;

        self.observers.execute(Operation::Create, &mut tx, &user).await?;
        tx.commit().await?;

        info!("Created user {} (id={}, staff={})", user.username, user.id, user.is_staff);
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .db
            .repo::<User>()
            .select_one(FilterData::new().with_where(json!({ "username": username })))
            .await?)
    }

    /// Check credentials. Unknown usernames and wrong passwords fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, UserError> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(UserError::Auth(AuthError::InvalidCredentials))?;
        auth::verify_password(password, &user.password_hash)?;
        Ok(user)
    }

    pub async fn promote(&self, username: &str) -> Result<User, UserError> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        let user: User = self
            .db
            .repo::<User>()
            .update(
                user.id,
                &UserChanges {
                    is_staff: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        info!("Promoted user {} to administrator", user.username);
        Ok(user)
    }
}

pub fn validate_username(username: &str) -> Result<(), UserError> {
    if username.is_empty() {
        return Err(UserError::InvalidUsername("This field may not be blank.".to_string()));
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(UserError::InvalidUsername(format!(
            "Ensure this field has no more than {} characters.",
            USERNAME_MAX_LENGTH
        )));
    }
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'));
    if !valid {
        return Err(UserError::InvalidUsername(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(UserError::InvalidPassword(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LENGTH
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(UserError::InvalidPassword("This password is entirely numeric.".to_string()));
    }
    Ok(())
}
