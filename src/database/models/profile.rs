use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{Entity, SqlType};

/// One per user, created alongside the account
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct Profile {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub content: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Profile {
    const TABLE: &'static str = "profiles";
    const COLUMNS: &'static [(&'static str, SqlType)] = &[
        ("owner_id", SqlType::BigInt),
        ("name", SqlType::Text),
        ("content", SqlType::Text),
        ("image", SqlType::Text),
    ];
    const HAS_UPDATED_AT: bool = true;
}

#[derive(Debug, Serialize)]
pub struct NewProfile {
    pub owner_id: i64,
    pub name: String,
    pub content: String,
    pub image: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
