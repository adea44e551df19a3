use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{Entity, SqlType};

#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [(&'static str, SqlType)] = &[("name", SqlType::Text)];
    const HAS_UPDATED_AT: bool = true;
}

#[derive(Debug, Serialize)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CategoryChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
