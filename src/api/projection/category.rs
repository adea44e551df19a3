use serde::Serialize;

use crate::api::projection::Projector;
use crate::database::models::Category;

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CategoryView {
    pub fn project(category: &Category, ctx: &Projector<'_>) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            created_at: ctx.timestamp(category.created_at),
            updated_at: ctx.timestamp(category.updated_at),
        }
    }
}
