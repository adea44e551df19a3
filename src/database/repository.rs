use serde::Serialize;
use serde_json::json;
use std::marker::PhantomData;

use crate::database::entity::{from_row, Entity};
use crate::database::manager::{Database, DatabaseError};
use crate::database::query_builder::QueryBuilder;
use crate::filter::FilterData;

/// Typed access to one table on either store
pub struct Repository<T> {
    db: Database,
    _phantom: PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            _phantom: PhantomData,
        }
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        let builder = QueryBuilder::<T>::new()?.filter(filter_data)?;
        match &self.db {
            Database::Postgres(pool) => builder.select_all(pool).await,
            Database::Memory(memory) => {
                let tables = memory.read().await;
                builder
                    .into_filter()
                    .apply(tables.rows(T::TABLE))
                    .iter()
                    .map(from_row::<T>)
                    .collect()
            }
        }
    }

    pub async fn select_one(&self, mut filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        filter_data.limit = Some(1);
        Ok(self.select_any(filter_data).await?.into_iter().next())
    }

    pub async fn count(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        let builder = QueryBuilder::<T>::new()?.filter(filter_data)?;
        match &self.db {
            Database::Postgres(pool) => builder.count(pool).await,
            Database::Memory(memory) => {
                let tables = memory.read().await;
                Ok(builder.into_filter().count(tables.rows(T::TABLE)))
            }
        }
    }

    pub async fn get(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        self.select_one(FilterData::new().with_where(json!({ "id": id }))).await
    }

    pub async fn select_404(&self, id: i64) -> Result<T, DatabaseError> {
        self.get(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Not found.".to_string()))
    }

    pub async fn insert(&self, payload: &impl Serialize) -> Result<T, DatabaseError> {
        let mut tx = self.db.begin().await?;
        let row = tx.insert::<T>(payload).await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn update(&self, id: i64, changes: &impl Serialize) -> Result<T, DatabaseError> {
        let mut tx = self.db.begin().await?;
        let row = tx.update::<T>(id, changes).await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tx = self.db.begin().await?;
        let deleted = tx.delete::<T>(id).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}
