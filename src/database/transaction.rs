use serde::Serialize;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::database::entity::{from_row, to_values, Entity};
use crate::database::manager::DatabaseError;
use crate::database::memory::MemoryTx;
use crate::database::query_builder::WriteStatement;

/// A unit of work. Every write goes through one so that multi-row changes
/// (user plus profile, cascades) land together or not at all.
pub enum Tx {
    Postgres(Transaction<'static, Postgres>),
    Memory(MemoryTx),
}

impl Tx {
    pub async fn insert<E: Entity>(&mut self, payload: &impl Serialize) -> Result<E, DatabaseError> {
        let values = to_values::<E>(payload)?;
        debug!("insert into {}", E::TABLE);

        match self {
            Tx::Postgres(tx) => WriteStatement::insert::<E>(&values)?
                .fetch_optional::<E>(&mut **tx)
                .await?
                .ok_or_else(|| DatabaseError::QueryError(format!("insert into {} returned no row", E::TABLE))),
            Tx::Memory(tx) => {
                let row = tx.tables().insert(E::TABLE, E::HAS_UPDATED_AT, values)?;
                from_row(&row)
            }
        }
    }

    pub async fn update<E: Entity>(&mut self, id: i64, changes: &impl Serialize) -> Result<E, DatabaseError> {
        let values = to_values::<E>(changes)?;
        debug!("update {} {}", E::TABLE, id);

        match self {
            Tx::Postgres(tx) => WriteStatement::update::<E>(id, &values)?
                .fetch_optional::<E>(&mut **tx)
                .await?
                .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", E::TABLE, id))),
            Tx::Memory(tx) => {
                let row = tx.tables().update(E::TABLE, id, E::HAS_UPDATED_AT, values)?;
                from_row(&row)
            }
        }
    }

    /// Delete by id, applying cascades. Returns false if nothing was deleted.
    pub async fn delete<E: Entity>(&mut self, id: i64) -> Result<bool, DatabaseError> {
        debug!("delete from {} {}", E::TABLE, id);

        match self {
            Tx::Postgres(tx) => Ok(WriteStatement::delete::<E>(id).execute(&mut **tx).await? > 0),
            Tx::Memory(tx) => Ok(tx.tables().delete(E::TABLE, id)),
        }
    }

    pub async fn commit(self) -> Result<(), DatabaseError> {
        match self {
            Tx::Postgres(tx) => tx.commit().await?,
            Tx::Memory(tx) => tx.commit(),
        }
        Ok(())
    }
}
