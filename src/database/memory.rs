// In-process store used when no DATABASE_URL is configured (development and tests).
// Rows are JSON objects; constraints come from database::schema.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock, RwLockReadGuard};

use crate::database::entity::Values;
use crate::database::manager::DatabaseError;
use crate::database::schema::{OnDelete, FOREIGN_KEYS, TABLES, UNIQUE_KEYS};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    rows: HashMap<&'static str, BTreeMap<i64, Values>>,
    sequences: HashMap<&'static str, i64>,
}

impl Tables {
    fn new() -> Self {
        let mut tables = Self::default();
        for table in TABLES {
            tables.rows.insert(*table, BTreeMap::new());
        }
        tables
    }

    pub fn rows(&self, table: &str) -> impl Iterator<Item = &Values> {
        self.rows.get(table).into_iter().flat_map(|rows| rows.values())
    }

    pub fn get(&self, table: &str, id: i64) -> Option<&Values> {
        self.rows.get(table).and_then(|rows| rows.get(&id))
    }

    pub fn insert(&mut self, table: &'static str, has_updated_at: bool, values: Values) -> Result<Values, DatabaseError> {
        self.check_foreign_keys(table, &values)?;
        self.check_unique_keys(table, &values, None)?;

        let sequence = self.sequences.entry(table).or_insert(0);
        *sequence += 1;
        let id = *sequence;

        let now = Value::String(timestamp());
        let mut row = values;
        row.insert("id".to_string(), Value::from(id));
        row.insert("created_at".to_string(), now.clone());
        if has_updated_at {
            row.insert("updated_at".to_string(), now);
        }

        self.rows.entry(table).or_default().insert(id, row.clone());
        Ok(row)
    }

    pub fn update(&mut self, table: &'static str, id: i64, has_updated_at: bool, changes: Values) -> Result<Values, DatabaseError> {
        let mut row = self
            .get(table, id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", table, id)))?;

        self.check_foreign_keys(table, &changes)?;
        row.extend(changes);
        self.check_unique_keys(table, &row, Some(id))?;
        if has_updated_at {
            row.insert("updated_at".to_string(), Value::String(timestamp()));
        }

        self.rows.entry(table).or_default().insert(id, row.clone());
        Ok(row)
    }

    /// Remove a row and apply ON DELETE rules to rows referencing it
    pub fn delete(&mut self, table: &str, id: i64) -> bool {
        let removed = self.rows.get_mut(table).and_then(|rows| rows.remove(&id));
        if removed.is_none() {
            return false;
        }

        for fk in FOREIGN_KEYS.iter().filter(|fk| fk.references == table) {
            let children: Vec<i64> = self
                .rows(fk.table)
                .filter(|row| row.get(fk.column).and_then(Value::as_i64) == Some(id))
                .filter_map(|row| row.get("id").and_then(Value::as_i64))
                .collect();

            for child in children {
                match fk.on_delete {
                    OnDelete::Cascade => {
                        self.delete(fk.table, child);
                    }
                    OnDelete::SetNull => {
                        if let Some(row) = self.rows.get_mut(fk.table).and_then(|rows| rows.get_mut(&child)) {
                            row.insert(fk.column.to_string(), Value::Null);
                        }
                    }
                }
            }
        }
        true
    }

    fn check_foreign_keys(&self, table: &str, values: &Values) -> Result<(), DatabaseError> {
        for fk in FOREIGN_KEYS.iter().filter(|fk| fk.table == table) {
            let Some(value) = values.get(fk.column) else { continue };
            if value.is_null() {
                continue;
            }
            let exists = value.as_i64().map(|id| self.get(fk.references, id).is_some()).unwrap_or(false);
            if !exists {
                return Err(DatabaseError::ConstraintViolation(fk.name.to_string()));
            }
        }
        Ok(())
    }

    fn check_unique_keys(&self, table: &str, row: &Values, skip_id: Option<i64>) -> Result<(), DatabaseError> {
        for key in UNIQUE_KEYS.iter().filter(|k| k.table == table) {
            let candidate: Vec<&Value> = key.columns.iter().map(|c| row.get(*c).unwrap_or(&Value::Null)).collect();
            // NULLs never collide
            if candidate.iter().any(|v| v.is_null()) {
                continue;
            }
            let collision = self.rows(table).any(|existing| {
                existing.get("id").and_then(Value::as_i64) != skip_id
                    && key.columns.iter().zip(&candidate).all(|(c, v)| existing.get(*c) == Some(*v))
            });
            if collision {
                return Err(DatabaseError::ConstraintViolation(key.name.to_string()));
            }
        }
        Ok(())
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Shared handle; writers serialize on the lock for the whole unit of work
#[derive(Clone)]
pub struct MemoryDatabase {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Tables::new())),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().await
    }

    pub async fn begin(&self) -> MemoryTx {
        let guard = self.inner.clone().write_owned().await;
        let staged = guard.clone();
        MemoryTx { guard, staged }
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes go to a staged copy that replaces the live tables on commit
pub struct MemoryTx {
    guard: OwnedRwLockWriteGuard<Tables>,
    staged: Tables,
}

impl MemoryTx {
    pub fn tables(&mut self) -> &mut Tables {
        &mut self.staged
    }

    pub fn commit(self) {
        let MemoryTx { mut guard, staged } = self;
        *guard = staged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::{CATEGORIES_NAME_KEY, LIKES_OWNER_POST_KEY, LIKES_POST_FKEY};
    use serde_json::json;

    fn values(v: Value) -> Values {
        v.as_object().cloned().unwrap()
    }

    fn seeded() -> Tables {
        let mut tables = Tables::new();
        tables.insert("users", false, values(json!({ "username": "ann" }))).unwrap();
        tables.insert("users", false, values(json!({ "username": "bob" }))).unwrap();
        tables
            .insert("posts", true, values(json!({ "owner_id": 1, "title": "first" })))
            .unwrap();
        tables
    }

    #[test]
    fn assigns_ids_and_timestamps() {
        let tables = seeded();
        let post = tables.get("posts", 1).unwrap();
        assert_eq!(post["id"], 1);
        assert!(post["created_at"].is_string());
        assert_eq!(post["created_at"], post["updated_at"]);
        assert!(tables.get("users", 2).unwrap().get("updated_at").is_none());
    }

    #[test]
    fn rejects_duplicate_pairs_and_missing_targets() {
        let mut tables = seeded();
        tables.insert("likes", false, values(json!({ "owner_id": 2, "post_id": 1 }))).unwrap();

        let err = tables.insert("likes", false, values(json!({ "owner_id": 2, "post_id": 1 }))).unwrap_err();
        assert!(err.is_constraint(LIKES_OWNER_POST_KEY));

        let err = tables.insert("likes", false, values(json!({ "owner_id": 2, "post_id": 99 }))).unwrap_err();
        assert!(err.is_constraint(LIKES_POST_FKEY));
    }

    #[test]
    fn update_checks_uniqueness_against_other_rows() {
        let mut tables = Tables::new();
        tables.insert("categories", true, values(json!({ "name": "Books" }))).unwrap();
        tables.insert("categories", true, values(json!({ "name": "Games" }))).unwrap();

        // Renaming to itself is fine
        tables.update("categories", 1, true, values(json!({ "name": "Books" }))).unwrap();
        let err = tables.update("categories", 2, true, values(json!({ "name": "Books" }))).unwrap_err();
        assert!(err.is_constraint(CATEGORIES_NAME_KEY));
    }

    #[test]
    fn delete_cascades_and_nullifies() {
        let mut tables = seeded();
        tables.insert("comments", true, values(json!({ "owner_id": 2, "post_id": 1, "content": "hi" }))).unwrap();
        tables.insert("likes", false, values(json!({ "owner_id": 2, "post_id": 1 }))).unwrap();
        tables.insert("categories", true, values(json!({ "name": "Books" }))).unwrap();
        tables
            .insert("products", true, values(json!({ "owner_id": 2, "category_id": 1, "name": "Novel" })))
            .unwrap();

        assert!(tables.delete("users", 1));
        assert_eq!(tables.rows("posts").count(), 0);
        assert_eq!(tables.rows("comments").count(), 0);
        assert_eq!(tables.rows("likes").count(), 0);

        assert!(tables.delete("categories", 1));
        assert_eq!(tables.get("products", 1).unwrap()["category_id"], Value::Null);
        assert!(!tables.delete("categories", 1));
    }

    #[tokio::test]
    async fn uncommitted_work_is_discarded() {
        let db = MemoryDatabase::new();
        {
            let mut tx = db.begin().await;
            tx.tables().insert("users", false, values(json!({ "username": "ann" }))).unwrap();
        }
        assert_eq!(db.read().await.rows("users").count(), 0);

        let mut tx = db.begin().await;
        tx.tables().insert("users", false, values(json!({ "username": "ann" }))).unwrap();
        tx.commit();
        assert_eq!(db.read().await.rows("users").count(), 1);
    }
}
