use serde_json::Value;
use sqlx::{self, postgres::PgArguments, PgConnection, PgPool, Row};
use std::marker::PhantomData;

use crate::database::entity::{Entity, Values};
use crate::database::manager::DatabaseError;
use crate::filter::{Filter, FilterData};

/// Read queries against Postgres, driven by a Filter
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: PhantomData<T>,
}

impl<T: Entity> QueryBuilder<T> {
    pub fn new() -> Result<Self, DatabaseError> {
        let filter = Filter::new(T::TABLE).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(Self {
            filter,
            _phantom: PhantomData,
        })
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        self.filter
            .assign(filter_data)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(self)
    }

    pub fn into_filter(self) -> Filter {
        self.filter
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.filter.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn count(self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self.filter.to_count_sql();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

/// Write statements bind every value as text and cast it to the column type
pub struct WriteStatement {
    pub query: String,
    pub params: Vec<Option<String>>,
}

impl WriteStatement {
    pub fn insert<T: Entity>(values: &Values) -> Result<Self, DatabaseError> {
        if values.is_empty() {
            return Ok(Self {
                query: format!("INSERT INTO \"{}\" DEFAULT VALUES RETURNING *", T::TABLE),
                params: vec![],
            });
        }

        let mut columns = Vec::new();
        let mut placeholders = Vec::new();
        let mut params = Vec::new();
        for (index, (column, value)) in values.iter().enumerate() {
            columns.push(format!("\"{}\"", column));
            placeholders.push(format!("${}::{}", index + 1, cast_for::<T>(column)?));
            params.push(text_param(value));
        }

        Ok(Self {
            query: format!(
                "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
                T::TABLE,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params,
        })
    }

    pub fn update<T: Entity>(id: i64, values: &Values) -> Result<Self, DatabaseError> {
        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for (index, (column, value)) in values.iter().enumerate() {
            assignments.push(format!("\"{}\" = ${}::{}", column, index + 1, cast_for::<T>(column)?));
            params.push(text_param(value));
        }
        if T::HAS_UPDATED_AT {
            assignments.push("\"updated_at\" = now()".to_string());
        }
        params.push(Some(id.to_string()));

        let query = if assignments.is_empty() {
            format!("SELECT * FROM \"{}\" WHERE \"id\" = $1::bigint", T::TABLE)
        } else {
            format!(
                "UPDATE \"{}\" SET {} WHERE \"id\" = ${}::bigint RETURNING *",
                T::TABLE,
                assignments.join(", "),
                params.len()
            )
        };
        Ok(Self { query, params })
    }

    pub fn delete<T: Entity>(id: i64) -> Self {
        Self {
            query: format!("DELETE FROM \"{}\" WHERE \"id\" = $1::bigint", T::TABLE),
            params: vec![Some(id.to_string())],
        }
    }

    pub async fn fetch_optional<T: Entity>(self, conn: &mut PgConnection) -> Result<Option<T>, DatabaseError> {
        let mut q = sqlx::query_as::<_, T>(&self.query);
        for p in self.params {
            q = q.bind(p);
        }
        Ok(q.fetch_optional(conn).await?)
    }

    pub async fn execute(self, conn: &mut PgConnection) -> Result<u64, DatabaseError> {
        let mut q = sqlx::query(&self.query);
        for p in self.params {
            q = q.bind(p);
        }
        Ok(q.execute(conn).await?.rows_affected())
    }
}

fn cast_for<T: Entity>(column: &str) -> Result<&'static str, DatabaseError> {
    T::column_type(column)
        .map(|ty| ty.cast())
        .ok_or_else(|| DatabaseError::QueryError(format!("Unknown column \"{}\" for {}", column, T::TABLE)))
}

fn text_param(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // FilterWhere expands $in arrays into one parameter per element
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
