//! ProductStore - keyed catalog persistence
//!
//! One wide `products` table keyed by `product_page`. Each upsert replaces the
//! whole row (`INSERT OR REPLACE`), so the last observation of a variant wins.
//! The table is created from `CANONICAL_SCHEMA` and only ever grows: columns
//! missing from an existing table are added, nothing is dropped or renamed.

use std::sync::Arc;

use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::product::field_kind;
use crate::domain::{
    CANONICAL_SCHEMA, CanonicalProduct, CrawlError, CrawlResult, FieldKind, FieldMap, PRIMARY_KEY,
};

pub const TABLE_NAME: &str = "products";

/// Result of a single upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Row written; `dropped` unknown fields were ignored
    Written { dropped: usize },
    /// Nothing written
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoRecognizedFields,
    MissingPrimaryKey,
}

#[derive(Debug, Clone)]
struct ColumnInfo {
    name: String,
    kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq)]
enum SqlValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Real(Option<f64>),
}

#[derive(Clone)]
pub struct ProductStore {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl ProductStore {
    /// Wrap `pool`, creating or extending the products table
    pub async fn new(pool: SqlitePool) -> CrawlResult<Self> {
        let store = Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> CrawlResult<()> {
        let _guard = self.write_lock.lock().await;

        let column_defs = CANONICAL_SCHEMA
            .iter()
            .map(|(name, kind)| {
                if *name == PRIMARY_KEY {
                    format!("\"{name}\" {} PRIMARY KEY", kind.sql_type())
                } else {
                    format!("\"{name}\" {}", kind.sql_type())
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        sqlx::query(&format!("CREATE TABLE IF NOT EXISTS {TABLE_NAME} ({column_defs})"))
            .execute(&self.pool)
            .await?;

        let existing = self.table_columns().await?;
        for (name, kind) in CANONICAL_SCHEMA {
            if existing.iter().any(|c| c.name == *name) {
                continue;
            }
            info!(column = *name, "Adding missing column to {TABLE_NAME}");
            sqlx::query(&format!(
                "ALTER TABLE {TABLE_NAME} ADD COLUMN \"{name}\" {}",
                kind.sql_type()
            ))
            .execute(&self.pool)
            .await?;
        }

        // A key column added by ALTER TABLE carries no constraint of its own
        sqlx::query(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {TABLE_NAME}_{PRIMARY_KEY}_key ON {TABLE_NAME}(\"{PRIMARY_KEY}\")"
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn table_columns(&self) -> CrawlResult<Vec<ColumnInfo>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({TABLE_NAME})"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name")?;
                let declared: String = row.try_get("type")?;
                let kind = field_kind(&name).unwrap_or(match declared.to_uppercase().as_str() {
                    "INTEGER" => FieldKind::Integer,
                    "REAL" => FieldKind::Real,
                    _ => FieldKind::Text,
                });
                Ok::<_, CrawlError>(ColumnInfo { name, kind })
            })
            .collect()
    }

    /// Insert or fully replace the row keyed by the record's `product_page`.
    ///
    /// Fields outside the canonical schema are dropped with a warning. A record
    /// with no recognized field, or without a product page, is rejected.
    pub async fn upsert(&self, record: &FieldMap) -> CrawlResult<UpsertOutcome> {
        let mut columns = Vec::with_capacity(record.len());
        let mut values = Vec::with_capacity(record.len());
        let mut dropped = Vec::new();

        for (name, value) in record {
            match field_kind(name) {
                Some(kind) => {
                    columns.push(name.as_str());
                    values.push(coerce(value, kind));
                }
                None => dropped.push(name.as_str()),
            }
        }

        if !dropped.is_empty() {
            warn!(fields = ?dropped, "Dropping fields outside the catalog schema");
        }

        if columns.is_empty() {
            warn!("Rejecting record with no recognized fields");
            return Ok(UpsertOutcome::Rejected(RejectReason::NoRecognizedFields));
        }

        let has_key = columns
            .iter()
            .zip(&values)
            .any(|(name, value)| *name == PRIMARY_KEY && is_present_key(value));
        if !has_key {
            warn!("Rejecting record without {PRIMARY_KEY}");
            return Ok(UpsertOutcome::Rejected(RejectReason::MissingPrimaryKey));
        }

        let column_list = columns
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!("INSERT OR REPLACE INTO {TABLE_NAME} ({column_list}) VALUES ({placeholders})");

        let mut query = sqlx::query(&sql);
        for value in values {
            query = match value {
                SqlValue::Text(v) => query.bind(v),
                SqlValue::Integer(v) => query.bind(v),
                SqlValue::Real(v) => query.bind(v),
            };
        }

        let _guard = self.write_lock.lock().await;
        query.execute(&self.pool).await?;
        debug!(columns = columns.len(), "Upserted product row");

        Ok(UpsertOutcome::Written {
            dropped: dropped.len(),
        })
    }

    pub async fn upsert_product(&self, product: &CanonicalProduct) -> CrawlResult<UpsertOutcome> {
        self.upsert(&product.to_field_map()).await
    }

    /// Every row as a field map. Canonical columns come first in schema
    /// order, then any extra columns in table order; rows are ordered by key.
    pub async fn get_all(&self) -> CrawlResult<Vec<FieldMap>> {
        let mut columns = self.table_columns().await?;
        columns.sort_by_key(|c| {
            CANONICAL_SCHEMA
                .iter()
                .position(|(name, _)| *name == c.name)
                .unwrap_or(usize::MAX)
        });

        let column_list = columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let rows = sqlx::query(&format!(
            "SELECT {column_list} FROM {TABLE_NAME} ORDER BY \"{PRIMARY_KEY}\""
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| decode_row(row, &columns)).collect()
    }

    pub async fn count(&self) -> CrawlResult<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Delete every row, keeping the table and its columns
    pub async fn clear(&self) -> CrawlResult<()> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query(&format!("DELETE FROM {TABLE_NAME}"))
            .execute(&self.pool)
            .await?;
        info!(rows = result.rows_affected(), "Cleared product store");
        Ok(())
    }
}

fn coerce(value: &Value, kind: FieldKind) -> SqlValue {
    match kind {
        FieldKind::Text => SqlValue::Text(match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }),
        FieldKind::Integer => SqlValue::Integer(match value {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(round_to_i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }),
        FieldKind::Real => SqlValue::Real(match value {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }),
    }
}

fn is_present_key(value: &SqlValue) -> bool {
    matches!(value, SqlValue::Text(Some(key)) if !key.trim().is_empty())
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_i64(value: f64) -> i64 {
    value.round() as i64
}

fn decode_row(row: &SqliteRow, columns: &[ColumnInfo]) -> CrawlResult<FieldMap> {
    let mut map = FieldMap::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        let value = match column.kind {
            FieldKind::Text => row
                .try_get_unchecked::<Option<String>, _>(idx)?
                .map_or(Value::Null, Value::from),
            FieldKind::Integer => row
                .try_get_unchecked::<Option<i64>, _>(idx)?
                .map_or(Value::Null, Value::from),
            FieldKind::Real => row
                .try_get_unchecked::<Option<f64>, _>(idx)?
                .map_or(Value::Null, Value::from),
        };
        map.insert(column.name.clone(), value);
    }
    Ok(map)
}
