//! DuckDB-backed store
//!
//! One table per entity type plus a `cache_meta` table holding the refresh
//! stamp. Rows carry a `seq` column assigned on first insert; reads are
//! ordered by it, so an overwrite keeps the row where it was.

use super::{LocalStore, StoreTransaction};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::model::{MovieEntity, StoredEntity, TvSeriesEntity};
use crate::types::ItemId;
use chrono::{DateTime, TimeZone, Utc};
use duckdb::types::{Type, Value};
use duckdb::{params, params_from_iter, Connection, OptionalExt, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const META_TABLE: &str = "cache_meta";

// ============================================================================
// Row mapping
// ============================================================================

/// An entity that maps onto a single DuckDB table
pub trait SqlEntity: StoredEntity {
    /// Table name
    const TABLE: &'static str;

    /// Column names and SQL types, `id` first
    const COLUMNS: &'static [(&'static str, &'static str)];

    /// Column values in `COLUMNS` order
    fn to_values(&self) -> Result<Vec<Value>>;

    /// Rebuild from a row selected in `COLUMNS` order
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self>;
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn opt_text(value: &Option<String>) -> Value {
    value.as_deref().map_or(Value::Null, text)
}

fn json_text<T: Serialize>(value: &T) -> Result<Value> {
    Ok(Value::Text(serde_json::to_string(value)?))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> duckdb::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl SqlEntity for MovieEntity {
    const TABLE: &'static str = "movie";

    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("id", "BIGINT"),
        ("adult", "BOOLEAN"),
        ("backdrop_path", "VARCHAR"),
        ("genre_ids", "VARCHAR"),
        ("original_language", "VARCHAR"),
        ("original_title", "VARCHAR"),
        ("overview", "VARCHAR"),
        ("popularity", "DOUBLE"),
        ("poster_path", "VARCHAR"),
        ("release_date", "VARCHAR"),
        ("title", "VARCHAR"),
        ("video", "BOOLEAN"),
        ("vote_average", "DOUBLE"),
        ("vote_count", "BIGINT"),
    ];

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::BigInt(self.id),
            Value::Boolean(self.adult),
            opt_text(&self.backdrop_path),
            json_text(&self.genre_ids)?,
            text(&self.original_language),
            text(&self.original_title),
            text(&self.overview),
            Value::Double(self.popularity),
            opt_text(&self.poster_path),
            opt_text(&self.release_date),
            text(&self.title),
            Value::Boolean(self.video),
            Value::Double(self.vote_average),
            Value::BigInt(self.vote_count),
        ])
    }

    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            adult: row.get(1)?,
            backdrop_path: row.get(2)?,
            genre_ids: json_column(row, 3)?,
            original_language: row.get(4)?,
            original_title: row.get(5)?,
            overview: row.get(6)?,
            popularity: row.get(7)?,
            poster_path: row.get(8)?,
            release_date: row.get(9)?,
            title: row.get(10)?,
            video: row.get(11)?,
            vote_average: row.get(12)?,
            vote_count: row.get(13)?,
        })
    }
}

impl SqlEntity for TvSeriesEntity {
    const TABLE: &'static str = "tv_series";

    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("id", "BIGINT"),
        ("backdrop_path", "VARCHAR"),
        ("first_air_date", "VARCHAR"),
        ("genre_ids", "VARCHAR"),
        ("name", "VARCHAR"),
        ("origin_country", "VARCHAR"),
        ("original_language", "VARCHAR"),
        ("original_name", "VARCHAR"),
        ("overview", "VARCHAR"),
        ("popularity", "DOUBLE"),
        ("poster_path", "VARCHAR"),
        ("vote_average", "DOUBLE"),
        ("vote_count", "BIGINT"),
    ];

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::BigInt(self.id),
            opt_text(&self.backdrop_path),
            opt_text(&self.first_air_date),
            json_text(&self.genre_ids)?,
            text(&self.name),
            json_text(&self.origin_country)?,
            text(&self.original_language),
            text(&self.original_name),
            text(&self.overview),
            Value::Double(self.popularity),
            opt_text(&self.poster_path),
            Value::Double(self.vote_average),
            Value::BigInt(self.vote_count),
        ])
    }

    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            backdrop_path: row.get(1)?,
            first_air_date: row.get(2)?,
            genre_ids: json_column(row, 3)?,
            name: row.get(4)?,
            origin_country: json_column(row, 5)?,
            original_language: row.get(6)?,
            original_name: row.get(7)?,
            overview: row.get(8)?,
            popularity: row.get(9)?,
            poster_path: row.get(10)?,
            vote_average: row.get(11)?,
            vote_count: row.get(12)?,
        })
    }
}

/// SQL fragments derived once from an entity's column list
struct Statements {
    select: String,
    update: String,
    insert: String,
}

impl Statements {
    fn for_entity<E: SqlEntity>() -> Self {
        let names: Vec<&str> = E::COLUMNS.iter().map(|(name, _)| *name).collect();
        let table = E::TABLE;

        let assignments = names[1..]
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{name} = ${}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=names.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let seq_slot = names.len() + 1;

        Self {
            select: format!("SELECT {} FROM {table}", names.join(", ")),
            update: format!("UPDATE {table} SET {assignments} WHERE id = $1"),
            insert: format!(
                "INSERT INTO {table} ({}, seq) VALUES ({placeholders}, ${seq_slot})",
                names.join(", ")
            ),
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Store persisting one entity type in DuckDB
pub struct DuckDbStore<E> {
    conn: Mutex<Connection>,
    statements: Statements,
    _entity: PhantomData<fn() -> E>,
}

impl<E: SqlEntity> DuckDbStore<E> {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::merge(format!("Failed to open cache database {}: {e}", path.display()))
        })?;
        Self::with_connection(conn)
    }

    /// Create a store that lives only as long as the process
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Open the store described by the configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::open(path),
            None => Self::in_memory(),
        }
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let columns = E::COLUMNS
            .iter()
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect::<Vec<_>>()
            .join(", ");

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} ({columns}, seq BIGINT NOT NULL);
             CREATE TABLE IF NOT EXISTS {META_TABLE} (
                 table_name VARCHAR NOT NULL,
                 last_refreshed_at BIGINT NOT NULL
             );",
            table = E::TABLE,
        ))?;
        debug!(table = E::TABLE, "Cache schema ready");

        Ok(Self {
            conn: Mutex::new(conn),
            statements: Statements::for_entity::<E>(),
            _entity: PhantomData,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::merge("cache database lock poisoned"))
    }
}

impl<E> std::fmt::Debug for DuckDbStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbStore")
            .field("table", &self.statements.select)
            .finish()
    }
}

/// Mutation handle bound to an open DuckDB transaction
struct DuckDbTransaction<'a, E> {
    conn: &'a Connection,
    statements: &'a Statements,
    _entity: PhantomData<fn() -> E>,
}

impl<E: SqlEntity> DuckDbTransaction<'_, E> {
    fn next_seq(&self) -> Result<i64> {
        let max: Option<i64> = self.conn.query_row(
            &format!("SELECT MAX(seq) FROM {}", E::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(max.map_or(0, |seq| seq + 1))
    }
}

impl<E: SqlEntity> StoreTransaction<E> for DuckDbTransaction<'_, E> {
    fn clear_all(&mut self) -> Result<usize> {
        Ok(self
            .conn
            .execute(&format!("DELETE FROM {}", E::TABLE), [])?)
    }

    fn upsert_all(&mut self, entities: &[E]) -> Result<usize> {
        let mut seq = self.next_seq()?;
        let mut update = self.conn.prepare(&self.statements.update)?;
        let mut insert = self.conn.prepare(&self.statements.insert)?;

        for entity in entities {
            let mut values = entity.to_values()?;
            if update.execute(params_from_iter(values.iter()))? == 0 {
                values.push(Value::BigInt(seq));
                insert.execute(params_from_iter(values.iter()))?;
                seq += 1;
            }
        }
        Ok(entities.len())
    }

    fn delete(&mut self, id: ItemId) -> Result<bool> {
        let removed = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?", E::TABLE), params![id])?;
        Ok(removed > 0)
    }

    fn mark_refreshed(&mut self, at: DateTime<Utc>) -> Result<()> {
        let millis = at.timestamp_millis();
        let updated = self.conn.execute(
            &format!("UPDATE {META_TABLE} SET last_refreshed_at = ? WHERE table_name = ?"),
            params![millis, E::TABLE],
        )?;
        if updated == 0 {
            self.conn.execute(
                &format!("INSERT INTO {META_TABLE} (table_name, last_refreshed_at) VALUES (?, ?)"),
                params![E::TABLE, millis],
            )?;
        }
        Ok(())
    }
}

impl<E: SqlEntity> LocalStore for DuckDbStore<E> {
    type Entity = E;

    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTransaction<E>) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut handle = DuckDbTransaction::<E> {
            conn: &*tx,
            statements: &self.statements,
            _entity: PhantomData,
        };

        // Dropping `tx` without commit rolls back
        let value = f(&mut handle)?;
        tx.commit()?;
        Ok(value)
    }

    fn read_page(&self, offset: usize, limit: usize) -> Result<Vec<E>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY seq LIMIT ? OFFSET ?",
            self.statements.select
        ))?;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], |row| E::from_row(row))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn last_entity(&self) -> Result<Option<E>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("{} ORDER BY seq DESC LIMIT 1", self.statements.select),
                [],
                |row| E::from_row(row),
            )
            .optional()?;
        Ok(row)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", E::TABLE), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;
        let millis: Option<i64> = conn
            .query_row(
                &format!("SELECT last_refreshed_at FROM {META_TABLE} WHERE table_name = ?"),
                params![E::TABLE],
                |row| row.get(0),
            )
            .optional()?;
        Ok(millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
    }
}
