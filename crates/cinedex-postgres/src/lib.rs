//! PostgreSQL implementation of the cinedex catalog store.
//!
//! This crate provides a production-ready PostgreSQL implementation of the
//! `CatalogStore` trait from the cinedex core.
//!
//! # Features
//!
//! - Batched natural-key lookup: one parameterized tuple-IN query for the
//!   whole submitted cast, never one query per actor
//! - Reconciliation and insert inside a single transaction, so the
//!   existence snapshot stays valid through the write
//! - Constraint-violation translation by constraint name, with a gated
//!   message-text fallback; unrecognized violations propagate untranslated
//!
//! # Database Schema
//!
//! ```sql
//! CREATE TABLE films (
//!     id BIGSERIAL PRIMARY KEY,
//!     title VARCHAR(255) NOT NULL,
//!     description VARCHAR(255),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     CONSTRAINT films_title_key UNIQUE (title)
//! );
//!
//! CREATE TABLE actors (
//!     id BIGSERIAL PRIMARY KEY,
//!     last_name VARCHAR(255) NOT NULL,
//!     first_name VARCHAR(255) NOT NULL,
//!     CONSTRAINT actors_name_key UNIQUE (last_name, first_name)
//! );
//!
//! -- actors are shared across films; deleting a film removes its cast
//! -- links only, never the actors
//! CREATE TABLE film_actors (
//!     film_id BIGINT NOT NULL REFERENCES films (id) ON DELETE CASCADE,
//!     actor_id BIGINT NOT NULL REFERENCES actors (id),
//!     position INTEGER NOT NULL,
//!     PRIMARY KEY (film_id, position)
//! );
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cinedex::Catalog;
//! use cinedex_postgres::PgCatalogStore;
//! use sqlx::PgPool;
//!
//! let pool = PgPool::connect("postgres://localhost/cinedex").await?;
//! let catalog = Catalog::new(PgCatalogStore::new(pool));
//! ```

mod translate;

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Row};
use tracing::debug;

use cinedex::reconcile::{self, CastSlot};
use cinedex::{Actor, ActorId, ActorName, CatalogStore, Film, FilmDraft, FilmId, StoreError};

use crate::translate::translate;

/// Schema DDL, for test databases and first-boot provisioning.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS films (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT films_title_key UNIQUE (title)
);

CREATE TABLE IF NOT EXISTS actors (
    id BIGSERIAL PRIMARY KEY,
    last_name VARCHAR(255) NOT NULL,
    first_name VARCHAR(255) NOT NULL,
    CONSTRAINT actors_name_key UNIQUE (last_name, first_name)
);

CREATE TABLE IF NOT EXISTS film_actors (
    film_id BIGINT NOT NULL REFERENCES films (id) ON DELETE CASCADE,
    actor_id BIGINT NOT NULL REFERENCES actors (id),
    position INTEGER NOT NULL,
    PRIMARY KEY (film_id, position)
);
"#;

/// PostgreSQL catalog store.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply [`SCHEMA`] to the connected database.
    pub async fn provision(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(())
    }
}

/// `(last_name, first_name) IN (($1,$2),($3,$4),…)` with numbered binds
/// for `n` keys. The key values themselves never enter the SQL text.
fn tuple_in_sql(n: usize) -> String {
    let mut sql = String::from(
        "SELECT id, last_name, first_name FROM actors WHERE (last_name, first_name) IN (",
    );
    for i in 0..n {
        if i > 0 {
            sql.push(',');
        }
        sql.push_str(&format!("(${},${})", i * 2 + 1, i * 2 + 2));
    }
    sql.push(')');
    sql
}

/// Batched existence lookup: which of `keys` already have a row, and with
/// which id. One round trip over a parameterized tuple-IN; an empty key
/// set issues no query at all.
async fn lookup_actor_ids(
    conn: &mut PgConnection,
    keys: &[ActorName],
) -> Result<HashMap<ActorName, ActorId>, StoreError> {
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = tuple_in_sql(keys.len());
    let mut query = sqlx::query(&sql);
    for key in keys {
        query = query.bind(&key.last_name).bind(&key.first_name);
    }

    let rows = query.fetch_all(&mut *conn).await.map_err(translate)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                ActorName::new(row.get::<String, _>("last_name"), row.get::<String, _>("first_name")),
                ActorId(row.get("id")),
            )
        })
        .collect())
}

/// Eager-load a film and its cast in one query, ordered by cast position.
async fn fetch_film(
    conn: &mut PgConnection,
    id: FilmId,
) -> Result<Option<Film>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT f.id, f.title, f.description, f.created_at,
               a.id AS actor_id, a.last_name, a.first_name
        FROM films f
        LEFT JOIN film_actors fa ON fa.film_id = f.id
        LEFT JOIN actors a ON a.id = fa.actor_id
        WHERE f.id = $1
        ORDER BY fa.position
        "#,
    )
    .bind(id.0)
    .fetch_all(&mut *conn)
    .await
    .map_err(translate)?;

    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let mut film = Film {
        id: FilmId(first.get("id")),
        title: first.get("title"),
        description: first.get("description"),
        created_at: first.get::<DateTime<Utc>, _>("created_at"),
        actors: Vec::with_capacity(rows.len()),
    };

    for row in &rows {
        // LEFT JOIN: a film without cast yields one all-NULL actor row
        if let Some(actor_id) = row.get::<Option<i64>, _>("actor_id") {
            film.actors.push(Actor {
                id: ActorId(actor_id),
                last_name: row.get("last_name"),
                first_name: row.get("first_name"),
            });
        }
    }

    Ok(Some(film))
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    /// Submit a film graph: lookup, reconcile, and insert, all in one
    /// transaction. A uniqueness violation anywhere rolls the whole
    /// submission back and surfaces as a typed duplicate error.
    async fn submit(&self, draft: FilmDraft) -> Result<Film, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("begin submit transaction")?;

        let keys = reconcile::lookup_keys(&draft);
        let existing = lookup_actor_ids(&mut *tx, &keys).await?;
        let plan = reconcile::reconcile(&draft, &existing);
        debug!(
            title = %plan.title,
            reused = existing.len(),
            inserted = plan.inserts.len(),
            "reconciled cast"
        );

        let film_id: i64 = sqlx::query_scalar(
            "INSERT INTO films (title, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&plan.title)
        .bind(&plan.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(translate)?;

        let mut new_ids = Vec::with_capacity(plan.inserts.len());
        for name in &plan.inserts {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO actors (last_name, first_name) VALUES ($1, $2) RETURNING id",
            )
            .bind(&name.last_name)
            .bind(&name.first_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(translate)?;
            new_ids.push(ActorId(id));
        }

        for (position, slot) in plan.cast.iter().enumerate() {
            let actor_id = match slot {
                CastSlot::Existing(id) => *id,
                CastSlot::New { idx } => new_ids[*idx],
            };
            sqlx::query(
                "INSERT INTO film_actors (film_id, actor_id, position) VALUES ($1, $2, $3)",
            )
            .bind(film_id)
            .bind(actor_id.0)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(translate)?;
        }

        // Read the committed shape back inside the same transaction so
        // the returned graph is complete, ids and timestamps included.
        let film = fetch_film(&mut *tx, FilmId(film_id))
            .await?
            .context("submitted film vanished within its own transaction")?;

        tx.commit().await.map_err(translate)?;
        Ok(film)
    }

    async fn film(&self, id: FilmId) -> Result<Option<Film>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("acquire connection for fetch")?;
        fetch_film(&mut *conn, id).await
    }

    async fn delete_film(&self, id: FilmId) -> Result<(), StoreError> {
        // cast links go via ON DELETE CASCADE; actors are shared and stay
        sqlx::query("DELETE FROM films WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(translate)?;
        Ok(())
    }
}
