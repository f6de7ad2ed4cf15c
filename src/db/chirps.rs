//! Chirp storage.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct ChirpStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Chirp {
    pub id: String,
    pub body: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sort direction for chirp listings, by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChirpOrder {
    Asc,
    #[default]
    Desc,
}

impl ChirpOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            ChirpOrder::Asc => "ASC",
            ChirpOrder::Desc => "DESC",
        }
    }
}

impl ChirpStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new chirp. The body must already be validated.
    pub async fn create(&self, user_id: &str, body: &str) -> Result<Chirp, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO chirps (id, body, user_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(body)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Chirp {
            id,
            body: body.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a chirp by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Chirp>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List chirps, optionally only those written by `author_id`.
    pub async fn list(
        &self,
        author_id: Option<&str>,
        order: ChirpOrder,
    ) -> Result<Vec<Chirp>, sqlx::Error> {
        // rowid breaks ties between chirps created within the same instant
        let sql = format!(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps
             WHERE (?1 IS NULL OR user_id = ?1)
             ORDER BY created_at {dir}, rowid {dir}",
            dir = order.as_sql()
        );

        sqlx::query_as(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Delete a chirp by ID. Returns true if a chirp was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
