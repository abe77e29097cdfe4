//! Persistence layer.
//!
//! SQLite-backed tournament store. The `tournaments` table is the
//! durable contract other tools (export, a future API server) depend
//! on; its shape must not change without a migration.
//!
//! Writes are independent inserts with no dedup key, so repeated runs
//! over the same sources will duplicate rows. The pool is capped at a
//! single connection, serializing writers.

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::types::Tournament;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS tournaments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    sport TEXT NOT NULL,
    level TEXT NOT NULL,
    start_date DATE,
    end_date DATE,
    official_url TEXT,
    streaming_links TEXT,
    image_url TEXT,
    summary TEXT,
    location TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_INDEXES_SQL: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_sport ON tournaments(sport)",
    "CREATE INDEX IF NOT EXISTS idx_level ON tournaments(level)",
    "CREATE INDEX IF NOT EXISTS idx_start_date ON tournaments(start_date)",
];

/// A stored row, as read back for export and queries. Dates stay in
/// their ISO text form; `level` stays a string so rows written under a
/// different policy still round-trip.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredTournament {
    pub id: i64,
    pub name: String,
    pub sport: String,
    pub level: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub official_url: Option<String>,
    pub streaming_links: Option<String>,
    pub image_url: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub created_at: Option<String>,
}

pub struct TournamentStore {
    pool: SqlitePool,
}

impl TournamentStore {
    /// Open (creating if missing) a database file.
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let store = Self::with_options(options).await?;
        info!(path, "Tournament store opened");
        Ok(store)
    }

    /// Open an in-memory database (tests, dry runs).
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::with_options(SqliteConnectOptions::new().in_memory(true)).await
    }

    async fn with_options(options: SqliteConnectOptions) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create the tournaments table and its indexes. Idempotent.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        for index_sql in CREATE_INDEXES_SQL {
            sqlx::query(index_sql).execute(&self.pool).await?;
        }
        debug!("Schema ready");
        Ok(())
    }

    /// Insert one validated tournament. Returns the new row id.
    pub async fn save(&self, t: &Tournament) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO tournaments
                (name, sport, level, start_date, end_date, official_url,
                 streaming_links, image_url, summary, location)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&t.name)
        .bind(&t.sport)
        .bind(t.level.as_str())
        .bind(t.start_date.to_string())
        .bind(t.end_date.map(|d| d.to_string()))
        .bind(&t.official_url)
        .bind(&t.streaming_links)
        .bind(&t.image_url)
        .bind(&t.summary)
        .bind(&t.location)
        .execute(&self.pool)
        .await?;

        debug!(name = %t.name, level = %t.level, "Saved tournament");
        Ok(result.last_insert_rowid())
    }

    /// Per-level tournament counts for a sport, descending by count.
    pub async fn breakdown_by_level(
        &self,
        sport: &str,
    ) -> Result<Vec<(String, i64)>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT level, COUNT(*) as count
            FROM tournaments
            WHERE sport = ?
            GROUP BY level
            ORDER BY count DESC
            "#,
        )
        .bind(sport)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("level"), row.get("count")))
            .collect())
    }

    /// Total stored tournaments for a sport.
    pub async fn count_for_sport(&self, sport: &str) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM tournaments WHERE sport = ?")
            .bind(sport)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    /// All rows for a sport, earliest start first. Used by export.
    pub async fn list_by_sport(
        &self,
        sport: &str,
    ) -> Result<Vec<StoredTournament>, StorageError> {
        let rows = sqlx::query_as::<_, StoredTournament>(
            r#"
            SELECT id, name, sport, level, start_date, end_date, official_url,
                   streaming_links, image_url, summary, location, created_at
            FROM tournaments
            WHERE sport = ?
            ORDER BY start_date ASC, id ASC
            "#,
        )
        .bind(sport)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    async fn store() -> TournamentStore {
        let store = TournamentStore::in_memory().await.unwrap();
        store.init_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_init_schema_idempotent() {
        let store = store().await;
        store.init_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_save_and_count() {
        let store = store().await;
        let id = store.save(&Tournament::sample()).await.unwrap();
        assert!(id > 0);
        assert_eq!(store.count_for_sport("cricket").await.unwrap(), 1);
        assert_eq!(store.count_for_sport("tennis").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_saves_duplicate_rows() {
        // No dedup key: identical records land as separate rows.
        let store = store().await;
        let t = Tournament::sample();
        store.save(&t).await.unwrap();
        store.save(&t).await.unwrap();
        assert_eq!(store.count_for_sport("cricket").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_breakdown_descending_by_count() {
        let store = store().await;
        let mut international = Tournament::sample();
        international.level = Level::International;
        let mut club = Tournament::sample();
        club.level = Level::Club;

        store.save(&international).await.unwrap();
        store.save(&international).await.unwrap();
        store.save(&club).await.unwrap();

        let breakdown = store.breakdown_by_level("cricket").await.unwrap();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0], ("International".to_string(), 2));
        assert_eq!(breakdown[1], ("Club".to_string(), 1));
    }

    #[tokio::test]
    async fn test_breakdown_scoped_to_sport() {
        let store = store().await;
        let mut cricket = Tournament::sample();
        cricket.sport = "cricket".to_string();
        let mut tennis = Tournament::sample();
        tennis.sport = "tennis".to_string();

        store.save(&cricket).await.unwrap();
        store.save(&tennis).await.unwrap();

        let breakdown = store.breakdown_by_level("cricket").await.unwrap();
        assert_eq!(breakdown, vec![("International".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_list_by_sport_round_trips_fields() {
        let store = store().await;
        let t = Tournament::sample();
        store.save(&t).await.unwrap();

        let rows = store.list_by_sport("cricket").await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, t.name);
        assert_eq!(row.level, "International");
        assert_eq!(row.start_date.as_deref(), Some("2099-03-01"));
        assert_eq!(row.end_date.as_deref(), Some("2099-03-14"));
        assert_eq!(row.streaming_links, t.streaming_links);
        assert!(row.created_at.is_some());
    }

    #[tokio::test]
    async fn test_list_ordered_by_start_date() {
        let store = store().await;
        let mut later = Tournament::sample();
        later.name = "Later Cup 2099".to_string();
        later.start_date = chrono::NaiveDate::from_ymd_opt(2099, 9, 1).unwrap();
        let earlier = Tournament::sample();

        store.save(&later).await.unwrap();
        store.save(&earlier).await.unwrap();

        let rows = store.list_by_sport("cricket").await.unwrap();
        assert_eq!(rows[0].name, earlier.name);
        assert_eq!(rows[1].name, "Later Cup 2099");
    }
}
