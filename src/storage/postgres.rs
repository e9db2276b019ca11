use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{LiveDataRecord, LiveDataStore};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS livedata (
    segmentid  INTEGER PRIMARY KEY,
    time       TIMESTAMP WITH TIME ZONE,
    speed      INTEGER
)"#;

const UPSERT: &str = r#"
INSERT INTO livedata (segmentid, time, speed)
VALUES ($1, $2, $3)
ON CONFLICT (segmentid) DO UPDATE SET time = EXCLUDED.time, speed = EXCLUDED.speed"#;

const SELECT_ALL: &str = "SELECT segmentid, time, speed FROM livedata";

/// Postgres-backed store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url`. Fails if the backend cannot be reached.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl LiveDataStore for PgStore {
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert(&self, record: &LiveDataRecord) -> Result<(), sqlx::Error> {
        sqlx::query(UPSERT)
            .bind(record.segment_id)
            .bind(record.time)
            .bind(record.speed)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<LiveDataRecord>, sqlx::Error> {
        sqlx::query_as::<_, LiveDataRecord>(SELECT_ALL).fetch_all(&self.pool).await
    }
}
