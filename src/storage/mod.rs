pub mod memtable;
pub mod postgres;
pub mod record;

pub use memtable::MemTable;
pub use postgres::PgStore;
pub use record::LiveDataRecord;

use async_trait::async_trait;

/// The single gateway to persisted live data. Implementations must be safe
/// to share across concurrent requests.
#[async_trait]
pub trait LiveDataStore: Send + Sync {
    /// Create the backing table if it does not exist yet. Safe to call repeatedly.
    async fn ensure_schema(&self) -> Result<(), sqlx::Error>;

    /// Insert `record`, or overwrite `time` and `speed` of the row with the same segment id.
    async fn upsert(&self, record: &LiveDataRecord) -> Result<(), sqlx::Error>;

    /// Every stored record, in whatever order the backend yields them.
    async fn query_all(&self) -> Result<Vec<LiveDataRecord>, sqlx::Error>;
}
