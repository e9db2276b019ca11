use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{LiveDataRecord, LiveDataStore};

/// In-process store keyed by segment id.
#[derive(Debug, Default)]
pub struct MemTable {
    buffer: Mutex<HashMap<i32, LiveDataRecord>>,
}

impl MemTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.buffer.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.buffer.lock().await.is_empty()
    }

    #[cfg(test)]
    pub async fn get(&self, segment_id: i32) -> Option<LiveDataRecord> {
        self.buffer.lock().await.get(&segment_id).cloned()
    }
}

#[async_trait]
impl LiveDataStore for MemTable {
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn upsert(&self, record: &LiveDataRecord) -> Result<(), sqlx::Error> {
        self.buffer.lock().await.insert(record.segment_id, record.clone());
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<LiveDataRecord>, sqlx::Error> {
        Ok(self.buffer.lock().await.values().cloned().collect())
    }
}
