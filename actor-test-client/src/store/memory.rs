use async_trait::async_trait;
use dashmap::DashMap;

use crate::store::{PlayerRecord, PlayerStore};

#[derive(Debug, Default)]
pub struct InMemoryPlayerStore {
    records: DashMap<String, PlayerRecord, ahash::RandomState>,
}

impl InMemoryPlayerStore {
    pub fn with_records(records: impl IntoIterator<Item=PlayerRecord>) -> Self {
        let store = Self::default();
        for record in records {
            store.records.insert(record.key.clone(), record);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PlayerStore for InMemoryPlayerStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<PlayerRecord>> {
        Ok(self.records.get(id).map(|record| record.value().clone()))
    }

    async fn put(&self, record: PlayerRecord) -> anyhow::Result<()> {
        self.records.insert(record.key.clone(), record);
        Ok(())
    }
}
