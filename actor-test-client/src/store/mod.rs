use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod etcd;
pub mod memory;

/// Durable form of a player, one record per player key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub key: String,
    pub rewards: Vec<String>,
}

#[async_trait]
pub trait PlayerStore: Send + Sync + Debug {
    async fn get(&self, id: &str) -> anyhow::Result<Option<PlayerRecord>>;

    /// Inserts or replaces the record stored under `record.key`.
    async fn put(&self, record: PlayerRecord) -> anyhow::Result<()>;
}
