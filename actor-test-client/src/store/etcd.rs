use std::fmt::{Debug, Formatter};

use anyhow::Context;
use async_trait::async_trait;
use etcd_client::Client;
use tracing::trace;

use crate::store::{PlayerRecord, PlayerStore};

/// Keeps each player as a JSON document under `{prefix}{player id}`.
#[derive(Clone)]
pub struct EtcdPlayerStore {
    client: Client,
    prefix: String,
}

impl Debug for EtcdPlayerStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtcdPlayerStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl EtcdPlayerStore {
    pub fn new(client: Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    pub async fn connect(endpoints: &[String], prefix: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::connect(endpoints, None)
            .await
            .with_context(|| format!("connect etcd {:?}", endpoints))?;
        Ok(Self::new(client, prefix))
    }

    fn record_key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }
}

#[async_trait]
impl PlayerStore for EtcdPlayerStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<PlayerRecord>> {
        let key = self.record_key(id);
        let mut client = self.client.clone();
        let resp = client.get(key.as_str(), None)
            .await
            .with_context(|| format!("get player record {}", key))?;
        match resp.kvs().first() {
            None => Ok(None),
            Some(kv) => {
                let record = serde_json::from_slice::<PlayerRecord>(kv.value())
                    .with_context(|| format!("decode player record {}", key))?;
                trace!("load {:?} from {}", record, key);
                Ok(Some(record))
            }
        }
    }

    async fn put(&self, record: PlayerRecord) -> anyhow::Result<()> {
        let key = self.record_key(&record.key);
        let value = serde_json::to_vec(&record)?;
        let mut client = self.client.clone();
        client.put(key.as_str(), value, None)
            .await
            .with_context(|| format!("put player record {}", key))?;
        trace!("save {:?} to {}", record, key);
        Ok(())
    }
}
