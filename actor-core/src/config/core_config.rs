use config::{File, FileFormat, Source};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};

use crate::config::ConfigBuilder;
use crate::CORE_CONFIG;
use crate::util::duration::ConfigDuration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub mailbox_capacity: usize,
    /// Idle time after which an activation deactivates itself, never when absent.
    pub addressable_ttl: Option<ConfigDuration>,
    pub message_timeout: Option<ConfigDuration>,
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

#[derive(Debug)]
pub struct CoreConfigBuilder {
    builder: config::ConfigBuilder<DefaultState>,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        let builder = config::Config::builder().add_source(File::from_str(CORE_CONFIG, FileFormat::Toml));
        Self { builder }
    }
}

impl ConfigBuilder for CoreConfigBuilder {
    type C = CoreConfig;

    fn add_source<T>(self, source: T) -> anyhow::Result<Self> where T: Source + Send + Sync + 'static {
        Ok(Self { builder: self.builder.add_source(source) })
    }

    fn build(self) -> anyhow::Result<Self::C> {
        let core_config = self.builder.build()?.try_deserialize::<Self::C>()?;
        Ok(core_config)
    }
}
