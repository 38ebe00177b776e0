use anyhow::ensure;
use config::{File, FileFormat, Source};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};

use actor_core::config::ConfigBuilder;

use crate::TEST_CLIENT_CONFIG;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestClientConfig {
    pub game: GameConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Probability in `0.0..=1.0` that a play is a win.
    pub win_chance: f64,
    pub rewards: Vec<String>,
    /// Reward reported on a loss.
    pub consolation: String,
}

impl GameConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!((0.0..=1.0).contains(&self.win_chance), "game win_chance {} is not within 0.0..=1.0", self.win_chance);
        ensure!(!self.rewards.is_empty(), "game rewards must not be empty");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Key prefix of player records in etcd.
    pub prefix: String,
}

impl TestClientConfig {
    pub fn builder() -> TestClientConfigBuilder {
        TestClientConfigBuilder::default()
    }
}

#[derive(Debug)]
pub struct TestClientConfigBuilder {
    builder: config::ConfigBuilder<DefaultState>,
}

impl Default for TestClientConfigBuilder {
    fn default() -> Self {
        let builder = config::Config::builder().add_source(File::from_str(TEST_CLIENT_CONFIG, FileFormat::Toml));
        Self { builder }
    }
}

impl ConfigBuilder for TestClientConfigBuilder {
    type C = TestClientConfig;

    fn add_source<T>(self, source: T) -> anyhow::Result<Self> where T: Source + Send + Sync + 'static {
        Ok(Self { builder: self.builder.add_source(source) })
    }

    fn build(self) -> anyhow::Result<Self::C> {
        let config = self.builder.build()?.try_deserialize::<Self::C>()?;
        config.game.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use config::{File, FileFormat};

    use actor_core::config::ConfigBuilder;

    use crate::config::{GameConfig, TestClientConfig};

    #[test]
    fn test_default_config() -> anyhow::Result<()> {
        let config = TestClientConfig::builder().build()?;
        assert_eq!(config.game.win_chance, 0.5);
        assert_eq!(config.game.rewards.len(), 5);
        assert_eq!(config.game.consolation, "none");
        assert_eq!(config.store.prefix, "/test-client/players/");
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_win_chance() -> anyhow::Result<()> {
        let result = TestClientConfig::builder()
            .add_source(File::from_str("[game]\nwin_chance = 1.5", FileFormat::Toml))?
            .build();
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_rejects_empty_rewards() {
        let config = GameConfig {
            win_chance: 0.5,
            rewards: vec![],
            consolation: "none".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
