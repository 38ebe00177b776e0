use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use actor_core::{Addressable, AddressableContext, DeactivationReason};
use actor_core::actor_ref::ActorRef;
use actor_core::props::Props;

use crate::game::{GameFactory, PlayedGameResult};
use crate::player::get_data::GetData;
use crate::player::play_game::PlayGame;
use crate::store::{PlayerRecord, PlayerStore};

pub mod get_data;
pub mod play_game;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub rewards: Vec<String>,
}

/// A player keyed by a string id. Rewards are loaded on activation and written
/// back after every game and on deactivation.
#[derive(Debug)]
pub struct PlayerActor {
    pub id: String,
    pub rewards: Vec<String>,
    store: Arc<dyn PlayerStore>,
    games: Arc<dyn GameFactory>,
}

impl PlayerActor {
    pub fn new(id: impl Into<String>, store: Arc<dyn PlayerStore>, games: Arc<dyn GameFactory>) -> Self {
        Self {
            id: id.into(),
            rewards: vec![],
            store,
            games,
        }
    }

    pub fn props(store: Arc<dyn PlayerStore>, games: Arc<dyn GameFactory>) -> Props<Self> {
        Props::new(move |key, _| {
            let id = key.as_str().ok_or_else(|| anyhow!("player key must be a string key, got {:?}", key))?;
            Ok(PlayerActor::new(id, store.clone(), games.clone()))
        })
    }

    pub fn to_record(&self) -> PlayerRecord {
        PlayerRecord {
            key: self.id.clone(),
            rewards: self.rewards.clone(),
        }
    }

    async fn load(&mut self) -> anyhow::Result<()> {
        let loaded = self.store.get(&self.id).await?;
        self.rewards = loaded.map(|record| record.rewards).unwrap_or_default();
        Ok(())
    }

    pub(crate) async fn save(&self) -> anyhow::Result<()> {
        self.store.put(self.to_record()).await
    }
}

#[async_trait]
impl Addressable for PlayerActor {
    const KIND: &'static str = "player";

    async fn on_activate(&mut self, _context: &mut AddressableContext) -> anyhow::Result<()> {
        info!("activating player {}", self.id);
        self.load().await
    }

    async fn on_deactivate(&mut self, _context: &mut AddressableContext, reason: DeactivationReason) -> anyhow::Result<()> {
        info!("deactivating player {} because {}", self.id, reason);
        self.save().await
    }
}

/// Typed operations of a player reference.
#[async_trait]
pub trait Player {
    async fn get_data(&self) -> anyhow::Result<PlayerData>;

    async fn play_game(&self, game_id: &str) -> anyhow::Result<PlayedGameResult>;
}

#[async_trait]
impl Player for ActorRef<PlayerActor> {
    async fn get_data(&self) -> anyhow::Result<PlayerData> {
        self.ask(GetData).await
    }

    async fn play_game(&self, game_id: &str) -> anyhow::Result<PlayedGameResult> {
        self.ask(PlayGame { game_id: game_id.to_string() }).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::{anyhow, bail};
    use async_trait::async_trait;

    use actor_core::DeactivationReason;
    use actor_core::config::ConfigBuilder;
    use actor_core::config::core_config::CoreConfig;
    use actor_core::error::Error;
    use actor_core::system::ActorSystem;
    use actor_core::util::duration::ConfigDuration;

    use crate::config::{GameConfig, TestClientConfig};
    use crate::game::{Game, GameFactory, PlayedGameResult};
    use crate::player::{Player, PlayerActor, PlayerData};
    use crate::register_test_client;
    use crate::store::{PlayerRecord, PlayerStore};
    use crate::store::memory::InMemoryPlayerStore;

    #[derive(Debug, Default)]
    struct RecordingStore {
        inner: InMemoryPlayerStore,
        puts: Mutex<Vec<PlayerRecord>>,
        fail_get: AtomicBool,
        fail_put: AtomicBool,
    }

    impl RecordingStore {
        fn with_records(records: impl IntoIterator<Item=PlayerRecord>) -> Self {
            Self {
                inner: InMemoryPlayerStore::with_records(records),
                ..Default::default()
            }
        }

        fn puts(&self) -> Vec<PlayerRecord> {
            self.puts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PlayerStore for RecordingStore {
        async fn get(&self, id: &str) -> anyhow::Result<Option<PlayerRecord>> {
            if self.fail_get.load(Ordering::SeqCst) {
                bail!("store unavailable");
            }
            self.inner.get(id).await
        }

        async fn put(&self, record: PlayerRecord) -> anyhow::Result<()> {
            if self.fail_put.load(Ordering::SeqCst) {
                bail!("store write failed");
            }
            self.puts.lock().unwrap().push(record.clone());
            self.inner.put(record).await
        }
    }

    /// Answers plays from a queue of outcomes, an `Err` plays as an unreachable game.
    #[derive(Debug, Default, Clone)]
    struct ScriptedGames {
        outcomes: Arc<Mutex<VecDeque<Result<PlayedGameResult, String>>>>,
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ScriptedGames {
        fn push_win(&self, reward: &str) {
            let result = PlayedGameResult { winner: true, reward: reward.to_string() };
            self.outcomes.lock().unwrap().push_back(Ok(result));
        }

        fn push_loss(&self, reward: &str) {
            let result = PlayedGameResult { winner: false, reward: reward.to_string() };
            self.outcomes.lock().unwrap().push_back(Ok(result));
        }

        fn push_unreachable(&self, game_id: &str) {
            self.outcomes.lock().unwrap().push_back(Err(format!("game {} unreachable", game_id)));
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GameFactory for ScriptedGames {
        fn create_proxy(&self, game_id: &str) -> anyhow::Result<Box<dyn Game>> {
            Ok(Box::new(ScriptedGame { game_id: game_id.to_string(), games: self.clone() }))
        }
    }

    struct ScriptedGame {
        game_id: String,
        games: ScriptedGames,
    }

    #[async_trait]
    impl Game for ScriptedGame {
        async fn play(&self, player_id: &str) -> anyhow::Result<PlayedGameResult> {
            self.games.calls.lock().unwrap().push((self.game_id.clone(), player_id.to_string()));
            let outcome = self.games.outcomes.lock().unwrap().pop_front();
            match outcome {
                Some(Ok(result)) => Ok(result),
                Some(Err(error)) => Err(anyhow!(error)),
                None => bail!("no outcome scripted for game {}", self.game_id),
            }
        }
    }

    fn core_config() -> CoreConfig {
        CoreConfig {
            mailbox_capacity: 16,
            addressable_ttl: None,
            message_timeout: Some(ConfigDuration::from_secs(3)),
        }
    }

    fn player_system(store: Arc<RecordingStore>, games: ScriptedGames) -> anyhow::Result<ActorSystem> {
        let system = ActorSystem::new("test-client", core_config());
        system.register(PlayerActor::props(store, Arc::new(games)))?;
        Ok(system)
    }

    fn record(key: &str, rewards: &[&str]) -> PlayerRecord {
        PlayerRecord {
            key: key.to_string(),
            rewards: rewards.iter().map(|reward| reward.to_string()).collect(),
        }
    }

    fn data(rewards: &[&str]) -> PlayerData {
        PlayerData {
            rewards: rewards.iter().map(|reward| reward.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_new_player_starts_without_rewards() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::default());
        let system = player_system(store.clone(), ScriptedGames::default())?;
        let player = system.actor_ref::<PlayerActor>("p0")?;
        assert_eq!(player.get_data().await?, data(&[]));
        assert!(store.puts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_saved_player_restores_rewards_in_order() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::with_records([record("p1", &["boots", "sword", "boots"])]));
        let system = player_system(store, ScriptedGames::default())?;
        let player = system.actor_ref::<PlayerActor>("p1")?;
        assert_eq!(player.get_data().await?, data(&["boots", "sword", "boots"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_data_is_idempotent() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::with_records([record("p1", &["shield"])]));
        let system = player_system(store, ScriptedGames::default())?;
        let player = system.actor_ref::<PlayerActor>("p1")?;
        let first = player.get_data().await?;
        let second = player.get_data().await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn test_winning_appends_reward_and_saves() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::with_records([record("p1", &["shield"])]));
        let games = ScriptedGames::default();
        games.push_win("sword");
        let system = player_system(store.clone(), games.clone())?;
        let player = system.actor_ref::<PlayerActor>("p1")?;
        let before = player.get_data().await?;
        let result = player.play_game("g1").await?;
        assert_eq!(result, PlayedGameResult { winner: true, reward: "sword".to_string() });
        assert_eq!(player.get_data().await?, data(&["shield", "sword"]));
        assert_eq!(before, data(&["shield"]));
        assert_eq!(store.puts(), vec![record("p1", &["shield", "sword"])]);
        assert_eq!(games.calls(), vec![("g1".to_string(), "p1".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn test_losing_keeps_rewards_and_still_saves() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::with_records([record("p2", &["shield"])]));
        let games = ScriptedGames::default();
        games.push_loss("none");
        let system = player_system(store.clone(), games)?;
        let player = system.actor_ref::<PlayerActor>("p2")?;
        let result = player.play_game("g2").await?;
        assert_eq!(result, PlayedGameResult { winner: false, reward: "none".to_string() });
        assert_eq!(player.get_data().await?, data(&["shield"]));
        assert_eq!(store.puts(), vec![record("p2", &["shield"])]);
        Ok(())
    }

    #[tokio::test]
    async fn test_reward_survives_reactivation() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::default());
        let games = ScriptedGames::default();
        games.push_win("sword");
        let system = player_system(store.clone(), games)?;
        let player = system.actor_ref::<PlayerActor>("p1")?;
        player.play_game("g1").await?;
        assert_eq!(player.get_data().await?, data(&["sword"]));
        player.deactivate(DeactivationReason::ExternallyTriggered).await?;
        assert_eq!(system.active_count::<PlayerActor>()?, 0);
        assert_eq!(store.puts(), vec![record("p1", &["sword"]), record("p1", &["sword"])]);
        assert_eq!(player.get_data().await?, data(&["sword"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_game_changes_nothing() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::with_records([record("p3", &["shield"])]));
        let games = ScriptedGames::default();
        games.push_unreachable("g3");
        let system = player_system(store.clone(), games)?;
        let player = system.actor_ref::<PlayerActor>("p3")?;
        let error = player.play_game("g3").await.unwrap_err();
        assert_eq!(error.to_string(), "game g3 unreachable");
        assert_eq!(player.get_data().await?, data(&["shield"]));
        assert!(store.puts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_store_failure_fails_activation() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::default());
        store.fail_get.store(true, Ordering::SeqCst);
        let system = player_system(store.clone(), ScriptedGames::default())?;
        let player = system.actor_ref::<PlayerActor>("p4")?;
        let error = player.get_data().await.unwrap_err();
        match error.downcast_ref::<Error>() {
            Some(Error::ActivationFailed { cause, .. }) => assert_eq!(cause, "store unavailable"),
            other => panic!("expect ActivationFailed, got {:?}", other),
        }
        assert!(store.puts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_failure_propagates_from_play_game() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::default());
        let games = ScriptedGames::default();
        games.push_win("sword");
        let system = player_system(store.clone(), games)?;
        let player = system.actor_ref::<PlayerActor>("p5")?;
        player.get_data().await?;
        store.fail_put.store(true, Ordering::SeqCst);
        let error = player.play_game("g1").await.unwrap_err();
        assert_eq!(error.to_string(), "store write failed");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_deactivation_save_is_surfaced() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::default());
        let system = player_system(store.clone(), ScriptedGames::default())?;
        let player = system.actor_ref::<PlayerActor>("p6")?;
        player.get_data().await?;
        store.fail_put.store(true, Ordering::SeqCst);
        let error = player.deactivate(DeactivationReason::ExternallyTriggered).await.unwrap_err();
        assert_eq!(error.to_string(), "store write failed");
        assert_eq!(system.active_count::<PlayerActor>()?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_string_key_is_rejected() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::default());
        let system = player_system(store, ScriptedGames::default())?;
        let player = system.actor_ref::<PlayerActor>(7i64)?;
        let error = player.get_data().await.unwrap_err();
        assert!(matches!(error.downcast_ref::<Error>(), Some(Error::ActivationFailed { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_saves_every_player() -> anyhow::Result<()> {
        let store = Arc::new(RecordingStore::default());
        let games = ScriptedGames::default();
        for reward in ["sword", "shield", "potion"] {
            games.push_win(reward);
        }
        let system = player_system(store.clone(), games)?;
        for id in ["p1", "p2", "p3"] {
            system.actor_ref::<PlayerActor>(id)?.play_game("g1").await?;
        }
        system.shutdown().await?;
        assert_eq!(store.puts().len(), 6);
        for id in ["p1", "p2", "p3"] {
            let saved = store.inner.get(id).await?.expect("player saved");
            assert_eq!(saved.rewards.len(), 1);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_play_against_hosted_games() -> anyhow::Result<()> {
        let mut config = TestClientConfig::builder().build()?;
        config.game = GameConfig {
            win_chance: 1.0,
            rewards: vec!["sword".to_string()],
            consolation: "none".to_string(),
        };
        let system = ActorSystem::new("test-client", core_config());
        let store = Arc::new(InMemoryPlayerStore::default());
        register_test_client(&system, store.clone(), &config)?;
        let player = system.actor_ref::<PlayerActor>("p1")?;
        let result = player.play_game("g1").await?;
        assert_eq!(result, PlayedGameResult { winner: true, reward: "sword".to_string() });
        assert_eq!(player.get_data().await?, data(&["sword"]));
        assert_eq!(store.get("p1").await?, Some(record("p1", &["sword"])));
        system.shutdown().await?;
        Ok(())
    }
}
