use std::sync::Arc;

use actor_core::system::ActorSystem;

use crate::config::TestClientConfig;
use crate::game::{ActorGameFactory, GameActor, GameFactory};
use crate::player::PlayerActor;
use crate::store::PlayerStore;

pub const TEST_CLIENT_CONFIG: &'static str = include_str!("../test-client.toml");

pub mod config;
pub mod game;
pub mod player;
pub mod store;

/// Registers the player and game addressables, players resolve games through
/// the same system.
pub fn register_test_client(system: &ActorSystem, store: Arc<dyn PlayerStore>, config: &TestClientConfig) -> anyhow::Result<()> {
    let games: Arc<dyn GameFactory> = Arc::new(ActorGameFactory::new(system));
    system.register(PlayerActor::props(store, games))?;
    system.register(GameActor::props(config.game.clone()))?;
    Ok(())
}
