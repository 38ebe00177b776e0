use std::fmt::Debug;

use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use actor_core::{Addressable, AddressableContext, DeactivationReason};
use actor_core::actor_ref::ActorRef;
use actor_core::props::Props;
use actor_core::system::{ActorSystem, WeakActorSystem};

use crate::config::GameConfig;
use crate::game::play::Play;

pub mod play;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedGameResult {
    pub winner: bool,
    pub reward: String,
}

/// A callable game, wherever it runs.
#[async_trait]
pub trait Game: Send + Sync {
    async fn play(&self, player_id: &str) -> anyhow::Result<PlayedGameResult>;
}

/// Resolves games by id.
pub trait GameFactory: Send + Sync + Debug {
    fn create_proxy(&self, game_id: &str) -> anyhow::Result<Box<dyn Game>>;
}

#[async_trait]
impl Game for ActorRef<GameActor> {
    async fn play(&self, player_id: &str) -> anyhow::Result<PlayedGameResult> {
        self.ask(Play { player_id: player_id.to_string() }).await
    }
}

/// Hands out references to [GameActor]s hosted by the actor system.
#[derive(Debug, Clone)]
pub struct ActorGameFactory {
    system: WeakActorSystem,
}

impl ActorGameFactory {
    pub fn new(system: &ActorSystem) -> Self {
        Self {
            system: system.downgrade(),
        }
    }
}

impl GameFactory for ActorGameFactory {
    fn create_proxy(&self, game_id: &str) -> anyhow::Result<Box<dyn Game>> {
        let game = self.system.upgrade()?.actor_ref::<GameActor>(game_id)?;
        Ok(Box::new(game))
    }
}

#[derive(Debug)]
pub struct GameActor {
    pub id: String,
    config: GameConfig,
    played: u64,
}

impl GameActor {
    pub fn new(id: impl Into<String>, config: GameConfig) -> Self {
        Self {
            id: id.into(),
            config,
            played: 0,
        }
    }

    pub fn props(config: GameConfig) -> Props<Self> {
        Props::new(move |key, _| {
            config.validate()?;
            Ok(GameActor::new(key.to_string(), config.clone()))
        })
    }

    pub(crate) fn roll<R>(&self, rng: &mut R) -> PlayedGameResult where R: Rng {
        let winner = rng.gen_bool(self.config.win_chance);
        let reward = if winner {
            self.config.rewards.choose(rng).cloned()
        } else {
            None
        };
        match reward {
            Some(reward) => PlayedGameResult { winner: true, reward },
            None => PlayedGameResult { winner: false, reward: self.config.consolation.clone() },
        }
    }
}

#[async_trait]
impl Addressable for GameActor {
    const KIND: &'static str = "game";

    async fn on_activate(&mut self, _context: &mut AddressableContext) -> anyhow::Result<()> {
        info!("game {} open", self.id);
        Ok(())
    }

    async fn on_deactivate(&mut self, _context: &mut AddressableContext, reason: DeactivationReason) -> anyhow::Result<()> {
        info!("game {} closed after {} plays because {}", self.id, self.played, reason);
        Ok(())
    }
}
