use async_trait::async_trait;
use tracing::debug;

use actor_core::{AddressableContext, Message};

use crate::game::{GameActor, PlayedGameResult};

#[derive(Debug, Clone)]
pub struct Play {
    pub player_id: String,
}

#[async_trait]
impl Message for Play {
    type A = GameActor;
    type Output = PlayedGameResult;

    async fn handle(self, _context: &mut AddressableContext, actor: &mut Self::A) -> anyhow::Result<Self::Output> {
        let result = actor.roll(&mut rand::thread_rng());
        actor.played += 1;
        debug!("game {} played by {}: {:?}", actor.id, self.player_id, result);
        Ok(result)
    }
}
