use async_trait::async_trait;
use tracing::info;

use actor_core::{AddressableContext, Message};

use crate::game::PlayedGameResult;
use crate::player::PlayerActor;

#[derive(Debug, Clone)]
pub struct PlayGame {
    pub game_id: String,
}

#[async_trait]
impl Message for PlayGame {
    type A = PlayerActor;
    type Output = PlayedGameResult;

    /// Rewards change only after the game answered, a failed game leaves the
    /// player untouched and unsaved.
    async fn handle(self, _context: &mut AddressableContext, actor: &mut Self::A) -> anyhow::Result<Self::Output> {
        let game = actor.games.create_proxy(&self.game_id)?;
        let result = game.play(&actor.id).await?;
        if result.winner {
            actor.rewards.push(result.reward.clone());
        }
        info!("player {} played game {}. prize: {}", actor.id, self.game_id, result.reward);
        actor.save().await?;
        Ok(result)
    }
}
