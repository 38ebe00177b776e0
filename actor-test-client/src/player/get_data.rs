use async_trait::async_trait;

use actor_core::{AddressableContext, Message};

use crate::player::{PlayerActor, PlayerData};

#[derive(Debug, Clone)]
pub struct GetData;

#[async_trait]
impl Message for GetData {
    type A = PlayerActor;
    type Output = PlayerData;

    async fn handle(self, _context: &mut AddressableContext, actor: &mut Self::A) -> anyhow::Result<Self::Output> {
        Ok(PlayerData { rewards: actor.rewards.clone() })
    }
}
