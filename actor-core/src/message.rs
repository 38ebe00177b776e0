use std::any::type_name;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::debug;

use crate::addressable::{Addressable, AddressableContext, DeactivationReason};

/// A request handled by the activation of [Message::A] that owns the target key.
#[async_trait]
pub trait Message: Send + Sized + 'static {
    type A: Addressable;
    type Output: Send + 'static;

    async fn handle(self, context: &mut AddressableContext, actor: &mut Self::A) -> anyhow::Result<Self::Output>;
}

pub(crate) type DeactivateReply = oneshot::Sender<anyhow::Result<()>>;

pub(crate) enum Envelope<A> {
    Ask(Box<dyn Handler<A>>),
    Deactivate {
        reason: DeactivationReason,
        reply: DeactivateReply,
    },
}

#[async_trait]
pub(crate) trait Handler<A>: Send where A: Addressable {
    async fn handle(self: Box<Self>, context: &mut AddressableContext, actor: &mut A);

    fn reject(self: Box<Self>, error: anyhow::Error);
}

pub(crate) struct AskHandler<M> where M: Message {
    message: M,
    reply: oneshot::Sender<anyhow::Result<M::Output>>,
}

impl<M> AskHandler<M> where M: Message {
    pub(crate) fn new(message: M, reply: oneshot::Sender<anyhow::Result<M::Output>>) -> Self {
        Self { message, reply }
    }
}

#[async_trait]
impl<M> Handler<M::A> for AskHandler<M> where M: Message {
    async fn handle(self: Box<Self>, context: &mut AddressableContext, actor: &mut M::A) {
        let Self { message, reply } = *self;
        let result = message.handle(context, actor).await;
        if let Err(error) = &result {
            debug!("{} handle {} failed: {:#}", context.reference(), type_name::<M>(), error);
        }
        let _ = reply.send(result);
    }

    fn reject(self: Box<Self>, error: anyhow::Error) {
        let _ = self.reply.send(Err(error));
    }
}
