use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};

use crate::activation::state::ActivationState;
use crate::addressable::{Addressable, AddressableContext, DeactivationReason};
use crate::directory::Directory;
use crate::error::Error;
use crate::message::{DeactivateReply, Envelope};

pub mod state;

/// The task that owns one addressable instance from activation to eviction.
pub(crate) struct Activation<A> where A: Addressable {
    pub(crate) id: u64,
    pub(crate) directory: Arc<Directory<A>>,
    pub(crate) context: AddressableContext,
    pub(crate) mailbox: mpsc::Receiver<Envelope<A>>,
    pub(crate) terminated: watch::Sender<bool>,
    pub(crate) ttl: Option<Duration>,
}

impl<A> Activation<A> where A: Addressable {
    pub(crate) async fn run(mut self) {
        let mut actor = match self.activate().await {
            Ok(actor) => actor,
            Err(error) => {
                self.abort(error).await;
                return;
            }
        };
        let (reason, mut replies) = self.receive(&mut actor).await;
        // messages accepted before the mailbox closed are still handled while active
        self.mailbox.close();
        while let Some(envelope) = self.mailbox.recv().await {
            match envelope {
                Envelope::Ask(handler) => {
                    debug_assert!(self.context.state().accepts_messages());
                    handler.handle(&mut self.context, &mut actor).await;
                }
                Envelope::Deactivate { reply, .. } => {
                    replies.push(reply);
                }
            }
        }
        let result = self.deactivate(&mut actor, reason).await;
        self.finish();
        Self::reply_deactivated(replies, result);
    }

    async fn activate(&mut self) -> anyhow::Result<A> {
        self.context.transition(ActivationState::Activating)?;
        debug!("{} activating", self.context.reference());
        let mut actor = self.directory.props.new_addressable(self.context.key(), self.context.system())?;
        actor.on_activate(&mut self.context).await?;
        self.context.transition(ActivationState::Active)?;
        debug!("{} activated", self.context.reference());
        Ok(actor)
    }

    /// Failed activations never reach `on_deactivate`, nothing was loaded that
    /// could be written back.
    async fn abort(&mut self, error: anyhow::Error) {
        error!("{} activation failed: {:?}", self.context.reference(), error);
        if let Err(error) = self.context.transition(ActivationState::Inactive) {
            warn!("{}", error);
        }
        let reference = self.context.reference().to_string();
        let cause = format!("{:#}", error);
        self.mailbox.close();
        while let Some(envelope) = self.mailbox.recv().await {
            match envelope {
                Envelope::Ask(handler) => {
                    let error = Error::ActivationFailed {
                        reference: reference.clone(),
                        cause: cause.clone(),
                    };
                    handler.reject(error.into());
                }
                Envelope::Deactivate { reply, .. } => {
                    let _ = reply.send(Ok(()));
                }
            }
        }
        self.finish();
    }

    async fn receive(&mut self, actor: &mut A) -> (DeactivationReason, Vec<DeactivateReply>) {
        loop {
            let next = match self.ttl {
                Some(ttl) => {
                    match tokio::time::timeout(ttl, self.mailbox.recv()).await {
                        Ok(next) => next,
                        Err(_) => {
                            debug!("{} idle for {:?}", self.context.reference(), ttl);
                            return (DeactivationReason::TtlExpired, vec![]);
                        }
                    }
                }
                None => self.mailbox.recv().await,
            };
            match next {
                Some(Envelope::Ask(handler)) => {
                    debug_assert!(self.context.state().accepts_messages());
                    handler.handle(&mut self.context, actor).await;
                }
                Some(Envelope::Deactivate { reason, reply }) => {
                    return (reason, vec![reply]);
                }
                None => {
                    return (DeactivationReason::NodeShuttingDown, vec![]);
                }
            }
        }
    }

    async fn deactivate(&mut self, actor: &mut A, reason: DeactivationReason) -> anyhow::Result<()> {
        self.context.transition(ActivationState::Deactivating)?;
        debug!("{} deactivating because {}", self.context.reference(), reason);
        let result = actor.on_deactivate(&mut self.context, reason).await;
        if let Err(error) = &result {
            error!("{} deactivation failed, durable state may be stale: {:?}", self.context.reference(), error);
        }
        self.context.transition(ActivationState::Inactive)?;
        result
    }

    /// Only after the entry is gone may a new activation for the key start.
    fn finish(&mut self) {
        self.directory.remove(self.context.key(), self.id);
        self.terminated.send_replace(true);
        debug!("{} terminated", self.context.reference());
    }

    fn reply_deactivated(replies: Vec<DeactivateReply>, result: anyhow::Result<()>) {
        match result {
            Ok(_) => {
                for reply in replies {
                    let _ = reply.send(Ok(()));
                }
            }
            Err(error) => {
                let cause = format!("{:#}", error);
                let mut replies = replies.into_iter();
                if let Some(first) = replies.next() {
                    let _ = first.send(Err(error));
                }
                for reply in replies {
                    let _ = reply.send(Err(anyhow!(cause.clone())));
                }
            }
        }
    }
}
