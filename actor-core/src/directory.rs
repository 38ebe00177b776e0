use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::sync::mpsc::error::SendError;
use tracing::debug;

use crate::activation::Activation;
use crate::addressable::{Addressable, AddressableContext, AddressableReference, DeactivationReason};
use crate::config::core_config::CoreConfig;
use crate::error::Error;
use crate::key::Key;
use crate::message::Envelope;
use crate::props::Props;
use crate::system::{ActorSystem, WeakActorSystem};

/// Mailbox of one live activation. The activation task is the single consumer,
/// which serializes every operation on its key.
pub(crate) struct ActivationHandle<A> {
    pub(crate) id: u64,
    sender: mpsc::Sender<Envelope<A>>,
    terminated: watch::Receiver<bool>,
}

impl<A> Clone for ActivationHandle<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sender: self.sender.clone(),
            terminated: self.terminated.clone(),
        }
    }
}

impl<A> ActivationHandle<A> {
    /// A dropped watch sender means the task is gone without reporting, treat
    /// it the same as a normal termination.
    fn is_terminated(&self) -> bool {
        *self.terminated.borrow() || self.terminated.has_changed().is_err()
    }

    async fn wait_terminated(&self) {
        let mut terminated = self.terminated.clone();
        let _ = terminated.wait_for(|terminated| *terminated).await;
    }
}

/// Activations of one addressable kind, at most one per key.
pub(crate) struct Directory<A> where A: Addressable {
    system: WeakActorSystem,
    pub(crate) props: Props<A>,
    mailbox_capacity: usize,
    ttl: Option<Duration>,
    next_id: AtomicU64,
    activations: DashMap<Key, ActivationHandle<A>, ahash::RandomState>,
}

impl<A> Directory<A> where A: Addressable {
    pub(crate) fn new(system: WeakActorSystem, props: Props<A>, config: &CoreConfig) -> Self {
        Self {
            system,
            props,
            mailbox_capacity: config.mailbox_capacity.max(1),
            ttl: config.addressable_ttl.map(|ttl| ttl.into()),
            next_id: AtomicU64::new(0),
            activations: DashMap::default(),
        }
    }

    /// Returns the live activation of `key`, spawning one if none exists or the
    /// previous one has fully terminated.
    ///
    /// The shutdown flag is read while the shard lock of `key` is held, so any
    /// activation inserted here is visible to a later [AnyDirectory::deactivate_all].
    fn activation(self: &Arc<Self>, key: &Key) -> anyhow::Result<ActivationHandle<A>> {
        let system = self.system.upgrade()?;
        let entry = self.activations.entry(key.clone());
        if system.is_shutting_down() {
            return Err(Error::SystemShuttingDown(system.name().clone()).into());
        }
        let mut entry = entry.or_insert_with(|| self.spawn_activation(&system, key));
        if entry.is_terminated() {
            *entry = self.spawn_activation(&system, key);
        }
        Ok(entry.clone())
    }

    fn spawn_activation(self: &Arc<Self>, system: &ActorSystem, key: &Key) -> ActivationHandle<A> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, mailbox) = mpsc::channel(self.mailbox_capacity);
        let (terminated_tx, terminated) = watch::channel(false);
        let reference = AddressableReference::new(A::KIND, key.clone());
        debug!("spawn activation {} of {}", id, reference);
        let activation = Activation {
            id,
            directory: self.clone(),
            context: AddressableContext::new(reference, system.clone()),
            mailbox,
            terminated: terminated_tx,
            ttl: self.ttl,
        };
        tokio::spawn(activation.run());
        ActivationHandle { id, sender, terminated }
    }

    /// Hands `envelope` to the activation of `key`. A mailbox that closed while
    /// its activation is deactivating gives the envelope back, which is then
    /// retried against a fresh activation once the old one has terminated.
    pub(crate) async fn deliver(self: &Arc<Self>, key: &Key, mut envelope: Envelope<A>) -> anyhow::Result<()> {
        loop {
            let handle = self.activation(key)?;
            match handle.sender.send(envelope).await {
                Ok(_) => return Ok(()),
                Err(SendError(returned)) => {
                    debug!("activation {} of {}/{} is terminating, redeliver after it stopped", handle.id, A::KIND, key);
                    envelope = returned;
                    handle.wait_terminated().await;
                }
            }
        }
    }

    pub(crate) async fn deactivate(&self, key: &Key, reason: DeactivationReason) -> anyhow::Result<()> {
        let handle = match self.activations.get(key) {
            None => return Ok(()),
            Some(handle) => handle.clone(),
        };
        let (reply, rx) = oneshot::channel();
        match handle.sender.send(Envelope::Deactivate { reason, reply }).await {
            Ok(_) => {
                match rx.await {
                    Ok(result) => result,
                    Err(_) => Err(Error::AddressableStopped(format!("{}/{}", A::KIND, key)).into()),
                }
            }
            Err(_) => {
                handle.wait_terminated().await;
                Ok(())
            }
        }
    }

    pub(crate) fn remove(&self, key: &Key, id: u64) {
        self.activations.remove_if(key, |_, handle| handle.id == id);
    }

    pub(crate) fn active_count(&self) -> usize {
        self.activations.iter().filter(|handle| !handle.is_terminated()).count()
    }
}

#[async_trait]
pub(crate) trait AnyDirectory: Send + Sync {
    fn kind(&self) -> &'static str;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    async fn deactivate_all(&self, reason: DeactivationReason) -> Vec<anyhow::Error>;
}

#[async_trait]
impl<A> AnyDirectory for Directory<A> where A: Addressable {
    fn kind(&self) -> &'static str {
        A::KIND
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    async fn deactivate_all(&self, reason: DeactivationReason) -> Vec<anyhow::Error> {
        let keys = self.activations.iter().map(|entry| entry.key().clone()).collect::<Vec<_>>();
        debug!("deactivate {} activations of {} because {}", keys.len(), A::KIND, reason);
        let results = join_all(keys.iter().map(|key| self.deactivate(key, reason))).await;
        results.into_iter().filter_map(|result| result.err()).collect()
    }
}
