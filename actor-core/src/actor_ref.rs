use std::any::type_name;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::addressable::{Addressable, AddressableReference, DeactivationReason};
use crate::directory::Directory;
use crate::error::Error;
use crate::key::Key;
use crate::message::{AskHandler, Envelope, Message};

/// Location transparent handle to the addressable `A` with a given key. The
/// target is activated on demand by the first message.
pub struct ActorRef<A> where A: Addressable {
    reference: AddressableReference,
    directory: Arc<Directory<A>>,
    timeout: Option<Duration>,
}

impl<A> Clone for ActorRef<A> where A: Addressable {
    fn clone(&self) -> Self {
        Self {
            reference: self.reference.clone(),
            directory: self.directory.clone(),
            timeout: self.timeout,
        }
    }
}

impl<A> Debug for ActorRef<A> where A: Addressable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorRef")
            .field("reference", &self.reference)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<A> Display for ActorRef<A> where A: Addressable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ActorRef[{}]", self.reference)
    }
}

impl<A> ActorRef<A> where A: Addressable {
    pub(crate) fn new(reference: AddressableReference, directory: Arc<Directory<A>>, timeout: Option<Duration>) -> Self {
        Self {
            reference,
            directory,
            timeout,
        }
    }

    pub fn reference(&self) -> &AddressableReference {
        &self.reference
    }

    pub fn key(&self) -> &Key {
        &self.reference.key
    }

    /// Sends `message` and waits for the handler's result. Errors returned by
    /// the handler come back unchanged.
    pub async fn ask<M>(&self, message: M) -> anyhow::Result<M::Output> where M: Message<A=A> {
        match self.timeout {
            None => self.request(message).await,
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.request(message)).await {
                    Ok(result) => result,
                    Err(_) => {
                        let error = Error::MessageTimeout {
                            reference: self.reference.to_string(),
                            message: type_name::<M>(),
                            timeout,
                        };
                        Err(error.into())
                    }
                }
            }
        }
    }

    async fn request<M>(&self, message: M) -> anyhow::Result<M::Output> where M: Message<A=A> {
        let (reply, rx) = oneshot::channel();
        let envelope = Envelope::Ask(Box::new(AskHandler::new(message, reply)));
        self.directory.deliver(self.key(), envelope).await?;
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::AddressableStopped(self.reference.to_string()).into()),
        }
    }

    /// Deactivates the target if it is active, returning the error reported by
    /// its `on_deactivate`. Not being active is not an error.
    pub async fn deactivate(&self, reason: DeactivationReason) -> anyhow::Result<()> {
        self.directory.deactivate(self.key(), reason).await
    }
}
