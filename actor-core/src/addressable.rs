use std::fmt::{Debug, Display, Formatter};

use async_trait::async_trait;
use tracing::trace;

use crate::activation::state::ActivationState;
use crate::key::Key;
use crate::system::ActorSystem;

/// A unit of state and behavior addressed by a stable [Key].
///
/// The host activates an addressable on the first message sent to its key and
/// calls [Addressable::on_activate] before any message is handled. All messages
/// for one key are handled one at a time by a single activation.
#[async_trait]
pub trait Addressable: Send + Sized + 'static {
    /// Kind name used to register and resolve references.
    const KIND: &'static str;

    #[allow(unused_variables)]
    async fn on_activate(&mut self, context: &mut AddressableContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs once before the activation is evicted. An error here is reported to
    /// whoever asked for the deactivation, the eviction still completes.
    #[allow(unused_variables)]
    async fn on_deactivate(&mut self, context: &mut AddressableContext, reason: DeactivationReason) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeactivationReason {
    ExternallyTriggered,
    TtlExpired,
    NodeShuttingDown,
}

impl Display for DeactivationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeactivationReason::ExternallyTriggered => {
                write!(f, "ExternallyTriggered")
            }
            DeactivationReason::TtlExpired => {
                write!(f, "TtlExpired")
            }
            DeactivationReason::NodeShuttingDown => {
                write!(f, "NodeShuttingDown")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressableReference {
    pub kind: &'static str,
    pub key: Key,
}

impl AddressableReference {
    pub fn new(kind: &'static str, key: Key) -> Self {
        Self { kind, key }
    }
}

impl Display for AddressableReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.key)
    }
}

pub struct AddressableContext {
    reference: AddressableReference,
    system: ActorSystem,
    state: ActivationState,
}

impl Debug for AddressableContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressableContext")
            .field("reference", &self.reference)
            .field("system", self.system.name())
            .field("state", &self.state)
            .finish()
    }
}

impl AddressableContext {
    pub(crate) fn new(reference: AddressableReference, system: ActorSystem) -> Self {
        Self {
            reference,
            system,
            state: ActivationState::Unactivated,
        }
    }

    pub fn reference(&self) -> &AddressableReference {
        &self.reference
    }

    pub fn key(&self) -> &Key {
        &self.reference.key
    }

    pub fn system(&self) -> &ActorSystem {
        &self.system
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub(crate) fn transition(&mut self, next: ActivationState) -> crate::error::Result<()> {
        let previous = self.state;
        self.state = previous.transition(next)?;
        trace!("{} {} -> {}", self.reference, previous, next);
        Ok(())
    }
}
