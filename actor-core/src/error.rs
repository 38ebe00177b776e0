use std::time::Duration;

use thiserror::Error;

use crate::activation::state::ActivationState;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("addressable kind {0} is already registered")]
    DuplicateAddressable(&'static str),
    #[error("addressable kind {0} is not registered")]
    AddressableNotRegistered(&'static str),
    #[error("activation of {reference} failed: {cause}")]
    ActivationFailed { reference: String, cause: String },
    #[error("{0} stopped before replying")]
    AddressableStopped(String),
    #[error("ask {reference} with {message} timeout after {timeout:?}")]
    MessageTimeout { reference: String, message: &'static str, timeout: Duration },
    #[error("actor system {0} is shutting down, new activations are refused")]
    SystemShuttingDown(String),
    #[error("the actor system is destroyed, any weak reference ref to that is invalid")]
    ActorSystemDestroyed,
    #[error("illegal activation state transition from {from} to {to}")]
    IllegalTransition { from: ActivationState, to: ActivationState },
}
