use std::fmt::{Display, Formatter};

use crate::error::Error;

/// Lifecycle of one activation. Transitions are single-shot and only move
/// forward; `Activating -> Inactive` covers a failed activation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActivationState {
    Unactivated,
    Activating,
    Active,
    Deactivating,
    Inactive,
}

impl ActivationState {
    pub fn can_transition(&self, next: ActivationState) -> bool {
        use ActivationState::*;
        matches!(
            (self, next),
            (Unactivated, Activating)
                | (Activating, Active)
                | (Activating, Inactive)
                | (Active, Deactivating)
                | (Deactivating, Inactive)
        )
    }

    pub fn transition(self, next: ActivationState) -> crate::error::Result<ActivationState> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(Error::IllegalTransition { from: self, to: next })
        }
    }

    pub fn accepts_messages(&self) -> bool {
        matches!(self, ActivationState::Active)
    }
}

impl Display for ActivationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivationState::Unactivated => {
                write!(f, "Unactivated")
            }
            ActivationState::Activating => {
                write!(f, "Activating")
            }
            ActivationState::Active => {
                write!(f, "Active")
            }
            ActivationState::Deactivating => {
                write!(f, "Deactivating")
            }
            ActivationState::Inactive => {
                write!(f, "Inactive")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::activation::state::ActivationState;
    use crate::error::Error;

    #[test]
    fn follows_the_lifecycle() -> anyhow::Result<()> {
        let state = ActivationState::Unactivated
            .transition(ActivationState::Activating)?
            .transition(ActivationState::Active)?;
        assert!(state.accepts_messages());
        let state = state
            .transition(ActivationState::Deactivating)?
            .transition(ActivationState::Inactive)?;
        assert!(!state.accepts_messages());
        Ok(())
    }

    #[test]
    fn failed_activation_goes_straight_to_inactive() {
        assert!(ActivationState::Activating.can_transition(ActivationState::Inactive));
    }

    #[test]
    fn rejects_reentrant_and_backward_transitions() {
        let illegal = [
            (ActivationState::Active, ActivationState::Activating),
            (ActivationState::Active, ActivationState::Active),
            (ActivationState::Inactive, ActivationState::Activating),
            (ActivationState::Deactivating, ActivationState::Active),
            (ActivationState::Unactivated, ActivationState::Active),
        ];
        for (from, to) in illegal {
            match from.transition(to) {
                Err(Error::IllegalTransition { from: f, to: t }) => {
                    assert_eq!((f, t), (from, to));
                }
                other => panic!("{} -> {} should be illegal, got {:?}", from, to, other),
            }
        }
    }
}
