//! Lifecycle transitions for status enums.

use super::ValidationError;

/// A status enum with a fixed set of legal moves.
///
/// Implementors list the successors of each state; membership in that list
/// is what makes a move legal unless [`can_transition_to`] is overridden.
///
/// [`can_transition_to`]: StateMachine::can_transition_to
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// States reachable in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if the move is legal.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "status",
                format!("{:?} cannot move to {:?}", self, target),
            ));
        }
        Ok(target)
    }

    /// No outgoing moves.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Door {
        Open,
        Shut,
        Bricked,
    }

    impl StateMachine for Door {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Door::Open => vec![Door::Shut],
                Door::Shut => vec![Door::Open, Door::Bricked],
                Door::Bricked => vec![],
            }
        }
    }

    #[test]
    fn legality_follows_the_successor_list() {
        assert!(Door::Shut.can_transition_to(&Door::Bricked));
        assert!(!Door::Open.can_transition_to(&Door::Bricked));
    }

    #[test]
    fn illegal_move_names_both_states() {
        let err = Door::Bricked.transition_to(Door::Open).unwrap_err();
        assert!(err.to_string().contains("Bricked cannot move to Open"));
    }

    #[test]
    fn sinks_are_terminal() {
        assert!(Door::Bricked.is_terminal());
        assert!(!Door::Shut.is_terminal());
    }
}
