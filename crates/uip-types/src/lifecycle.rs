use serde::{Deserialize, Serialize};

use crate::error::InvalidTransition;

/// Pipeline stage of one intent.
///
/// ```text
/// INTENT_RECEIVED -> INTENT_PARSED -> COMPLIANCE_CHECKING
///                                        |-> INTENT_BLOCKED (terminal)
///                                        '-> AWAITING_DECISIONS -> DECISIONS_MADE
///                                              -> ACTIONS_IN_PROGRESS -> ACTIONS_COMPLETED (terminal)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    IntentReceived,
    IntentParsed,
    ComplianceChecking,
    IntentBlocked,
    AwaitingDecisions,
    DecisionsMade,
    ActionsInProgress,
    ActionsCompleted,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 8] = [
        LifecycleState::IntentReceived,
        LifecycleState::IntentParsed,
        LifecycleState::ComplianceChecking,
        LifecycleState::IntentBlocked,
        LifecycleState::AwaitingDecisions,
        LifecycleState::DecisionsMade,
        LifecycleState::ActionsInProgress,
        LifecycleState::ActionsCompleted,
    ];

    /// Exhaustive set of permitted next states. Empty for terminal states.
    pub fn successors(&self) -> &'static [LifecycleState] {
        use LifecycleState::*;

        match self {
            IntentReceived => &[IntentParsed],
            IntentParsed => &[ComplianceChecking],
            ComplianceChecking => &[IntentBlocked, AwaitingDecisions],
            AwaitingDecisions => &[DecisionsMade],
            DecisionsMade => &[ActionsInProgress],
            ActionsInProgress => &[ActionsCompleted],
            // Terminal states
            IntentBlocked | ActionsCompleted => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    /// States from which advisory knowledge may be consulted.
    pub fn accepts_advisory(&self) -> bool {
        matches!(
            self,
            LifecycleState::AwaitingDecisions
                | LifecycleState::DecisionsMade
                | LifecycleState::ActionsInProgress
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::IntentReceived => "INTENT_RECEIVED",
            LifecycleState::IntentParsed => "INTENT_PARSED",
            LifecycleState::ComplianceChecking => "COMPLIANCE_CHECKING",
            LifecycleState::IntentBlocked => "INTENT_BLOCKED",
            LifecycleState::AwaitingDecisions => "AWAITING_DECISIONS",
            LifecycleState::DecisionsMade => "DECISIONS_MADE",
            LifecycleState::ActionsInProgress => "ACTIONS_IN_PROGRESS",
            LifecycleState::ActionsCompleted => "ACTIONS_COMPLETED",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        LifecycleState::ALL
            .into_iter()
            .find(|state| state.as_str() == wanted)
            .ok_or_else(|| format!("unknown lifecycle state: {s}"))
    }
}

/// The validated transition operation over the successor table.
///
/// Stateless: the table is compiled in, so one machine can be shared by any
/// number of workers without locking.
#[derive(Clone, Copy, Debug, Default)]
pub struct LifecycleMachine;

impl LifecycleMachine {
    pub fn standard() -> Self {
        Self
    }

    pub fn can_transition(&self, current: LifecycleState, proposed: LifecycleState) -> bool {
        current.successors().contains(&proposed)
    }

    /// Returns the new state, or an error carrying both states.
    pub fn transition(
        &self,
        current: LifecycleState,
        proposed: LifecycleState,
    ) -> Result<LifecycleState, InvalidTransition> {
        if self.can_transition(current, proposed) {
            Ok(proposed)
        } else {
            Err(InvalidTransition {
                from: current,
                to: proposed,
            })
        }
    }

    /// The (from, successors) table in declaration order.
    pub fn table(&self) -> Vec<(LifecycleState, &'static [LifecycleState])> {
        LifecycleState::ALL
            .into_iter()
            .map(|state| (state, state.successors()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_state() -> impl Strategy<Value = LifecycleState> {
        prop::sample::select(LifecycleState::ALL.to_vec())
    }

    #[test]
    fn happy_path_walks_to_completion() {
        let machine = LifecycleMachine::standard();
        let mut state = LifecycleState::IntentReceived;
        for next in [
            LifecycleState::IntentParsed,
            LifecycleState::ComplianceChecking,
            LifecycleState::AwaitingDecisions,
            LifecycleState::DecisionsMade,
            LifecycleState::ActionsInProgress,
            LifecycleState::ActionsCompleted,
        ] {
            state = machine.transition(state, next).unwrap();
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn blocked_is_terminal() {
        let machine = LifecycleMachine::standard();
        let err = machine
            .transition(LifecycleState::IntentBlocked, LifecycleState::AwaitingDecisions)
            .unwrap_err();
        assert_eq!(err.from, LifecycleState::IntentBlocked);
        assert_eq!(err.to, LifecycleState::AwaitingDecisions);
        assert_eq!(
            err.to_string(),
            "invalid lifecycle transition: INTENT_BLOCKED -> AWAITING_DECISIONS"
        );
    }

    #[test]
    fn cannot_skip_compliance() {
        let machine = LifecycleMachine::standard();
        assert!(!machine.can_transition(
            LifecycleState::IntentParsed,
            LifecycleState::AwaitingDecisions
        ));
    }

    #[test]
    fn parses_state_names() {
        assert_eq!(
            "actions-completed".parse::<LifecycleState>().unwrap(),
            LifecycleState::ActionsCompleted
        );
        assert!("DONE".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn wire_spelling() {
        assert_eq!(
            serde_json::to_string(&LifecycleState::AwaitingDecisions).unwrap(),
            "\"AWAITING_DECISIONS\""
        );
    }

    proptest! {
        #[test]
        fn transition_succeeds_iff_successor(from in any_state(), to in any_state()) {
            let machine = LifecycleMachine::standard();
            let result = machine.transition(from, to);
            prop_assert_eq!(result.is_ok(), from.successors().contains(&to));
            if let Ok(next) = result {
                prop_assert_eq!(next, to);
            }
        }

        #[test]
        fn terminal_states_never_move(to in any_state()) {
            let machine = LifecycleMachine::standard();
            for terminal in [LifecycleState::IntentBlocked, LifecycleState::ActionsCompleted] {
                prop_assert!(machine.transition(terminal, to).is_err());
            }
        }
    }
}
