//! Static transition table.

use super::state::{AlertStep, FlowState, TradingStep};

const T_TOKEN: Option<FlowState> = Some(FlowState::Trading(TradingStep::WaitingForToken));
const T_AMOUNT: Option<FlowState> = Some(FlowState::Trading(TradingStep::WaitingForAmount));
const T_RISK: Option<FlowState> = Some(FlowState::Trading(TradingStep::WaitingForRisk));
const T_CONFIRM: Option<FlowState> = Some(FlowState::Trading(TradingStep::WaitingForConfirmation));
const T_EXECUTE: Option<FlowState> = Some(FlowState::Trading(TradingStep::ExecutingTrade));
const A_TOKEN: Option<FlowState> = Some(FlowState::Alert(AlertStep::WaitingForToken));
const A_THRESHOLD: Option<FlowState> = Some(FlowState::Alert(AlertStep::WaitingForThreshold));
const IDLE: Option<FlowState> = None;

/// The set of states reachable from `from` in one step.
///
/// `None` stands for Idle, on both sides: an idle session may start a
/// flow, and every state may cancel back to Idle. The middle wizard steps
/// additionally permit going back to the immediately preceding step. The
/// table is fixed at build time.
pub fn allowed_transitions(from: Option<FlowState>) -> &'static [Option<FlowState>] {
    use AlertStep as A;
    use TradingStep as T;

    match from {
        None => &[T_TOKEN, A_TOKEN],
        Some(FlowState::Trading(T::WaitingForToken)) => &[T_AMOUNT, IDLE],
        Some(FlowState::Trading(T::WaitingForAmount)) => &[T_RISK, T_TOKEN, IDLE],
        Some(FlowState::Trading(T::WaitingForRisk)) => &[T_CONFIRM, T_AMOUNT, IDLE],
        Some(FlowState::Trading(T::WaitingForConfirmation)) => &[T_EXECUTE, T_RISK, IDLE],
        Some(FlowState::Trading(T::ExecutingTrade)) => &[IDLE],
        Some(FlowState::Alert(A::WaitingForToken)) => &[A_THRESHOLD, IDLE],
        Some(FlowState::Alert(A::WaitingForThreshold)) => &[A_TOKEN, IDLE],
    }
}

/// Check whether a state change is legal.
///
/// Self-transitions are always permitted, regardless of the table. Every
/// other transition must appear in the table entry for the current state.
pub fn is_valid_transition(from: Option<FlowState>, to: Option<FlowState>) -> bool {
    if from == to {
        return true;
    }
    allowed_transitions(from).contains(&to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states_and_idle() -> Vec<Option<FlowState>> {
        let mut states: Vec<Option<FlowState>> = FlowState::ALL.iter().copied().map(Some).collect();
        states.push(None);
        states
    }

    #[test]
    fn test_self_transition_always_valid() {
        for state in all_states_and_idle() {
            assert!(is_valid_transition(state, state), "{:?}", state);
        }
    }

    #[test]
    fn test_cancel_from_anywhere() {
        for state in FlowState::ALL {
            assert!(is_valid_transition(Some(state), None), "{}", state);
        }
    }

    #[test]
    fn test_idle_starts_flows() {
        assert!(is_valid_transition(None, T_TOKEN));
        assert!(is_valid_transition(None, A_TOKEN));
        // Jumping into the middle of a wizard is not a start
        assert!(!is_valid_transition(None, T_AMOUNT));
        assert!(!is_valid_transition(None, T_EXECUTE));
    }

    #[test]
    fn test_wizard_forward_path() {
        assert!(is_valid_transition(T_TOKEN, T_AMOUNT));
        assert!(is_valid_transition(T_AMOUNT, T_RISK));
        assert!(is_valid_transition(T_RISK, T_CONFIRM));
        assert!(is_valid_transition(T_CONFIRM, T_EXECUTE));
        assert!(is_valid_transition(T_EXECUTE, IDLE));
    }

    #[test]
    fn test_go_back_edges() {
        assert!(is_valid_transition(T_AMOUNT, T_TOKEN));
        assert!(is_valid_transition(T_RISK, T_AMOUNT));
        assert!(is_valid_transition(T_CONFIRM, T_RISK));
        assert!(is_valid_transition(A_THRESHOLD, A_TOKEN));
        // The first step has nothing to go back to except Idle
        assert!(!is_valid_transition(T_TOKEN, T_CONFIRM));
    }

    #[test]
    fn test_skipping_steps_rejected() {
        assert!(!is_valid_transition(T_TOKEN, T_EXECUTE));
        assert!(!is_valid_transition(T_TOKEN, T_RISK));
        assert!(!is_valid_transition(T_AMOUNT, T_EXECUTE));
        assert!(!is_valid_transition(A_TOKEN, T_AMOUNT));
    }

    #[test]
    fn test_terminal_state_only_exits_to_idle() {
        for state in FlowState::ALL {
            let allowed = is_valid_transition(T_EXECUTE, Some(state));
            let is_self = Some(state) == T_EXECUTE;
            assert_eq!(allowed, is_self, "{}", state);
        }
    }

    #[test]
    fn test_table_is_exhaustive_over_pairs() {
        // Every pair not in the table (and not a self-transition) is invalid.
        for from in all_states_and_idle() {
            for to in all_states_and_idle() {
                let expected = from == to || allowed_transitions(from).contains(&to);
                assert_eq!(is_valid_transition(from, to), expected);
            }
        }
    }

    #[test]
    fn test_cross_flow_jumps_rejected() {
        assert!(!is_valid_transition(T_TOKEN, A_THRESHOLD));
        assert!(!is_valid_transition(A_TOKEN, T_TOKEN));
    }
}
