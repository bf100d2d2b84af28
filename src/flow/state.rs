//! Conversation flow states.

use std::fmt;

/// A state within a conversation flow, always qualified by its owning
/// flow group.
///
/// The distinguished "no active flow" condition (Idle) is represented by
/// the *absence* of a state — `Option<FlowState>::None` — rather than a
/// sentinel variant, so an empty store entry and an idle session are the
/// same thing.
///
/// The canonical string form is `"Group:member"`, e.g.
/// `"Trading:waiting_for_token"`. Decoding is defensive: strings that do
/// not name a known (group, member) pair decode to `None` instead of
/// failing, so a corrupt store entry degrades to "no active flow".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    /// Guided trade wizard.
    Trading(TradingStep),
    /// Price alert setup.
    Alert(AlertStep),
}

/// Steps of the guided trade wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradingStep {
    /// Waiting for the token address to trade.
    WaitingForToken,
    /// Waiting for the trade amount.
    WaitingForAmount,
    /// Waiting for risk parameters (slippage, stop loss, take profit).
    WaitingForRisk,
    /// Waiting for the final yes/no confirmation.
    WaitingForConfirmation,
    /// Order is being executed; terminal step.
    ExecutingTrade,
}

/// Steps of the price alert setup flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertStep {
    /// Waiting for the token address to watch.
    WaitingForToken,
    /// Waiting for the trigger threshold.
    WaitingForThreshold,
}

impl FlowState {
    /// Every state in the taxonomy, in wizard order.
    pub const ALL: [FlowState; 7] = [
        FlowState::Trading(TradingStep::WaitingForToken),
        FlowState::Trading(TradingStep::WaitingForAmount),
        FlowState::Trading(TradingStep::WaitingForRisk),
        FlowState::Trading(TradingStep::WaitingForConfirmation),
        FlowState::Trading(TradingStep::ExecutingTrade),
        FlowState::Alert(AlertStep::WaitingForToken),
        FlowState::Alert(AlertStep::WaitingForThreshold),
    ];

    /// The owning flow group name.
    pub fn group(&self) -> &'static str {
        match self {
            FlowState::Trading(_) => "Trading",
            FlowState::Alert(_) => "Alert",
        }
    }

    /// The member name within the group.
    pub fn member(&self) -> &'static str {
        match self {
            FlowState::Trading(step) => match step {
                TradingStep::WaitingForToken => "waiting_for_token",
                TradingStep::WaitingForAmount => "waiting_for_amount",
                TradingStep::WaitingForRisk => "waiting_for_risk",
                TradingStep::WaitingForConfirmation => "waiting_for_confirmation",
                TradingStep::ExecutingTrade => "executing_trade",
            },
            FlowState::Alert(step) => match step {
                AlertStep::WaitingForToken => "waiting_for_token",
                AlertStep::WaitingForThreshold => "waiting_for_threshold",
            },
        }
    }

    /// Decode the canonical `"Group:member"` form.
    ///
    /// Returns `None` for malformed or unknown strings, including the
    /// literal `"None"` some writers use for an idle session. This never
    /// fails: bad input means "no active flow".
    pub fn parse(s: &str) -> Option<FlowState> {
        let (group, member) = s.split_once(':')?;
        match group {
            "Trading" => {
                let step = match member {
                    "waiting_for_token" => TradingStep::WaitingForToken,
                    "waiting_for_amount" => TradingStep::WaitingForAmount,
                    "waiting_for_risk" => TradingStep::WaitingForRisk,
                    "waiting_for_confirmation" => TradingStep::WaitingForConfirmation,
                    "executing_trade" => TradingStep::ExecutingTrade,
                    _ => return None,
                };
                Some(FlowState::Trading(step))
            }
            "Alert" => {
                let step = match member {
                    "waiting_for_token" => AlertStep::WaitingForToken,
                    "waiting_for_threshold" => AlertStep::WaitingForThreshold,
                    _ => return None,
                };
                Some(FlowState::Alert(step))
            }
            _ => None,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group(), self.member())
    }
}
