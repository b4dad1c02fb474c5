//! Immutable calculator state record.

use crate::DisplayValue;
use calc_core::Operator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operator waiting for its right-hand operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Operator chosen by the user
    pub operator: Operator,
    /// Left-hand operand captured when the operator was chosen
    pub stored_operand: f64,
}

/// Coarse phase of the entry state machine, derived from the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Reset display, nothing pending
    Idle,
    /// Typing an operand (first, or second after the operator)
    EnteringOperand,
    /// Operator chosen, next digit starts the second operand
    OperatorPending,
    /// Display shows a computed or plugin-supplied result
    Result,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::EnteringOperand => "entering_operand",
            Self::OperatorPending => "operator_pending",
            Self::Result => "result",
        })
    }
}

/// Complete calculator state.
///
/// Transitions never mutate a state in place; each reducer in
/// [`crate::reducer`] returns a new record.
///
/// # Examples
///
/// ```
/// use calc_engine::{CalculatorState, Phase};
///
/// let state = CalculatorState::default();
/// assert_eq!(state.display.as_str(), "0");
/// assert!(state.pending.is_none());
/// assert_eq!(state.phase(), Phase::Idle);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculatorState {
    /// Current display text
    pub display: DisplayValue,
    /// Operator awaiting `equals`, if any
    pub pending: Option<PendingOperation>,
    /// True between choosing an operator and the next digit entry
    pub waiting_for_second_operand: bool,
    /// True while the display shows an unedited result
    pub showing_result: bool,
}

impl CalculatorState {
    /// Derives the current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match (self.pending, self.waiting_for_second_operand) {
            (Some(_), true) => Phase::OperatorPending,
            (Some(_), false) => Phase::EnteringOperand,
            (None, _) if self.showing_result => Phase::Result,
            (None, _) if self.display.is_zero_reset() => Phase::Idle,
            (None, _) => Phase::EnteringOperand,
        }
    }
}
