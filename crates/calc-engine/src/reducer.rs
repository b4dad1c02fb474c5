//! Pure reducers, one per input event.
//!
//! Every function takes the current [`CalculatorState`] by reference and
//! returns the next one. Failing reducers return an error and the caller
//! keeps the state it passed in.
//!
//! # Examples
//!
//! ```
//! use calc_core::{Digit, Operator};
//! use calc_engine::{reduce, CalculatorState, Event};
//!
//! let events = [
//!     Event::Digit(Digit::new(5).unwrap()),
//!     Event::Operator(Operator::Divide),
//!     Event::Digit(Digit::ZERO),
//!     Event::Equals,
//! ];
//!
//! let mut state = CalculatorState::default();
//! for event in events {
//!     state = reduce(&state, event).unwrap();
//! }
//! assert_eq!(state.display.as_str(), "Infinity");
//! ```

use crate::{CalculatorState, DisplayValue, PendingOperation};
use calc_core::{Digit, Operator, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete input to the entry state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "value")]
pub enum Event {
    /// Digit key
    Digit(Digit),
    /// `.` key
    DecimalPoint,
    /// `+/-` key
    ToggleSign,
    /// Backspace key
    Backspace,
    /// `C` key
    Clear,
    /// Operator key
    Operator(Operator),
    /// `=` key
    Equals,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digit(d) => write!(f, "{d}"),
            Self::DecimalPoint => f.write_str("."),
            Self::ToggleSign => f.write_str("+/-"),
            Self::Backspace => f.write_str("<"),
            Self::Clear => f.write_str("C"),
            Self::Operator(op) => write!(f, "{op}"),
            Self::Equals => f.write_str("="),
        }
    }
}

/// Applies one event.
///
/// # Errors
///
/// Returns [`calc_core::Error::InvalidOperand`] if the event needs the
/// display as a number and it does not parse.
pub fn reduce(state: &CalculatorState, event: Event) -> Result<CalculatorState> {
    match event {
        Event::Digit(digit) => Ok(append_digit(state, digit)),
        Event::DecimalPoint => Ok(append_decimal_point(state)),
        Event::ToggleSign => toggle_sign(state),
        Event::Backspace => Ok(backspace(state)),
        Event::Clear => Ok(clear(state)),
        Event::Operator(op) => choose_operator(state, op),
        Event::Equals => equals(state),
    }
}

/// Enters a digit.
///
/// While waiting for the second operand the digit replaces the display
/// and ends the wait. Otherwise it is appended, except that the reset
/// value `"0"` and non-finite results are replaced.
#[must_use]
pub fn append_digit(state: &CalculatorState, digit: Digit) -> CalculatorState {
    let replace = state.waiting_for_second_operand
        || state.display.is_zero_reset()
        || state.display.is_non_finite();
    let display = if replace {
        DisplayValue::from_digit(digit)
    } else {
        state.display.with_digit(digit)
    };
    CalculatorState {
        display,
        pending: state.pending,
        waiting_for_second_operand: false,
        showing_result: false,
    }
}

/// Enters the decimal point.
///
/// No-op when the display already has one. While waiting for the second
/// operand, that operand starts as `"0."`.
#[must_use]
pub fn append_decimal_point(state: &CalculatorState) -> CalculatorState {
    if state.waiting_for_second_operand || state.display.is_non_finite() {
        return CalculatorState {
            display: DisplayValue::fresh_decimal(),
            pending: state.pending,
            waiting_for_second_operand: false,
            showing_result: false,
        };
    }
    if state.display.has_decimal_point() {
        return state.clone();
    }
    CalculatorState {
        display: state.display.with_decimal_point(),
        showing_result: false,
        ..state.clone()
    }
}

/// Negates the displayed value and re-renders it.
///
/// # Errors
///
/// Returns [`calc_core::Error::InvalidOperand`] if the display does not parse.
pub fn toggle_sign(state: &CalculatorState) -> Result<CalculatorState> {
    let value = state.display.to_number()?;
    Ok(CalculatorState {
        display: DisplayValue::from_number(-value),
        ..state.clone()
    })
}

/// Removes the last display character, resetting to `"0"` when nothing
/// numeric would remain.
#[must_use]
pub fn backspace(state: &CalculatorState) -> CalculatorState {
    CalculatorState {
        display: state.display.without_last_char(),
        showing_result: false,
        ..state.clone()
    }
}

/// Resets the display, discards any pending operator and the wait flag.
#[must_use]
pub fn clear(_state: &CalculatorState) -> CalculatorState {
    CalculatorState::default()
}

/// Captures the display as the left operand of `op`.
///
/// A pending operator is overwritten, not evaluated: there is no chaining
/// and no precedence.
///
/// # Errors
///
/// Returns [`calc_core::Error::InvalidOperand`] if the display does not parse.
pub fn choose_operator(state: &CalculatorState, op: Operator) -> Result<CalculatorState> {
    let stored_operand = state.display.to_number()?;
    Ok(CalculatorState {
        display: state.display.clone(),
        pending: Some(PendingOperation {
            operator: op,
            stored_operand,
        }),
        waiting_for_second_operand: true,
        showing_result: false,
    })
}

/// Evaluates the pending operation against the display.
///
/// No-op when nothing is pending. Division by zero produces a non-finite
/// display, not an error. The wait flag is left as it was.
///
/// # Errors
///
/// Returns [`calc_core::Error::InvalidOperand`] if the display does not parse.
pub fn equals(state: &CalculatorState) -> Result<CalculatorState> {
    let Some(pending) = state.pending else {
        return Ok(state.clone());
    };
    let rhs = state.display.to_number()?;
    let result = pending.operator.apply(pending.stored_operand, rhs);
    Ok(CalculatorState {
        display: DisplayValue::from_number(result),
        pending: None,
        waiting_for_second_operand: state.waiting_for_second_operand,
        showing_result: true,
    })
}

/// Replaces the display with a value computed outside the engine.
///
/// Pending operator and wait flag are untouched.
#[must_use]
pub fn apply_external_result(state: &CalculatorState, value: f64) -> CalculatorState {
    CalculatorState {
        display: DisplayValue::from_number(value),
        showing_result: true,
        ..state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;

    fn digit(d: u8) -> Digit {
        Digit::new(d).unwrap()
    }

    fn run(events: &[Event]) -> CalculatorState {
        events
            .iter()
            .try_fold(CalculatorState::default(), |state, &event| {
                reduce(&state, event)
            })
            .unwrap()
    }

    #[test]
    fn test_digit_replaces_reset_zero() {
        let state = run(&[Event::Digit(digit(0)), Event::Digit(digit(7))]);
        assert_eq!(state.display.as_str(), "7");
    }

    #[test]
    fn test_digits_append() {
        let state = run(&[
            Event::Digit(digit(1)),
            Event::Digit(digit(2)),
            Event::DecimalPoint,
            Event::Digit(digit(0)),
            Event::Digit(digit(5)),
        ]);
        assert_eq!(state.display.as_str(), "12.05");
    }

    #[test]
    fn test_zero_point_keeps_leading_zero() {
        let state = run(&[Event::DecimalPoint, Event::Digit(digit(5))]);
        assert_eq!(state.display.as_str(), "0.5");
    }

    #[test]
    fn test_second_decimal_point_is_noop() {
        let once = run(&[Event::Digit(digit(3)), Event::DecimalPoint]);
        let twice = reduce(&once, Event::DecimalPoint).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_decimal_point_starts_second_operand() {
        let state = run(&[
            Event::Digit(digit(5)),
            Event::Operator(Operator::Add),
            Event::DecimalPoint,
            Event::Digit(digit(5)),
            Event::Equals,
        ]);
        assert_eq!(state.display.as_str(), "5.5");
    }

    #[test]
    fn test_operator_sets_pending_and_wait() {
        let state = run(&[Event::Digit(digit(9)), Event::Operator(Operator::Multiply)]);
        let pending = state.pending.unwrap();
        assert_eq!(pending.operator, Operator::Multiply);
        assert!((pending.stored_operand - 9.0).abs() < f64::EPSILON);
        assert!(state.waiting_for_second_operand);
        assert_eq!(state.phase(), Phase::OperatorPending);
    }

    #[test]
    fn test_digit_after_operator_replaces() {
        let state = run(&[
            Event::Digit(digit(4)),
            Event::Operator(Operator::Subtract),
            Event::Digit(digit(1)),
        ]);
        assert_eq!(state.display.as_str(), "1");
        assert!(!state.waiting_for_second_operand);
        assert_eq!(state.phase(), Phase::EnteringOperand);
    }

    #[test]
    fn test_operator_overwrites_pending() {
        // 2 + 3 * 4 = evaluates 3 * 4, the + is discarded
        let state = run(&[
            Event::Digit(digit(2)),
            Event::Operator(Operator::Add),
            Event::Digit(digit(3)),
            Event::Operator(Operator::Multiply),
            Event::Digit(digit(4)),
            Event::Equals,
        ]);
        assert_eq!(state.display.as_str(), "12");
    }

    #[test]
    fn test_equals_after_each_operator_is_left_to_right() {
        let state = run(&[
            Event::Digit(digit(2)),
            Event::Operator(Operator::Add),
            Event::Digit(digit(3)),
            Event::Equals,
        ]);
        assert_eq!(state.display.as_str(), "5");
        assert_eq!(state.phase(), Phase::Result);

        let state = [
            Event::Operator(Operator::Multiply),
            Event::Digit(digit(4)),
            Event::Equals,
        ]
        .iter()
        .try_fold(state, |s, &e| reduce(&s, e))
        .unwrap();
        assert_eq!(state.display.as_str(), "20");
    }

    #[test]
    fn test_equals_without_pending_is_noop() {
        let before = run(&[Event::Digit(digit(8))]);
        let after = reduce(&before, Event::Equals).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_equals_reuses_display_when_waiting() {
        let state = run(&[
            Event::Digit(digit(5)),
            Event::Operator(Operator::Add),
            Event::Equals,
        ]);
        assert_eq!(state.display.as_str(), "10");
        assert!(state.pending.is_none());
    }

    #[test]
    fn test_division_by_zero_is_infinity() {
        let state = run(&[
            Event::Digit(digit(5)),
            Event::Operator(Operator::Divide),
            Event::Digit(digit(0)),
            Event::Equals,
        ]);
        assert_eq!(state.display.as_str(), "Infinity");
        assert!(state.display.to_number().unwrap().is_infinite());
    }

    #[test]
    fn test_zero_over_zero_is_nan() {
        let state = run(&[
            Event::Operator(Operator::Divide),
            Event::Equals,
        ]);
        assert_eq!(state.display.as_str(), "NaN");
    }

    #[test]
    fn test_digit_after_infinity_replaces() {
        let state = run(&[
            Event::Digit(digit(1)),
            Event::Operator(Operator::Divide),
            Event::Digit(digit(0)),
            Event::Equals,
            Event::Digit(digit(3)),
        ]);
        assert_eq!(state.display.as_str(), "3");
    }

    #[test]
    fn test_toggle_sign() {
        let state = run(&[Event::Digit(digit(5)), Event::ToggleSign]);
        assert_eq!(state.display.as_str(), "-5");
        let state = reduce(&state, Event::ToggleSign).unwrap();
        assert_eq!(state.display.as_str(), "5");
    }

    #[test]
    fn test_toggle_sign_of_zero_stays_zero() {
        let state = run(&[Event::ToggleSign]);
        assert_eq!(state.display.as_str(), "0");
    }

    #[test]
    fn test_backspace() {
        let state = run(&[Event::Digit(digit(7)), Event::Backspace]);
        assert_eq!(state.display.as_str(), "0");
        let state = reduce(&state, Event::Backspace).unwrap();
        assert_eq!(state.display.as_str(), "0");

        let state = run(&[
            Event::Digit(digit(4)),
            Event::Digit(digit(2)),
            Event::Backspace,
        ]);
        assert_eq!(state.display.as_str(), "4");
    }

    #[test]
    fn test_backspace_on_negative_single_digit_resets() {
        let state = run(&[Event::Digit(digit(6)), Event::ToggleSign, Event::Backspace]);
        assert_eq!(state.display.as_str(), "0");
    }

    #[test]
    fn test_clear_discards_pending_and_wait() {
        let state = run(&[
            Event::Digit(digit(6)),
            Event::Operator(Operator::Add),
            Event::Clear,
        ]);
        assert_eq!(state, CalculatorState::default());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let once = run(&[
            Event::Digit(digit(6)),
            Event::Operator(Operator::Add),
            Event::Digit(digit(1)),
            Event::Clear,
        ]);
        let twice = reduce(&once, Event::Clear).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.display.as_str(), "0");
        assert!(twice.pending.is_none());
        assert!(!twice.waiting_for_second_operand);
    }

    #[test]
    fn test_external_result_keeps_pending_and_wait() {
        let state = run(&[Event::Digit(digit(3)), Event::Operator(Operator::Add)]);
        let after = apply_external_result(&state, 9.0);
        assert_eq!(after.display.as_str(), "9");
        assert_eq!(after.pending, state.pending);
        assert_eq!(
            after.waiting_for_second_operand,
            state.waiting_for_second_operand
        );
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&Event::Digit(digit(4))).unwrap();
        assert_eq!(json, r#"{"event":"digit","value":4}"#);
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Event::Digit(digit(4)));
        assert!(serde_json::from_str::<Event>(r#"{"event":"digit","value":12}"#).is_err());
    }
}
