//! Stateful wrapper around the reducers.

use crate::reducer::{self, Event};
use crate::{CalculatorState, DisplayValue, PendingOperation, Phase};
use calc_core::{Digit, Operator, Result};

/// Holds the current [`CalculatorState`] and applies events to it.
///
/// Transitions are synchronous and local. A failed transition leaves the
/// state exactly as it was.
///
/// # Examples
///
/// ```
/// use calc_core::{Digit, Operator};
/// use calc_engine::ArithmeticEngine;
///
/// let mut engine = ArithmeticEngine::new();
/// engine.append_digit(Digit::new(2).unwrap());
/// engine.choose_operator(Operator::Add).unwrap();
/// engine.append_digit(Digit::new(3).unwrap());
/// engine.equals().unwrap();
///
/// assert_eq!(engine.display().as_str(), "5");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArithmeticEngine {
    state: CalculatorState,
}

impl ArithmeticEngine {
    /// Creates an engine in the reset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine from an existing state.
    #[must_use]
    pub const fn from_state(state: CalculatorState) -> Self {
        Self { state }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &CalculatorState {
        &self.state
    }

    /// Returns the display value.
    #[must_use]
    pub const fn display(&self) -> &DisplayValue {
        &self.state.display
    }

    /// Returns the pending operation, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<PendingOperation> {
        self.state.pending
    }

    /// Returns `true` while the next digit starts the second operand.
    #[must_use]
    pub const fn is_waiting_for_second_operand(&self) -> bool {
        self.state.waiting_for_second_operand
    }

    /// Returns the derived phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Applies a single event.
    ///
    /// # Errors
    ///
    /// Returns [`calc_core::Error::InvalidOperand`] if the event needs a
    /// numeric display and it does not parse. The state is unchanged.
    pub fn apply(&mut self, event: Event) -> Result<&DisplayValue> {
        let next = reducer::reduce(&self.state, event)?;
        tracing::trace!(%event, display = %next.display, phase = %next.phase(), "engine transition");
        self.state = next;
        Ok(&self.state.display)
    }

    /// Applies events in order, stopping at the first failure.
    ///
    /// Events before the failing one stay applied.
    ///
    /// # Errors
    ///
    /// Returns the first reducer error.
    pub fn apply_all(&mut self, events: impl IntoIterator<Item = Event>) -> Result<&DisplayValue> {
        for event in events {
            self.apply(event)?;
        }
        Ok(&self.state.display)
    }

    /// Enters a digit.
    pub fn append_digit(&mut self, digit: Digit) -> &DisplayValue {
        self.state = reducer::append_digit(&self.state, digit);
        &self.state.display
    }

    /// Enters the decimal point.
    pub fn append_decimal_point(&mut self) -> &DisplayValue {
        self.state = reducer::append_decimal_point(&self.state);
        &self.state.display
    }

    /// Negates the display.
    ///
    /// # Errors
    ///
    /// Returns [`calc_core::Error::InvalidOperand`] if the display does not parse.
    pub fn toggle_sign(&mut self) -> Result<&DisplayValue> {
        self.apply(Event::ToggleSign)
    }

    /// Removes the last display character.
    pub fn backspace(&mut self) -> &DisplayValue {
        self.state = reducer::backspace(&self.state);
        &self.state.display
    }

    /// Resets to the initial state.
    pub fn clear(&mut self) -> &DisplayValue {
        self.state = reducer::clear(&self.state);
        &self.state.display
    }

    /// Chooses an operator, capturing the display as the left operand.
    ///
    /// # Errors
    ///
    /// Returns [`calc_core::Error::InvalidOperand`] if the display does not parse.
    pub fn choose_operator(&mut self, op: Operator) -> Result<&DisplayValue> {
        self.apply(Event::Operator(op))
    }

    /// Evaluates the pending operation.
    ///
    /// # Errors
    ///
    /// Returns [`calc_core::Error::InvalidOperand`] if the display does not parse.
    pub fn equals(&mut self) -> Result<&DisplayValue> {
        self.apply(Event::Equals)
    }

    /// Replaces the display with a result computed elsewhere, such as a
    /// plugin, leaving the pending operator and wait flag alone.
    pub fn apply_external_result(&mut self, value: f64) -> &DisplayValue {
        self.state = reducer::apply_external_result(&self.state, value);
        tracing::debug!(display = %self.state.display, "applied external result");
        &self.state.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit(d: u8) -> Digit {
        Digit::new(d).unwrap()
    }

    #[test]
    fn test_new_engine_is_reset() {
        let engine = ArithmeticEngine::new();
        assert_eq!(engine.display().as_str(), "0");
        assert!(engine.pending().is_none());
        assert!(!engine.is_waiting_for_second_operand());
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_apply_all_applies_in_order() {
        let mut engine = ArithmeticEngine::new();
        let display = engine
            .apply_all([Event::Digit(digit(1)), Event::Digit(digit(2))])
            .unwrap();
        assert_eq!(display.as_str(), "12");
    }

    #[test]
    fn test_external_result_then_digit_appends() {
        let mut engine = ArithmeticEngine::new();
        engine.apply_external_result(16.0);
        assert_eq!(engine.phase(), Phase::Result);
        engine.append_digit(digit(1));
        assert_eq!(engine.display().as_str(), "161");
    }

    #[test]
    fn test_from_state_roundtrip() {
        let mut engine = ArithmeticEngine::new();
        engine.append_digit(digit(4));
        engine.choose_operator(Operator::Divide).unwrap();

        let copy = ArithmeticEngine::from_state(engine.state().clone());
        assert_eq!(copy.state(), engine.state());
    }
}
