//! The display value.

use calc_core::number::{format_number, parse_number};
use calc_core::{Digit, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spellings of non-finite results accepted on the display.
const NON_FINITE: [&str; 3] = ["Infinity", "-Infinity", "NaN"];

/// Text shown on the calculator display.
///
/// Always a syntactically valid partial or complete numeral: an optional
/// leading `-`, at least one digit, at most one `.`; or one of the
/// non-finite spellings `Infinity`, `-Infinity`, `NaN`. `"0"` is the reset
/// value.
///
/// # Examples
///
/// ```
/// use calc_engine::DisplayValue;
///
/// assert_eq!(DisplayValue::zero().as_str(), "0");
/// assert!(DisplayValue::new("12.").is_ok());
/// assert!(DisplayValue::new("-0.5").is_ok());
/// assert!(DisplayValue::new("1.2.3").is_err());
/// assert!(DisplayValue::new("-").is_err());
/// assert_eq!(DisplayValue::from_number(2.5).as_str(), "2.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayValue(String);

impl DisplayValue {
    /// The reset value `"0"`.
    #[must_use]
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Validates and wraps display text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperand`] if `text` is not a partial or
    /// complete numeral.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if is_valid_numeral(&text) {
            Ok(Self(text))
        } else {
            Err(Error::InvalidOperand { value: text })
        }
    }

    /// Renders a computed number.
    #[must_use]
    pub fn from_number(value: f64) -> Self {
        Self(format_number(value))
    }

    /// Returns the display text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the display as a number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperand`] if the text does not parse.
    pub fn to_number(&self) -> Result<f64> {
        parse_number(&self.0)
    }

    /// Returns `true` if the display is exactly the reset value.
    #[must_use]
    pub fn is_zero_reset(&self) -> bool {
        self.0 == "0"
    }

    /// Returns `true` if the display shows `Infinity`, `-Infinity` or `NaN`.
    #[must_use]
    pub fn is_non_finite(&self) -> bool {
        NON_FINITE.contains(&self.0.as_str())
    }

    /// Returns `true` if the display already holds a decimal point.
    #[must_use]
    pub fn has_decimal_point(&self) -> bool {
        self.0.contains('.')
    }

    pub(crate) fn with_digit(&self, digit: Digit) -> Self {
        let mut text = self.0.clone();
        text.push(digit.as_char());
        Self(text)
    }

    pub(crate) fn with_decimal_point(&self) -> Self {
        let mut text = self.0.clone();
        text.push('.');
        Self(text)
    }

    /// Drops the last character, falling back to `"0"` when nothing
    /// numeric would remain.
    pub(crate) fn without_last_char(&self) -> Self {
        if self.is_non_finite() {
            return Self::zero();
        }
        let mut text = self.0.clone();
        text.pop();
        if text.is_empty() || text == "-" {
            Self::zero()
        } else {
            Self(text)
        }
    }

    pub(crate) fn from_digit(digit: Digit) -> Self {
        Self(digit.as_char().to_string())
    }

    pub(crate) fn fresh_decimal() -> Self {
        Self("0.".to_string())
    }
}

impl Default for DisplayValue {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DisplayValue {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DisplayValue> for String {
    fn from(value: DisplayValue) -> Self {
        value.0
    }
}

fn is_valid_numeral(text: &str) -> bool {
    if NON_FINITE.contains(&text) {
        return true;
    }
    let body = text.strip_prefix('-').unwrap_or(text);
    let mut digits = 0_usize;
    let mut points = 0_usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}
