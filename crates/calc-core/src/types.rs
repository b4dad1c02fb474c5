//! Strong domain types for the plugin calculator.
//!
//! Newtypes keep plugin names, digits and operators from being mixed up
//! with arbitrary strings and integers.
//!
//! # Examples
//!
//! ```
//! use calc_core::{Digit, Operator, PluginName};
//!
//! let plugin = PluginName::new("Square").unwrap();
//! let digit = Digit::new(7).unwrap();
//! let op: Operator = "*".parse().unwrap();
//!
//! assert_eq!(plugin.as_str(), "Square");
//! assert_eq!(digit.as_char(), '7');
//! assert_eq!(op.apply(6.0, 7.0), 42.0);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of a host-registered plugin (validated newtype over `String`).
///
/// The host is the final arbiter of which names exist; the client only
/// rejects names that could never be valid (empty, surrounding whitespace,
/// control characters).
///
/// # Examples
///
/// ```
/// use calc_core::PluginName;
///
/// let name = PluginName::new("Factorial").unwrap();
/// assert_eq!(name.to_string(), "Factorial");
///
/// assert!(PluginName::new("").is_err());
/// assert!(PluginName::new("bad\nname").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginName(String);

impl PluginName {
    /// Maximum accepted length in bytes.
    pub const MAX_LEN: usize = 256;

    /// Creates a validated plugin name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the name is empty, has leading
    /// or trailing whitespace, contains control characters, or exceeds
    /// [`Self::MAX_LEN`].
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        let reason = if name.is_empty() {
            Some("cannot be empty")
        } else if name.trim() != name {
            Some("cannot have leading or trailing whitespace")
        } else if name.chars().any(char::is_control) {
            Some("cannot contain control characters")
        } else if name.len() > Self::MAX_LEN {
            Some("exceeds 256 bytes")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::ValidationError {
                field: "plugin_name".to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(Self(name)),
        }
    }

    /// Returns the name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PluginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PluginName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PluginName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PluginName> for String {
    fn from(name: PluginName) -> Self {
        name.0
    }
}

impl FromStr for PluginName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for PluginName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single decimal digit, `0` through `9`.
///
/// # Examples
///
/// ```
/// use calc_core::Digit;
///
/// assert_eq!(Digit::new(3).unwrap().value(), 3);
/// assert!(Digit::new(10).is_err());
/// assert_eq!(Digit::try_from('9').unwrap().as_char(), '9');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// The digit zero.
    pub const ZERO: Self = Self(0);

    /// Creates a digit from its numeric value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `value` is greater than 9.
    pub fn new(value: u8) -> Result<Self> {
        if value > 9 {
            return Err(Error::InvalidArgument(format!(
                "digit must be between 0 and 9, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the ASCII character for this digit.
    #[must_use]
    pub const fn as_char(self) -> char {
        (b'0' + self.0) as char
    }
}

impl TryFrom<u8> for Digit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

impl TryFrom<char> for Digit {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        c.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .map(Self)
            .ok_or_else(|| Error::InvalidArgument(format!("'{c}' is not a decimal digit")))
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four built-in binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl Operator {
    /// Returns the ASCII symbol of the operator.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Applies the operator with IEEE-754 double semantics.
    ///
    /// Division by zero yields a non-finite value rather than an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use calc_core::Operator;
    ///
    /// assert_eq!(Operator::Subtract.apply(2.0, 5.0), -3.0);
    /// assert!(Operator::Divide.apply(5.0, 0.0).is_infinite());
    /// assert!(Operator::Divide.apply(0.0, 0.0).is_nan());
    /// ```
    #[must_use]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
            Self::Divide => lhs / rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = Error;

    /// Parses ASCII symbols as well as the typographic `×`, `÷` and `−`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Self::Add),
            "-" | "−" => Ok(Self::Subtract),
            "*" | "x" | "X" | "×" => Ok(Self::Multiply),
            "/" | "÷" => Ok(Self::Divide),
            other => Err(Error::InvalidArgument(format!(
                "unknown operator '{other}' (expected one of + - * /)"
            ))),
        }
    }
}
