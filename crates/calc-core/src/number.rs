//! Conversions between display text and `f64`.
//!
//! All arithmetic is double precision. Rendering uses Rust's shortest
//! round-trip formatting for finite values and spells non-finite values
//! `Infinity`, `-Infinity` and `NaN` so they parse back unchanged.

use crate::{Error, Result};

/// Parses display text as a number.
///
/// Accepts everything `f64::from_str` accepts, which covers partial entries
/// such as `"5."` as well as the non-finite spellings produced by
/// [`format_number`].
///
/// # Errors
///
/// Returns [`Error::InvalidOperand`] if the text is not a number.
///
/// # Examples
///
/// ```
/// use calc_core::number::parse_number;
///
/// assert_eq!(parse_number("5.").unwrap(), 5.0);
/// assert_eq!(parse_number("-0.25").unwrap(), -0.25);
/// assert!(parse_number("Infinity").unwrap().is_infinite());
/// assert!(parse_number(".").is_err());
/// assert!(parse_number("").is_err());
/// ```
pub fn parse_number(text: &str) -> Result<f64> {
    text.parse::<f64>().map_err(|_| Error::InvalidOperand {
        value: text.to_string(),
    })
}

/// Renders a number the way results are shown on the display.
///
/// # Examples
///
/// ```
/// use calc_core::number::format_number;
///
/// assert_eq!(format_number(5.0), "5");
/// assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(f64::INFINITY), "Infinity");
/// assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
/// assert_eq!(format_number(f64::NAN), "NaN");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        // -0 renders as 0
        "0".to_string()
    } else {
        value.to_string()
    }
}
