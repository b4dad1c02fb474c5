//! Digit and operator entry state machine for the plugin calculator.
//!
//! The engine is a pure state machine: an immutable [`CalculatorState`]
//! record, one reducer per input [`Event`], and a thin
//! [`ArithmeticEngine`] wrapper that owns the current state. It performs no
//! I/O.
//!
//! # Semantics
//!
//! - Arithmetic is IEEE-754 double precision; division by zero yields a
//!   non-finite display rather than an error.
//! - Choosing an operator fixes the current display as the left operand of
//!   the next `=`. A second operator overwrites the first; there is no
//!   chaining and no precedence.
//! - Results render with Rust's shortest round-trip formatting.
//!
//! # Examples
//!
//! ```
//! use calc_engine::{ArithmeticEngine, keys};
//!
//! let mut engine = ArithmeticEngine::new();
//! engine.apply_all(keys::parse_sequence("2 + 3 =").unwrap()).unwrap();
//! assert_eq!(engine.display().as_str(), "5");
//!
//! engine.apply_all(keys::parse_sequence("* 4 =").unwrap()).unwrap();
//! assert_eq!(engine.display().as_str(), "20");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod display;
mod engine;
mod state;

pub mod keys;
pub mod reducer;

pub use display::DisplayValue;
pub use engine::ArithmeticEngine;
pub use reducer::{Event, reduce};
pub use state::{CalculatorState, PendingOperation, Phase};
