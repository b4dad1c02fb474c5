//! Key-token parsing for scripted and interactive input.
//!
//! A key sequence is whitespace-separated tokens. A token is either a
//! named key (`C`, `AC`, `BS`, `+/-`) or a run of single-character keys
//! such as `12.5` or `2+3=`.
//!
//! | Key | Characters |
//! |---|---|
//! | digit | `0`-`9` |
//! | decimal point | `.` |
//! | operators | `+` `-` `*` `/` `x` `X` `×` `÷` `−` |
//! | equals | `=` |
//! | clear | `C` `c` |
//! | backspace | `<` `←` `⌫` |
//! | toggle sign | `~` `±` |
//!
//! # Examples
//!
//! ```
//! use calc_engine::{ArithmeticEngine, keys};
//!
//! let events = keys::parse_sequence("12.5 + 2.5 =").unwrap();
//! let mut engine = ArithmeticEngine::new();
//! engine.apply_all(events).unwrap();
//! assert_eq!(engine.display().as_str(), "15");
//! ```

use crate::Event;
use calc_core::{Digit, Error, Operator, Result};

/// Parses a whole whitespace-separated key sequence.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] naming the first unknown key.
pub fn parse_sequence(input: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for token in input.split_whitespace() {
        events.extend(parse_token(token)?);
    }
    Ok(events)
}

/// Parses one token into the events it stands for.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the token contains an unknown key.
///
/// # Examples
///
/// ```
/// use calc_engine::{keys, Event};
///
/// assert_eq!(keys::parse_token("+/-").unwrap(), vec![Event::ToggleSign]);
/// assert_eq!(keys::parse_token("2+3=").unwrap().len(), 4);
/// assert!(keys::parse_token("2%").is_err());
/// ```
pub fn parse_token(token: &str) -> Result<Vec<Event>> {
    if let Some(event) = named_key(token) {
        return Ok(vec![event]);
    }
    token
        .chars()
        .map(|c| {
            char_key(c).ok_or_else(|| {
                Error::InvalidArgument(format!("unknown key '{c}' in token '{token}'"))
            })
        })
        .collect()
}

fn named_key(token: &str) -> Option<Event> {
    match token.to_ascii_lowercase().as_str() {
        "c" | "ac" | "clear" => Some(Event::Clear),
        "bs" | "back" | "backspace" => Some(Event::Backspace),
        "+/-" | "neg" => Some(Event::ToggleSign),
        _ => None,
    }
}

fn char_key(c: char) -> Option<Event> {
    if let Ok(digit) = Digit::try_from(c) {
        return Some(Event::Digit(digit));
    }
    match c {
        '.' => Some(Event::DecimalPoint),
        '=' => Some(Event::Equals),
        'C' | 'c' => Some(Event::Clear),
        '<' | '←' | '⌫' => Some(Event::Backspace),
        '~' | '±' => Some(Event::ToggleSign),
        _ => {
            let mut buf = [0_u8; 4];
            c.encode_utf8(&mut buf)
                .parse::<Operator>()
                .ok()
                .map(Event::Operator)
        }
    }
}
