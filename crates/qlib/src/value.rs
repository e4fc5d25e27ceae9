//! Coerced values - typed reads of string storage
//!
//! Cookies and `data-*` attributes only store strings. Reads go through one
//! fixed precedence: number, then boolean, then the string itself.
//!
//! The contract is lossy on purpose: writing the string `"42"` reads back
//! as the number `42`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Bool(bool),
    String(String),
}

/// True if the whole string (surrounding whitespace aside) is a finite number
pub fn is_number(text: &str) -> bool {
    parse_number(text).is_some()
}

/// True if the string is a number without a fractional part
pub fn is_int(text: &str) -> bool {
    parse_number(text).map_or(false, |n| n.fract() == 0.0)
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    // Rust accepts "inf"/"nan" spellings; a numeric literal must start
    // with a digit, a sign or a dot
    let first = trimmed.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl Value {
    /// Total: every string maps to some value
    pub fn coerce(text: &str) -> Self {
        if let Some(number) = parse_number(text) {
            return Value::Number(number);
        }
        match text.to_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Loose truthiness: non-zero numbers, `true`, non-empty strings
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// The string form written to storage
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value as f64)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(value as f64)
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_precedence() {
        assert_eq!(Value::coerce("42"), Value::Number(42.0));
        assert_eq!(Value::coerce("-1.5"), Value::Number(-1.5));
        assert_eq!(Value::coerce(" 7 "), Value::Number(7.0));
        assert_eq!(Value::coerce("TRUE"), Value::Bool(true));
        assert_eq!(Value::coerce("false"), Value::Bool(false));
        assert_eq!(Value::coerce("hello"), Value::String("hello".into()));
        assert_eq!(Value::coerce(""), Value::String(String::new()));
    }

    #[test]
    fn test_non_finite_and_partial_numbers_stay_strings() {
        assert_eq!(Value::coerce("inf"), Value::String("inf".into()));
        assert_eq!(Value::coerce("NaN"), Value::String("NaN".into()));
        assert_eq!(Value::coerce("1e999"), Value::String("1e999".into()));
        assert_eq!(Value::coerce("12px"), Value::String("12px".into()));
    }

    #[test]
    fn test_lossy_string_round_trip() {
        let stored = Value::from("42").to_string();
        assert_eq!(Value::coerce(&stored), Value::Number(42.0));
    }

    #[test]
    fn test_display_matches_storage_form() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::from(true).to_string(), "true");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::from(1).is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("no").is_truthy());
    }

    #[test]
    fn test_is_int() {
        assert!(is_int("3"));
        assert!(!is_int("3.5"));
        assert!(!is_int("three"));
        assert!(is_number("3.5"));
    }
}
