//! Lenient numeric values.

use alloc::string::String;
use alloc::vec::Vec;

/// A number as the API happened to encode it.
///
/// Most metric fields are sent as decimal strings, a few as JSON numbers,
/// and any of them can be empty. `Numeric` keeps the raw form and only
/// interprets it when [`value`](Numeric::value) is called.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Numeric {
    /// A JSON number.
    Number(f64),
    /// A JSON string, usually a decimal number.
    Text(String),
    /// A JSON boolean.
    Flag(bool),
    /// An explicit JSON `null`.
    Null,
    /// An object or array where a scalar was expected.
    Other(Opaque),
}

/// A JSON value that was skipped while decoding.
///
/// Serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Opaque;

#[cfg(feature = "serde")]
impl serde::Serialize for Opaque {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Opaque {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <serde::de::IgnoredAny as serde::Deserialize>::deserialize(deserializer).map(|_| Opaque)
    }
}

impl Numeric {
    /// Coerce to `f64`.
    ///
    /// Text is trimmed and parsed; empty text reads as `0`. Anything that
    /// does not produce a finite number reads as `0` as well, so this never
    /// fails.
    pub fn value(&self) -> f64 {
        let v = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse::<f64>().unwrap_or(0.0)
                }
            }
            Numeric::Flag(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Numeric::Null | Numeric::Other(_) => 0.0,
        };

        if v.is_finite() {
            v
        } else {
            0.0
        }
    }

    /// The raw text, if the value arrived as a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Numeric::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::Number(0.0)
    }
}

impl From<f64> for Numeric {
    fn from(n: f64) -> Self {
        Numeric::Number(n)
    }
}

impl From<u64> for Numeric {
    fn from(n: u64) -> Self {
        Numeric::Number(n as f64)
    }
}

impl From<&str> for Numeric {
    fn from(s: &str) -> Self {
        Numeric::Text(s.into())
    }
}

impl From<String> for Numeric {
    fn from(s: String) -> Self {
        Numeric::Text(s)
    }
}

/// Coerce an optional value; a missing or `null` field reads as `0`.
pub fn coerce(value: Option<&Numeric>) -> f64 {
    value.map_or(0.0, Numeric::value)
}

/// A date field that the API sends either as a string or a list of strings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum DateStamp {
    One(String),
    Many(Vec<String>),
}

impl DateStamp {
    /// The first (usually only) date in the field.
    pub fn first(&self) -> Option<&str> {
        match self {
            DateStamp::One(s) => Some(s.as_str()),
            DateStamp::Many(v) => v.first().map(|s| s.as_str()),
        }
    }
}

impl Default for DateStamp {
    fn default() -> Self {
        DateStamp::Many(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_parses_as_decimal() {
        assert_eq!(Numeric::from("125.5").value(), 125.5);
        assert_eq!(Numeric::from("  42 ").value(), 42.0);
    }

    #[test]
    fn non_numeric_text_reads_as_zero() {
        assert_eq!(Numeric::from("").value(), 0.0);
        assert_eq!(Numeric::from("n/a").value(), 0.0);
        assert_eq!(Numeric::from("NaN").value(), 0.0);
        assert_eq!(Numeric::from("inf").value(), 0.0);
    }

    #[test]
    fn flags_and_missing_values() {
        assert_eq!(Numeric::Flag(true).value(), 1.0);
        assert_eq!(Numeric::Flag(false).value(), 0.0);
        assert_eq!(coerce(None), 0.0);
        assert_eq!(coerce(Some(&Numeric::Number(3.5))), 3.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_strings_numbers_and_null() {
        let values: Vec<Option<Numeric>> =
            serde_json::from_str(r#"["12.5", 7, null, "", true]"#).unwrap();
        let coerced: Vec<f64> = values.iter().map(|v| coerce(v.as_ref())).collect();
        assert_eq!(coerced, vec![12.5, 7.0, 0.0, 0.0, 1.0]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn null_field_reads_as_zero() {
        let v: Numeric = serde_json::from_str("null").unwrap();
        assert_eq!(v, Numeric::Null);
        assert_eq!(v.value(), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn objects_and_arrays_read_as_zero() {
        let values: Vec<Numeric> =
            serde_json::from_str(r#"[{"nested": 1}, [1, 2], "3"]"#).unwrap();
        assert_eq!(values[0], Numeric::Other(Opaque));
        assert_eq!(values[1], Numeric::Other(Opaque));
        let coerced: Vec<f64> = values.iter().map(Numeric::value).collect();
        assert_eq!(coerced, vec![0.0, 0.0, 3.0]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn date_stamp_accepts_string_or_list() {
        let one: DateStamp = serde_json::from_str(r#""2024-01-01 10:00:00""#).unwrap();
        let many: DateStamp = serde_json::from_str(r#"["2024-01-01 10:00:00"]"#).unwrap();
        assert_eq!(one.first(), Some("2024-01-01 10:00:00"));
        assert_eq!(many.first(), Some("2024-01-01 10:00:00"));
        assert_eq!(DateStamp::default().first(), None);
    }
}
