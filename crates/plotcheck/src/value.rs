//! Scalar values recorded in a test summary.
//!
//! Summary records only ever hold JSON scalars. They are loaded into
//! [`FieldValue`] so the comparison rules can be written as an exhaustive
//! match instead of runtime type inspection.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix marking a baseline string as a regular expression
pub const REGEX_PREFIX: &str = "REGEX:";

/// A single summary field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON `null`
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON integer
    Integer(i64),
    /// JSON floating point number
    Float(f64),
    /// JSON string
    String(String),
}

/// Variant of a [`FieldValue`], used in type mismatch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `null`
    Null,
    /// Boolean
    Bool,
    /// Integer
    Integer,
    /// Float
    Float,
    /// String
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "int",
            Self::Float => "float",
            Self::String => "str",
        };
        f.write_str(name)
    }
}

/// Outcome of comparing a baseline value with a result value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueMatch {
    /// Values match
    Equal,
    /// Values are of different variants
    TypeMismatch {
        /// Baseline variant
        baseline: ValueKind,
        /// Result variant
        result: ValueKind,
    },
    /// Same variant, different value (or regex did not match)
    ValueMismatch,
    /// Baseline regex could not be compiled
    InvalidPattern {
        /// Regex compile error
        message: String,
    },
}

impl ValueMatch {
    /// Whether the comparison succeeded
    #[must_use]
    pub const fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }
}

impl FieldValue {
    /// Convert a JSON value, rejecting arrays and objects
    ///
    /// Returns the offending JSON type name on failure.
    pub fn from_json(value: serde_json::Value) -> Result<Self, &'static str> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err("number out of range")
                }
            }
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(_) => Err("array"),
            Value::Object(_) => Err("object"),
        }
    }

    /// Variant of this value
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
        }
    }

    /// Borrow the string payload, if any
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is `null`
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Compare `self` (baseline) against `result`.
    ///
    /// A baseline string starting with [`REGEX_PREFIX`] must fully match the
    /// result string. `null` and booleans only match the identical value, so
    /// `null` never matches `false`.
    #[must_use]
    pub fn compare(&self, result: &Self) -> ValueMatch {
        if self.kind() != result.kind() {
            return ValueMatch::TypeMismatch {
                baseline: self.kind(),
                result: result.kind(),
            };
        }

        let equal = match (self, result) {
            (Self::String(b), Self::String(r)) => {
                if let Some(pattern) = b.strip_prefix(REGEX_PREFIX) {
                    return match full_match(pattern, r) {
                        Ok(true) => ValueMatch::Equal,
                        Ok(false) => ValueMatch::ValueMismatch,
                        Err(e) => ValueMatch::InvalidPattern {
                            message: e.to_string(),
                        },
                    };
                }
                b == r
            }
            (Self::Null, Self::Null) => true,
            (Self::Bool(b), Self::Bool(r)) => b == r,
            (Self::Integer(b), Self::Integer(r)) => b == r,
            (Self::Float(b), Self::Float(r)) => b == r,
            _ => false,
        };

        if equal {
            ValueMatch::Equal
        } else {
            ValueMatch::ValueMismatch
        }
    }
}

/// Anchor `pattern` so it must match all of `text`
fn full_match(pattern: &str, text: &str) -> Result<bool, regex::Error> {
    let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
    Ok(anchored.is_match(text))
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&python_float(*x)),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip form with a signed, two-digit exponent (`1e-05`, `1.5e+20`)
fn python_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{x:?}");
    let Some((mantissa, exponent)) = repr.split_once('e') else {
        return repr;
    };
    let (sign, digits) = exponent
        .strip_prefix('-')
        .map_or(("+", exponent), |rest| ("-", rest));
    format!("{mantissa}e{sign}{digits:0>2}")
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    mod from_json_tests {
        use super::*;

        #[test]
        fn test_scalars() {
            assert_eq!(FieldValue::from_json(json!(null)), Ok(FieldValue::Null));
            assert_eq!(FieldValue::from_json(json!(true)), Ok(FieldValue::Bool(true)));
            assert_eq!(FieldValue::from_json(json!(3)), Ok(FieldValue::Integer(3)));
            assert_eq!(FieldValue::from_json(json!(0.5)), Ok(FieldValue::Float(0.5)));
            assert_eq!(
                FieldValue::from_json(json!("x")),
                Ok(FieldValue::String("x".to_string()))
            );
        }

        #[test]
        fn test_integer_and_float_stay_distinct() {
            assert_eq!(FieldValue::from_json(json!(1.0)).unwrap().kind(), ValueKind::Float);
            assert_eq!(FieldValue::from_json(json!(1)).unwrap().kind(), ValueKind::Integer);
        }

        #[test]
        fn test_containers_rejected() {
            assert_eq!(FieldValue::from_json(json!([1, 2])), Err("array"));
            assert_eq!(FieldValue::from_json(json!({"a": 1})), Err("object"));
        }

        #[test]
        fn test_serialize_round_trip_null() {
            let json = serde_json::to_string(&FieldValue::Null).unwrap();
            assert_eq!(json, "null");
        }
    }

    mod compare_tests {
        use super::*;

        #[test]
        fn test_equal_strings() {
            assert!(FieldValue::from("a").compare(&FieldValue::from("a")).is_equal());
        }

        #[test]
        fn test_different_strings() {
            assert_eq!(
                FieldValue::from("x").compare(&FieldValue::from("y")),
                ValueMatch::ValueMismatch
            );
        }

        #[test]
        fn test_null_is_not_false() {
            assert_eq!(
                FieldValue::Null.compare(&FieldValue::Bool(false)),
                ValueMatch::TypeMismatch {
                    baseline: ValueKind::Null,
                    result: ValueKind::Bool,
                }
            );
        }

        #[test]
        fn test_int_is_not_float() {
            let m = FieldValue::Integer(1).compare(&FieldValue::Float(1.0));
            assert!(matches!(m, ValueMatch::TypeMismatch { .. }));
        }

        #[test]
        fn test_bools() {
            assert!(FieldValue::Bool(true).compare(&FieldValue::Bool(true)).is_equal());
            assert!(!FieldValue::Bool(true).compare(&FieldValue::Bool(false)).is_equal());
            assert!(FieldValue::Null.compare(&FieldValue::Null).is_equal());
        }

        #[test]
        fn test_regex_full_match() {
            let baseline = FieldValue::from("REGEX:/tmp/.*/img.png");
            assert!(baseline.compare(&FieldValue::from("/tmp/run42/img.png")).is_equal());
        }

        #[test]
        fn test_regex_is_anchored() {
            let baseline = FieldValue::from("REGEX:img");
            assert!(!baseline.compare(&FieldValue::from("img.png")).is_equal());
            assert!(!baseline.compare(&FieldValue::from("my_img")).is_equal());
        }

        #[test]
        fn test_regex_alternation_is_anchored_as_a_whole() {
            let baseline = FieldValue::from("REGEX:a|b");
            assert!(baseline.compare(&FieldValue::from("b")).is_equal());
            assert!(!baseline.compare(&FieldValue::from("ab")).is_equal());
        }

        #[test]
        fn test_regex_only_applies_to_baseline() {
            let baseline = FieldValue::from("/tmp/x");
            assert!(!baseline.compare(&FieldValue::from("REGEX:.*")).is_equal());
        }

        #[test]
        fn test_invalid_regex() {
            let m = FieldValue::from("REGEX:(").compare(&FieldValue::from("("));
            assert!(matches!(m, ValueMatch::InvalidPattern { .. }));
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(FieldValue::Null.to_string(), "None");
            assert_eq!(FieldValue::Bool(false).to_string(), "False");
            assert_eq!(FieldValue::Integer(7).to_string(), "7");
            assert_eq!(FieldValue::Float(2.0).to_string(), "2.0");
            assert_eq!(FieldValue::Float(0.0001).to_string(), "0.0001");
            assert_eq!(FieldValue::from("x").to_string(), "x");
        }

        #[test]
        fn test_float_exponent_format() {
            assert_eq!(FieldValue::Float(1e-5).to_string(), "1e-05");
            assert_eq!(FieldValue::Float(1.5e-7).to_string(), "1.5e-07");
            assert_eq!(FieldValue::Float(1e20).to_string(), "1e+20");
            assert_eq!(FieldValue::Float(-2.5e16).to_string(), "-2.5e+16");
            assert_eq!(FieldValue::Float(1e100).to_string(), "1e+100");
            assert_eq!(FieldValue::Float(f64::INFINITY).to_string(), "inf");
        }

        #[test]
        fn test_from_option() {
            assert_eq!(FieldValue::from(None::<&str>), FieldValue::Null);
            assert_eq!(FieldValue::from(Some("a")), FieldValue::from("a"));
        }
    }
}
