//! Best-effort conversion of raw JSON values into typed fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoerceError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("cannot read '{value}' as {expected}")]
    Unparseable { value: String, expected: &'static str },
    #[error("{0} is out of range")]
    OutOfRange(String),
    #[error("invalid nested value: {0}")]
    Nested(String),
    #[error("{0}")]
    Rejected(String),
}

/// Conversion from a non-null JSON value.
pub trait Coerce: Sized {
    fn coerce(value: &Value) -> Result<Self, CoerceError>;
}

/// Scalar field: null becomes the type's zero value, anything else goes
/// through [`Coerce`].
pub fn scalar<T: Coerce + Default>(value: &Value) -> Result<T, CoerceError> {
    match value {
        Value::Null => Ok(T::default()),
        other => T::coerce(other),
    }
}

/// Nested field: only objects and arrays are accepted, and they replace the
/// current value entirely.
pub fn structured<T: DeserializeOwned + Default>(value: &Value) -> Result<T, CoerceError> {
    match value {
        Value::Null => Ok(T::default()),
        Value::Object(_) | Value::Array(_) => {
            serde_json::from_value(value.clone()).map_err(|e| CoerceError::Nested(e.to_string()))
        }
        other => Err(CoerceError::TypeMismatch {
            expected: "object or array",
            found: kind(other),
        }),
    }
}

pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<T: Coerce> Coerce for Option<T> {
    fn coerce(value: &Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(None),
            other => T::coerce(other).map(Some),
        }
    }
}

impl Coerce for String {
    fn coerce(value: &Value) -> Result<Self, CoerceError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(CoerceError::TypeMismatch {
                expected: "string",
                found: kind(other),
            }),
        }
    }
}

impl Coerce for bool {
    fn coerce(value: &Value) -> Result<Self, CoerceError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(CoerceError::Unparseable {
                        value: s.to_string(),
                        expected: "boolean",
                    })
                }
            }
            other => Err(CoerceError::TypeMismatch {
                expected: "boolean",
                found: kind(other),
            }),
        }
    }
}

macro_rules! impl_integer_coerce {
    ($($ty:ty),*) => {$(
        impl Coerce for $ty {
            fn coerce(value: &Value) -> Result<Self, CoerceError> {
                let wide = match value {
                    Value::Number(n) => integral(n.as_i64(), n.as_f64(), || n.to_string())?,
                    Value::String(s) => parse_integral(s.trim())?,
                    other => {
                        return Err(CoerceError::TypeMismatch {
                            expected: stringify!($ty),
                            found: kind(other),
                        })
                    }
                };
                <$ty>::try_from(wide).map_err(|_| CoerceError::OutOfRange(wide.to_string()))
            }
        }
    )*};
}

impl_integer_coerce!(i32, i64);

/// Whole-number view of a JSON number. Floats are accepted only when they have
/// no fractional part.
fn integral(
    as_int: Option<i64>,
    as_float: Option<f64>,
    text: impl Fn() -> String,
) -> Result<i64, CoerceError> {
    if let Some(i) = as_int {
        return Ok(i);
    }
    match as_float {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => Ok(f as i64),
        Some(_) => Err(CoerceError::OutOfRange(text())),
        None => Err(CoerceError::Unparseable {
            value: text(),
            expected: "integer",
        }),
    }
}

fn parse_integral(s: &str) -> Result<i64, CoerceError> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    let unparseable = || CoerceError::Unparseable {
        value: s.to_string(),
        expected: "integer",
    };
    let f = s.parse::<f64>().map_err(|_| unparseable())?;
    if !f.is_finite() {
        return Err(unparseable());
    }
    integral(None, Some(f), || s.to_string())
}

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Coerce for DateTime<Utc> {
    fn coerce(value: &Value) -> Result<Self, CoerceError> {
        let Value::String(raw) = value else {
            return Err(CoerceError::TypeMismatch {
                expected: "timestamp string",
                found: kind(value),
            });
        };
        let s = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| CoerceError::Unparseable {
                value: s.to_string(),
                expected: "timestamp",
            })
    }
}
