//! Typed fields, values, and severities for diagnostic records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Severity of a diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(crate::Error::Config {
                message: format!("unknown log level '{}'", other),
            }),
        }
    }
}

/// Typed payload of a single field.
///
/// Complex values are rendered to their string representation at
/// construction time, never lazily.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Duration(Duration),
    Timestamp(DateTime<Utc>),
}

/// A key paired with a typed value. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: Cow<'static, str>,
    value: Value,
}

impl Field {
    pub fn str(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Field {
        Field {
            key: key.into(),
            value: Value::Str(value.into()),
        }
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Field {
        Field {
            key: key.into(),
            value: Value::Int(value),
        }
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Field {
        Field {
            key: key.into(),
            value: Value::Bool(value),
        }
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Field {
        Field {
            key: key.into(),
            value: Value::Duration(value),
        }
    }

    pub fn timestamp(key: impl Into<Cow<'static, str>>, value: DateTime<Utc>) -> Field {
        Field {
            key: key.into(),
            value: Value::Timestamp(value),
        }
    }

    /// Render a complex value through its `Display` implementation.
    pub fn display(key: impl Into<Cow<'static, str>>, value: &dyn fmt::Display) -> Field {
        Field::str(key, value.to_string())
    }

    /// Render a complex value through its `Debug` implementation.
    pub fn debug(key: impl Into<Cow<'static, str>>, value: &dyn fmt::Debug) -> Field {
        Field::str(key, format!("{:?}", value))
    }

    /// The conventional `error` field carrying an error's description.
    pub fn error(err: &dyn std::error::Error) -> Field {
        Field::str("error", err.to_string())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A caller-supplied (key, value) string pair, used by the context-binding
/// protocol and by error context lists. Keys are not deduplicated by this
/// layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> KeyValue {
        KeyValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<(&str, &str)> for KeyValue {
    fn from((key, value): (&str, &str)) -> KeyValue {
        KeyValue::new(key, value)
    }
}

impl From<&KeyValue> for Field {
    fn from(kv: &KeyValue) -> Field {
        Field::str(kv.key.clone(), kv.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("INFO".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warn);
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn test_error_field() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let field = Field::error(&err);

        assert_eq!(field.key(), "error");
        assert_eq!(field.value(), &Value::Str("disk full".to_string()));
    }

    #[test]
    fn test_keyvalue_to_field() {
        let kv = KeyValue::new("attempt", "3");
        let field = Field::from(&kv);

        assert_eq!(field.key(), "attempt");
        assert_eq!(field.value(), &Value::Str("3".to_string()));
    }

    #[test]
    fn test_rendered_values() {
        let field = Field::display("level", &Severity::Warn);
        assert_eq!(field.value(), &Value::Str("warn".to_string()));

        let field = Field::debug("data", &vec![1, 2, 3]);
        assert_eq!(field.value(), &Value::Str("[1, 2, 3]".to_string()));
    }
}
