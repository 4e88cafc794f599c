//! Validating decoder shared by every record.
//!
//! Input is parsed into a `serde_json::Value` first, then each record pulls
//! its declared fields out of the object through [`Fields`]. Whatever is
//! left over afterwards is an undeclared key and is handled according to the
//! configured [`UnknownFields`] policy.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{AppConfig, UnknownFields};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Missing,
    InvalidType { expected: &'static str },
    InvalidVariant { value: String },
    UnknownField,
    Malformed(String),
}

/// A record failed to satisfy its constraints.
///
/// `entity` is the innermost record being decoded and `field` is the path of
/// the offending value from the document root, e.g. `messages[1].type`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub entity: &'static str,
    pub field: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(entity: &'static str, field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        ValidationError {
            entity,
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::Missing => write!(f, "missing required field"),
            ValidationErrorKind::InvalidType { expected } => write!(f, "expected {}", expected),
            ValidationErrorKind::InvalidVariant { value } => {
                write!(f, "unknown variant \"{}\"", value)
            }
            ValidationErrorKind::UnknownField => write!(f, "unknown field"),
            ValidationErrorKind::Malformed(reason) => write!(f, "malformed input: {}", reason),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "invalid {}: {}", self.entity, self.kind)
        } else {
            write!(f, "invalid {} at `{}`: {}", self.entity, self.field, self.kind)
        }
    }
}

impl std::error::Error for ValidationError {}

/// A record that can be built from a JSON object.
pub trait Record: Sized {
    const ENTITY: &'static str;

    fn from_fields(fields: &mut Fields) -> Result<Self, ValidationError>;
}

/// The not-yet-consumed keys of one JSON object.
pub struct Fields {
    entity: &'static str,
    prefix: String,
    map: Map<String, Value>,
    unknown_fields: UnknownFields,
}

impl Fields {
    fn path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    fn error(&self, name: &str, kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(self.entity, self.path(name), kind)
    }

    pub fn text(&mut self, name: &str) -> Result<Option<String>, ValidationError> {
        match self.map.remove(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.error(name, ValidationErrorKind::InvalidType { expected: "string" })),
        }
    }

    pub fn required_text(&mut self, name: &str) -> Result<String, ValidationError> {
        self.text(name)?
            .ok_or_else(|| self.error(name, ValidationErrorKind::Missing))
    }

    /// A string drawn from a closed set, parsed with `T::from_str`.
    pub fn variant<T: FromStr>(&mut self, name: &str) -> Result<Option<T>, ValidationError> {
        match self.text(name)? {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.error(name, ValidationErrorKind::InvalidVariant { value: raw })),
        }
    }

    pub fn timestamp(&mut self, name: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
        match self.map.remove(name) {
            None => Ok(None),
            Some(Value::String(s)) => parse_timestamp(&s).map(Some).ok_or_else(|| {
                self.error(name, ValidationErrorKind::InvalidType { expected: "timestamp" })
            }),
            Some(_) => Err(self.error(
                name,
                ValidationErrorKind::InvalidType { expected: "timestamp" },
            )),
        }
    }

    pub fn record<T: Record>(&mut self, name: &str) -> Result<Option<T>, ValidationError> {
        match self.map.remove(name) {
            None => Ok(None),
            Some(value) => {
                let path = self.path(name);
                decode_at::<T>(value, path, self.unknown_fields).map(Some)
            }
        }
    }

    pub fn records<T: Record>(&mut self, name: &str) -> Result<Option<Vec<T>>, ValidationError> {
        match self.map.remove(name) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let path = self.path(name);
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        decode_at::<T>(item, format!("{}[{}]", path, i), self.unknown_fields)
                    })
                    .collect::<Result<Vec<T>, _>>()
                    .map(Some)
            }
            Some(_) => Err(self.error(name, ValidationErrorKind::InvalidType { expected: "array" })),
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        let Some(first) = self.map.keys().next() else {
            return Ok(());
        };
        match self.unknown_fields {
            UnknownFields::Reject => Err(self.error(first, ValidationErrorKind::UnknownField)),
            UnknownFields::Ignore => {
                let ignored: Vec<&String> = self.map.keys().collect();
                debug!("Ignoring unknown {} fields: {:?}", self.entity, ignored);
                Ok(())
            }
        }
    }
}

/// Accepts RFC 3339 with any offset, or a naive ISO-8601 date-time read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn decode_at<T: Record>(
    value: Value,
    prefix: String,
    unknown_fields: UnknownFields,
) -> Result<T, ValidationError> {
    let map = match value {
        Value::Object(map) => map,
        _ => {
            return Err(ValidationError::new(
                T::ENTITY,
                prefix,
                ValidationErrorKind::InvalidType { expected: "object" },
            ))
        }
    };

    let mut fields = Fields {
        entity: T::ENTITY,
        prefix,
        map,
        unknown_fields,
    };
    let record = T::from_fields(&mut fields)?;
    fields.finish()?;
    Ok(record)
}

/// Entry point for turning untrusted JSON into records.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decoder {
    unknown_fields: UnknownFields,
}

impl Decoder {
    pub fn new(unknown_fields: UnknownFields) -> Self {
        Decoder { unknown_fields }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Decoder::new(config.unknown_fields)
    }

    pub fn decode_value<T: Record>(&self, value: Value) -> Result<T, ValidationError> {
        let result = decode_at::<T>(value, String::new(), self.unknown_fields);
        match &result {
            Ok(_) => debug!("Decoded {}", T::ENTITY),
            Err(e) => warn!("Rejected {} payload: {}", T::ENTITY, e),
        }
        result
    }

    pub fn decode_str<T: Record>(&self, json: &str) -> Result<T, ValidationError> {
        let value: Value = serde_json::from_str(json).map_err(|e| {
            warn!("Malformed {} payload: {}", T::ENTITY, e);
            ValidationError::new(T::ENTITY, "", ValidationErrorKind::Malformed(e.to_string()))
        })?;
        self.decode_value(value)
    }
}

/// Routes `serde::Deserialize` through the validating decoder with the
/// default policy, so `serde_json::from_*` enforces the same rules.
macro_rules! deserialize_via_decoder {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                    $crate::validation::Decoder::default()
                        .decode_value(value)
                        .map_err(serde::de::Error::custom)
                }
            }
        )+
    };
}

pub(crate) use deserialize_via_decoder;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Pair {
        left: String,
        right: Option<String>,
    }

    impl Record for Pair {
        const ENTITY: &'static str = "Pair";

        fn from_fields(fields: &mut Fields) -> Result<Self, ValidationError> {
            Ok(Pair {
                left: fields.required_text("left")?,
                right: fields.text("right")?,
            })
        }
    }

    #[test]
    fn test_missing_required_field() {
        let err = Decoder::default()
            .decode_value::<Pair>(json!({ "right": "r" }))
            .unwrap_err();
        assert_eq!(err, ValidationError::new("Pair", "left", ValidationErrorKind::Missing));
        assert_eq!(err.to_string(), "invalid Pair at `left`: missing required field");
    }

    #[test]
    fn test_null_is_a_type_error() {
        let err = Decoder::default()
            .decode_value::<Pair>(json!({ "left": "l", "right": null }))
            .unwrap_err();
        assert_eq!(err.field, "right");
        assert_eq!(err.kind, ValidationErrorKind::InvalidType { expected: "string" });
    }

    #[test]
    fn test_unknown_field_policy() {
        let input = json!({ "left": "l", "extra": 1 });

        let err = Decoder::new(UnknownFields::Reject)
            .decode_value::<Pair>(input.clone())
            .unwrap_err();
        assert_eq!(err, ValidationError::new("Pair", "extra", ValidationErrorKind::UnknownField));

        let pair = Decoder::new(UnknownFields::Ignore)
            .decode_value::<Pair>(input)
            .unwrap();
        assert_eq!(pair.left, "l");
        assert!(pair.right.is_none());
    }

    #[test]
    fn test_decoder_from_config() {
        let config = AppConfig::new(|_| Some("ignore".to_string())).unwrap();
        let pair = Decoder::from_config(&config)
            .decode_str::<Pair>(r#"{"left":"l","colour":"red"}"#)
            .unwrap();
        assert_eq!(pair.left, "l");
    }

    #[test]
    fn test_non_object_document() {
        let err = Decoder::default().decode_value::<Pair>(json!(["l"])).unwrap_err();
        assert_eq!(err.field, "");
        assert_eq!(err.kind, ValidationErrorKind::InvalidType { expected: "object" });
        assert_eq!(err.to_string(), "invalid Pair: expected object");
    }

    #[test]
    fn test_malformed_json() {
        let err = Decoder::default().decode_str::<Pair>("{\"left\":").unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::Malformed(_)));
    }

    #[test]
    fn test_timestamp_formats() {
        let utc = parse_timestamp("2026-10-16T12:00:00.123456Z").unwrap();
        let offset = parse_timestamp("2026-10-16T14:00:00.123456+02:00").unwrap();
        let naive = parse_timestamp("2026-10-16T12:00:00.123456").unwrap();
        assert_eq!(utc, offset);
        assert_eq!(utc, naive);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_converts_into_anyhow() {
        fn run() -> anyhow::Result<Pair> {
            Ok(Decoder::default().decode_str::<Pair>("{}")?)
        }
        let err = run().err().unwrap();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }
}
