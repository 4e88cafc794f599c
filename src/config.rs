use std::str::FromStr;

use anyhow::anyhow;

/// What the decoder does with keys a record does not declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownFields {
    #[default]
    Reject,
    Ignore,
}

impl FromStr for UnknownFields {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownFields::Reject),
            "ignore" => Ok(UnknownFields::Ignore),
            other => Err(anyhow!("unsupported unknown-fields policy: {}", other)),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub unknown_fields: UnknownFields,
}

impl AppConfig {
    pub const UNKNOWN_FIELDS_KEY: &'static str = "CODECHAT_UNKNOWN_FIELDS";

    // Factory over any key/value source, missing keys fall back to defaults
    pub fn new<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let unknown_fields = match lookup(Self::UNKNOWN_FIELDS_KEY) {
            Some(raw) => raw
                .parse::<UnknownFields>()
                .map_err(|e| anyhow!("{} is invalid: {}", Self::UNKNOWN_FIELDS_KEY, e))?,
            None => UnknownFields::default(),
        };

        Ok(AppConfig { unknown_fields })
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::new(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_to_reject() {
        let config = AppConfig::new(|_| None).unwrap();
        assert_eq!(config.unknown_fields, UnknownFields::Reject);
    }

    #[test]
    fn test_reads_ignore_policy() {
        let source = HashMap::from([(AppConfig::UNKNOWN_FIELDS_KEY, " Ignore ")]);
        let config = AppConfig::new(|key| source.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.unknown_fields, UnknownFields::Ignore);
    }

    #[test]
    fn test_rejects_unsupported_policy() {
        let err = AppConfig::new(|_| Some("drop".to_string())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(AppConfig::UNKNOWN_FIELDS_KEY));
        assert!(message.contains("drop"));
    }
}
