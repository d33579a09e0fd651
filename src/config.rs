use crate::error::ConfigError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Enforcement level of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Off,
    Warn,
    Error,
}

impl Severity {
    /// Parse a severity from its config form: `"off" | "warn" | "error"` or `0 | 1 | 2`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(s) => match s.to_lowercase().as_str() {
                "off" => Ok(Severity::Off),
                "warn" | "warning" => Ok(Severity::Warn),
                "error" => Ok(Severity::Error),
                _ => Err(ConfigError::InvalidSeverity(value.to_string())),
            },
            Value::Number(n) => match n.as_u64() {
                Some(0) => Ok(Severity::Off),
                Some(1) => Ok(Severity::Warn),
                Some(2) => Ok(Severity::Error),
                _ => Err(ConfigError::InvalidSeverity(value.to_string())),
            },
            _ => Err(ConfigError::InvalidSeverity(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Off => "off",
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

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Severity::from_value(&value).map_err(de::Error::custom)
    }
}

/// A rule entry as written in one configuration layer.
///
/// `options` is `None` when the entry only names a severity. Merging such an
/// entry over an earlier one changes the severity and keeps the earlier options.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEntry {
    pub severity: Severity,
    pub options: Option<Vec<Value>>,
}

impl RuleEntry {
    pub fn level(severity: Severity) -> Self {
        Self {
            severity,
            options: None,
        }
    }

    pub fn with_options(severity: Severity, options: Vec<Value>) -> Self {
        Self {
            severity,
            options: Some(options),
        }
    }

    /// Accepts `"warn"`, `1`, `["error"]` or `["error", {...}, ...]`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Array(items) => {
                let (first, rest) = items.split_first().ok_or_else(|| {
                    ConfigError::InvalidRuleEntry("empty rule entry array".into())
                })?;
                let severity = Severity::from_value(first)?;
                Ok(Self::with_options(severity, rest.to_vec()))
            }
            other => Ok(Self::level(Severity::from_value(other)?)),
        }
    }
}

impl<'de> Deserialize<'de> for RuleEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RuleEntry::from_value(&value).map_err(de::Error::custom)
    }
}

/// Fully resolved setting of one rule for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSetting {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
}

impl RuleSetting {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            options: Vec::new(),
        }
    }

    /// Layer `entry` on top of this setting.
    pub fn apply(&mut self, entry: &RuleEntry) {
        self.severity = entry.severity;
        if let Some(ref options) = entry.options {
            self.options = options.clone();
        }
    }
}

impl From<&RuleEntry> for RuleSetting {
    fn from(entry: &RuleEntry) -> Self {
        Self {
            severity: entry.severity,
            options: entry.options.clone().unwrap_or_default(),
        }
    }
}

/// How a global symbol may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAccess {
    Readonly,
    Writable,
    /// Removes a global contributed by an environment or earlier layer.
    Off,
}

impl GlobalAccess {
    /// Accepts `readonly`/`readable`/`false`, `writable`/`writeable`/`true`, and `off`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Bool(true) => Ok(GlobalAccess::Writable),
            Value::Bool(false) => Ok(GlobalAccess::Readonly),
            Value::String(s) => match s.as_str() {
                "readonly" | "readable" => Ok(GlobalAccess::Readonly),
                "writable" | "writeable" => Ok(GlobalAccess::Writable),
                "off" => Ok(GlobalAccess::Off),
                _ => Err(ConfigError::InvalidGlobal(value.to_string())),
            },
            _ => Err(ConfigError::InvalidGlobal(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GlobalAccess::Readonly => "readonly",
            GlobalAccess::Writable => "writable",
            GlobalAccess::Off => "off",
        }
    }
}

impl Serialize for GlobalAccess {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GlobalAccess {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        GlobalAccess::from_value(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_from_strings_and_numbers() {
        assert_eq!(Severity::from_value(&json!("off")).unwrap(), Severity::Off);
        assert_eq!(Severity::from_value(&json!("WARN")).unwrap(), Severity::Warn);
        assert_eq!(Severity::from_value(&json!("error")).unwrap(), Severity::Error);
        assert_eq!(Severity::from_value(&json!(0)).unwrap(), Severity::Off);
        assert_eq!(Severity::from_value(&json!(2)).unwrap(), Severity::Error);
    }

    #[test]
    fn severity_rejects_unknown() {
        let err = Severity::from_value(&json!("fatal")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeverity(_)));
        assert!(Severity::from_value(&json!(3)).is_err());
        assert!(Severity::from_value(&json!(true)).is_err());
    }

    #[test]
    fn rule_entry_level_only() {
        let entry = RuleEntry::from_value(&json!("warn")).unwrap();
        assert_eq!(entry, RuleEntry::level(Severity::Warn));
    }

    #[test]
    fn rule_entry_with_options() {
        let entry =
            RuleEntry::from_value(&json!(["error", { "extensions": [".jsx", ".tsx"] }])).unwrap();
        assert_eq!(entry.severity, Severity::Error);
        assert_eq!(
            entry.options,
            Some(vec![json!({ "extensions": [".jsx", ".tsx"] })])
        );
    }

    #[test]
    fn rule_entry_single_element_array_has_empty_options() {
        let entry = RuleEntry::from_value(&json!(["error"])).unwrap();
        assert_eq!(entry.options, Some(Vec::new()));
    }

    #[test]
    fn rule_entry_empty_array_is_invalid() {
        let err = RuleEntry::from_value(&json!([])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRuleEntry(_)));
    }

    #[test]
    fn severity_only_entry_keeps_options() {
        let mut setting = RuleSetting::from(&RuleEntry::with_options(
            Severity::Error,
            vec![json!("always")],
        ));
        setting.apply(&RuleEntry::level(Severity::Warn));
        assert_eq!(setting.severity, Severity::Warn);
        assert_eq!(setting.options, vec![json!("always")]);

        setting.apply(&RuleEntry::with_options(Severity::Error, Vec::new()));
        assert!(setting.options.is_empty());
    }

    #[test]
    fn global_access_forms() {
        assert_eq!(
            GlobalAccess::from_value(&json!(true)).unwrap(),
            GlobalAccess::Writable
        );
        assert_eq!(
            GlobalAccess::from_value(&json!("readable")).unwrap(),
            GlobalAccess::Readonly
        );
        assert_eq!(
            GlobalAccess::from_value(&json!("off")).unwrap(),
            GlobalAccess::Off
        );
        assert!(GlobalAccess::from_value(&json!("sometimes")).is_err());
    }
}
