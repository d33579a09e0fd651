use std::path::PathBuf;
use thiserror::Error;

/// Any reason a rule policy cannot be loaded or compiled.
///
/// All variants are fatal: an incomplete rule set is never applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("preset '{0}' could not be found")]
    MissingPreset(String),
    #[error("plugin '{0}' could not be found")]
    MissingPlugin(String),
    #[error("parser '{0}' could not be found")]
    MissingParser(String),
    #[error("environment '{0}' is unknown")]
    UnknownEnvironment(String),
    #[error("unknown key '{key}' in {layer}")]
    UnknownKey { key: String, layer: String },
    #[error("preset cycle: {}", .0.join(" -> "))]
    PresetCycle(Vec<String>),
    #[error("invalid severity {0}: expected \"off\", \"warn\", \"error\", 0, 1 or 2")]
    InvalidSeverity(String),
    #[error("invalid rule entry: {0}")]
    InvalidRuleEntry(String),
    #[error("invalid global access {0}: expected \"readonly\", \"writable\" or \"off\"")]
    InvalidGlobal(String),
    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("invalid ignore pattern '{pattern}': {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("no rulebook config found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),
}
