//! The on-disk rule policy descriptor and its loaders.
//!
//! TOML files use snake_case keys. JSON files follow the eslintrc layout, so
//! the camelCase spellings (`parserOptions`, `ignorePatterns`, `excludedFiles`)
//! are accepted as aliases.

use crate::config::{GlobalAccess, RuleEntry};
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched by [`find_config`], in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["rulebook.toml", ".rulebook.toml", ".rulebookrc.json"];

/// One configuration body: the descriptor root, a preset, or an override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Layer {
    /// Presets folded in before this layer, in order.
    #[serde(deserialize_with = "one_or_many")]
    pub extends: Vec<String>,
    pub env: BTreeMap<String, bool>,
    pub globals: BTreeMap<String, GlobalAccess>,
    pub parser: Option<String>,
    #[serde(alias = "parserOptions")]
    pub parser_options: Map<String, Value>,
    pub plugins: Vec<String>,
    pub settings: Map<String, Value>,
    pub rules: BTreeMap<String, RuleEntry>,
    pub overrides: Vec<Override>,
    /// Keys no other field claimed. Compiling a layer with any is an error.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl Layer {
    /// Unrecognized keys, minus `root`, which eslintrc files carry at the top level.
    pub fn unknown_keys(&self, top_level: bool) -> impl Iterator<Item = &str> {
        self.unknown
            .keys()
            .map(String::as_str)
            .filter(move |key| !(top_level && *key == "root"))
    }
}

/// A layer applied only to files matching `files` and not `excluded_files`.
#[derive(Debug, Clone, Deserialize)]
pub struct Override {
    #[serde(deserialize_with = "one_or_many")]
    pub files: Vec<String>,
    #[serde(default, alias = "excludedFiles", deserialize_with = "one_or_many")]
    pub excluded_files: Vec<String>,
    #[serde(flatten)]
    pub layer: Layer,
}

/// Top-level rule policy descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Descriptor {
    #[serde(flatten)]
    pub base: Layer,
    /// Gitignore-style patterns excluded from all evaluation.
    #[serde(default, alias = "ignorePatterns", deserialize_with = "one_or_many")]
    pub ignore_patterns: Vec<String>,
    /// Presets defined inline; these shadow catalog presets of the same name.
    #[serde(default)]
    pub presets: BTreeMap<String, Layer>,
    /// Extra preset directories, relative to `base_dir`.
    #[serde(default, alias = "presetDirs")]
    pub preset_dirs: Vec<PathBuf>,
    /// Directory that relative file paths and patterns are matched against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Descriptor {
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// Load a descriptor. `base_dir` is set to the directory holding the file.
pub fn load_descriptor(path: &Path) -> Result<Descriptor, ConfigError> {
    let descriptor: Descriptor = read_document(path)?;
    let base_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(descriptor.with_base_dir(base_dir))
}

/// Load a single preset layer from a TOML or JSON file.
pub fn load_layer(path: &Path) -> Result<Layer, ConfigError> {
    read_document(path)
}

/// Parse a descriptor from TOML text.
pub fn parse_toml(text: &str) -> Result<Descriptor, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        message: e.to_string(),
    })
}

/// Parse a descriptor from eslintrc-style JSON text.
pub fn parse_json(text: &str) -> Result<Descriptor, ConfigError> {
    serde_json::from_str(text).map_err(|e| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        message: e.to_string(),
    })
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        toml::from_str(&text).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Walk up from `start` and return the first config file found.
pub fn find_config(start: &Path) -> Result<PathBuf, ConfigError> {
    for dir in start.ancestors() {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                tracing::debug!(config = %candidate.display(), "discovered config");
                return Ok(candidate);
            }
        }
    }
    Err(ConfigError::NotFound(start.to_path_buf()))
}
