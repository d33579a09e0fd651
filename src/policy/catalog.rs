use crate::config::{RuleEntry, Severity};
use crate::descriptor::{self, Descriptor, Layer};
use crate::error::ConfigError;
use crate::policy::environments;
use ignore::WalkBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const BUILTIN_PLUGINS: &[&str] = &[
    "react",
    "react-hooks",
    "@typescript-eslint",
    "prettier",
    "import",
    "jsx-a11y",
];

const BUILTIN_PARSERS: &[&str] = &["espree", "@typescript-eslint/parser", "@babel/eslint-parser"];

/// Core rules that conflict with an external formatter.
const FORMATTING_RULES: &[&str] = &[
    "array-bracket-spacing",
    "arrow-parens",
    "brace-style",
    "comma-dangle",
    "comma-spacing",
    "eol-last",
    "function-paren-newline",
    "implicit-arrow-linebreak",
    "indent",
    "jsx-quotes",
    "key-spacing",
    "keyword-spacing",
    "max-len",
    "no-mixed-spaces-and-tabs",
    "no-multi-spaces",
    "no-trailing-spaces",
    "object-curly-newline",
    "object-curly-spacing",
    "operator-linebreak",
    "quotes",
    "semi",
    "space-before-function-paren",
    "@typescript-eslint/comma-dangle",
    "@typescript-eslint/indent",
    "@typescript-eslint/quotes",
    "@typescript-eslint/semi",
    "react/jsx-closing-bracket-location",
    "react/jsx-curly-newline",
    "react/jsx-indent",
    "react/jsx-indent-props",
    "react/jsx-one-expression-per-line",
    "react/jsx-wrap-multilines",
];

const RECOMMENDED_RULES: &[&str] = &[
    "constructor-super",
    "for-direction",
    "getter-return",
    "no-async-promise-executor",
    "no-class-assign",
    "no-compare-neg-zero",
    "no-cond-assign",
    "no-const-assign",
    "no-debugger",
    "no-dupe-args",
    "no-dupe-keys",
    "no-duplicate-case",
    "no-empty",
    "no-func-assign",
    "no-redeclare",
    "no-self-assign",
    "no-undef",
    "no-unreachable",
    "no-unsafe-finally",
    "no-unused-vars",
    "use-isnan",
    "valid-typeof",
];

/// Everything the resolver can look up by name.
#[derive(Debug, Clone)]
pub struct Catalog {
    presets: BTreeMap<String, Layer>,
    plugins: BTreeSet<String>,
    parsers: BTreeSet<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// A catalog with no presets, plugins or parsers.
    pub fn empty() -> Self {
        Self {
            presets: BTreeMap::new(),
            plugins: BTreeSet::new(),
            parsers: BTreeSet::new(),
        }
    }

    /// Built-in plugins, parsers, and the `recommended` and `prettier` presets.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for plugin in BUILTIN_PLUGINS {
            catalog.plugins.insert((*plugin).to_string());
        }
        for parser in BUILTIN_PARSERS {
            catalog.parsers.insert((*parser).to_string());
        }
        catalog
            .presets
            .insert("recommended".into(), rule_preset(RECOMMENDED_RULES, Severity::Error));
        catalog
            .presets
            .insert("prettier".into(), rule_preset(FORMATTING_RULES, Severity::Off));
        catalog
    }

    /// Built-in catalog plus the preset directories named by `descriptor`.
    pub fn for_descriptor(descriptor: &Descriptor) -> Result<Self, ConfigError> {
        let mut catalog = Self::builtin();
        for dir in &descriptor.preset_dirs {
            catalog = catalog.with_preset_dir(&descriptor.base_dir.join(dir))?;
        }
        Ok(catalog)
    }

    pub fn with_preset(mut self, name: &str, layer: Layer) -> Self {
        self.presets.insert(normalize_preset_name(name), layer);
        self
    }

    pub fn with_plugin(mut self, name: &str) -> Self {
        self.plugins.insert(normalize_plugin_name(name));
        self
    }

    pub fn with_parser(mut self, name: &str) -> Self {
        self.parsers.insert(name.to_string());
        self
    }

    /// Load every `*.toml` and `*.json` file under `dir` as a preset.
    ///
    /// The preset name is the path relative to `dir` without its extension,
    /// so `dir/airbnb/hooks.toml` becomes `airbnb/hooks`.
    pub fn with_preset_dir(mut self, dir: &Path) -> Result<Self, ConfigError> {
        let walker = WalkBuilder::new(dir).standard_filters(false).build();
        for entry in walker {
            let entry = entry.map_err(|e| ConfigError::Read {
                path: dir.to_path_buf(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("preset directory walk failed")),
            })?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let is_preset = path
                .extension()
                .is_some_and(|ext| ext == "toml" || ext == "json");
            if !is_preset {
                continue;
            }

            let rel = path.strip_prefix(dir).unwrap_or(path).with_extension("");
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let layer = descriptor::load_layer(path)?;
            tracing::debug!(preset = %name, file = %path.display(), "loaded preset");
            self.presets.insert(normalize_preset_name(&name), layer);
        }
        Ok(self)
    }

    pub fn preset(&self, name: &str) -> Option<&Layer> {
        self.presets.get(&normalize_preset_name(name))
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains(&normalize_plugin_name(name))
    }

    pub fn has_parser(&self, name: &str) -> bool {
        self.parsers.contains(name)
    }

    pub fn has_environment(&self, name: &str) -> bool {
        environments::is_known(name)
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

fn rule_preset(rules: &[&str], severity: Severity) -> Layer {
    Layer {
        rules: rules
            .iter()
            .map(|id| ((*id).to_string(), RuleEntry::level(severity)))
            .collect(),
        ..Default::default()
    }
}

/// `eslint-plugin-foo` -> `foo`, `@scope/eslint-plugin` -> `@scope`,
/// `@scope/eslint-plugin-foo` -> `@scope/foo`.
pub fn normalize_plugin_name(name: &str) -> String {
    strip_package_prefix(name, "eslint-plugin")
}

/// `eslint-config-foo` -> `foo`, `@scope/eslint-config` -> `@scope`.
pub fn normalize_preset_name(name: &str) -> String {
    strip_package_prefix(name, "eslint-config")
}

fn strip_package_prefix(name: &str, prefix: &str) -> String {
    if let Some(scoped) = name.strip_prefix('@') {
        let (scope, rest) = match scoped.split_once('/') {
            Some(parts) => parts,
            None => return name.to_string(),
        };
        if rest == prefix {
            return format!("@{}", scope);
        }
        let dashed = format!("{}-", prefix);
        if let Some(short) = rest.strip_prefix(&dashed) {
            return format!("@{}/{}", scope, short);
        }
        return name.to_string();
    }

    let dashed = format!("{}-", prefix);
    name.strip_prefix(&dashed).unwrap_or(name).to_string()
}

/// The plugin a rule id belongs to, if any.
///
/// `react/prop-types` -> `react`, `@typescript-eslint/no-explicit-any` ->
/// `@typescript-eslint`, `@scope/name/rule` -> `@scope/name`.
pub fn plugin_prefix(rule_id: &str) -> Option<&str> {
    if rule_id.starts_with('@') {
        rule_id.rsplit_once('/').map(|(plugin, _)| plugin)
    } else {
        rule_id.split_once('/').map(|(plugin, _)| plugin)
    }
}
