use crate::config::{GlobalAccess, RuleEntry, RuleSetting, Severity};
use crate::descriptor::{Descriptor, Layer};
use crate::error::ConfigError;
use crate::policy::catalog::{self, Catalog};
use crate::policy::environments;
use crate::policy::matcher::{self, IgnoreMatcher, PathMatcher};
use crate::policy::merge;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a compiled layer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    Preset(String),
    Local,
    Override { owner: String, index: usize },
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSource::Preset(name) => write!(f, "preset '{}'", name),
            LayerSource::Local => write!(f, "local"),
            LayerSource::Override { owner, index } => write!(f, "override #{} of {}", index, owner),
        }
    }
}

/// A layer body without `extends` or `overrides`, which compile flattens away.
#[derive(Debug, Clone)]
struct LayerBody {
    env: BTreeMap<String, bool>,
    globals: BTreeMap<String, GlobalAccess>,
    parser: Option<String>,
    parser_options: Map<String, Value>,
    plugins: Vec<String>,
    settings: Map<String, Value>,
    rules: BTreeMap<String, RuleEntry>,
}

impl From<&Layer> for LayerBody {
    fn from(layer: &Layer) -> Self {
        Self {
            env: layer.env.clone(),
            globals: layer.globals.clone(),
            parser: layer.parser.clone(),
            parser_options: layer.parser_options.clone(),
            plugins: layer
                .plugins
                .iter()
                .map(|p| catalog::normalize_plugin_name(p))
                .collect(),
            settings: layer.settings.clone(),
            rules: layer.rules.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledLayer {
    source: LayerSource,
    /// Indices into `CompiledPolicy::matchers`; all must match.
    conditions: Vec<usize>,
    body: LayerBody,
}

/// A descriptor with every preset located and every pattern compiled.
///
/// Layers are stored flat, in application order. Resolving a path folds the
/// layers whose conditions match it.
#[derive(Debug, Clone)]
pub struct CompiledPolicy {
    base_dir: PathBuf,
    ignore: IgnoreMatcher,
    matchers: Vec<PathMatcher>,
    layers: Vec<CompiledLayer>,
}

/// The effective policy for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPolicy {
    pub path: PathBuf,
    pub ignored: bool,
    pub rules: BTreeMap<String, RuleSetting>,
    pub env: BTreeMap<String, bool>,
    pub globals: BTreeMap<String, GlobalAccess>,
    pub parser: Option<String>,
    pub parser_options: Map<String, Value>,
    pub plugins: Vec<String>,
    pub settings: Map<String, Value>,
}

impl ResolvedPolicy {
    fn empty(path: PathBuf, ignored: bool) -> Self {
        Self {
            path,
            ignored,
            rules: BTreeMap::new(),
            env: BTreeMap::new(),
            globals: BTreeMap::new(),
            parser: None,
            parser_options: Map::new(),
            plugins: Vec::new(),
            settings: Map::new(),
        }
    }

    pub fn rule(&self, id: &str) -> Option<&RuleSetting> {
        self.rules.get(id)
    }

    pub fn severity(&self, id: &str) -> Option<Severity> {
        self.rules.get(id).map(|r| r.severity)
    }

    /// Number of rules at exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.rules.values().filter(|r| r.severity == severity).count()
    }

    fn apply(&mut self, body: &LayerBody, explicit_globals: &mut BTreeMap<String, GlobalAccess>) {
        for (name, enabled) in &body.env {
            self.env.insert(name.clone(), *enabled);
        }
        for (name, access) in &body.globals {
            explicit_globals.insert(name.clone(), *access);
        }
        if let Some(ref parser) = body.parser {
            self.parser = Some(parser.clone());
        }
        merge::deep_merge(&mut self.parser_options, &body.parser_options);
        merge::union_ordered(&mut self.plugins, &body.plugins);
        merge::deep_merge(&mut self.settings, &body.settings);
        for (id, entry) in &body.rules {
            self.rules
                .entry(id.clone())
                .and_modify(|setting| setting.apply(entry))
                .or_insert_with(|| RuleSetting::from(entry));
        }
    }

    /// Environment globals first, then explicit globals on top.
    fn settle_globals(&mut self, explicit: &BTreeMap<String, GlobalAccess>) {
        let mut globals = BTreeMap::new();
        for (name, _) in self.env.iter().filter(|(_, enabled)| **enabled) {
            for set in environments::globals(name).unwrap_or_default() {
                for (symbol, access) in set {
                    globals.insert((*symbol).to_string(), *access);
                }
            }
        }
        for (name, access) in explicit {
            match access {
                GlobalAccess::Off => {
                    globals.remove(name);
                }
                _ => {
                    globals.insert(name.clone(), *access);
                }
            }
        }
        self.globals = globals;
    }
}

struct Compiler<'a> {
    descriptor: &'a Descriptor,
    catalog: &'a Catalog,
    matchers: Vec<PathMatcher>,
    layers: Vec<CompiledLayer>,
    stack: Vec<String>,
}

impl<'a> Compiler<'a> {
    /// Inline presets shadow catalog presets.
    fn lookup(&self, name: &str) -> Result<(String, &'a Layer), ConfigError> {
        let key = catalog::normalize_preset_name(name);
        let inline = self
            .descriptor
            .presets
            .get(name)
            .or_else(|| self.descriptor.presets.get(&key));
        inline
            .or_else(|| self.catalog.preset(name))
            .map(|layer| (key, layer))
            .ok_or_else(|| ConfigError::MissingPreset(name.to_string()))
    }

    fn expand(
        &mut self,
        layer: &'a Layer,
        source: LayerSource,
        conditions: &[usize],
    ) -> Result<(), ConfigError> {
        for name in &layer.extends {
            let (key, preset) = self.lookup(name)?;
            if self.stack.contains(&key) {
                let mut cycle = self.stack.clone();
                cycle.push(key);
                return Err(ConfigError::PresetCycle(cycle));
            }
            self.stack.push(key.clone());
            self.expand(preset, LayerSource::Preset(key), conditions)?;
            self.stack.pop();
        }

        self.validate(layer, &source)?;
        self.layers.push(CompiledLayer {
            source: source.clone(),
            conditions: conditions.to_vec(),
            body: LayerBody::from(layer),
        });

        for (index, block) in layer.overrides.iter().enumerate() {
            self.matchers
                .push(PathMatcher::new(&block.files, &block.excluded_files)?);
            let mut nested = conditions.to_vec();
            nested.push(self.matchers.len() - 1);
            let owner = source.to_string();
            self.expand(&block.layer, LayerSource::Override { owner, index }, &nested)?;
        }
        Ok(())
    }

    fn validate(&self, layer: &Layer, source: &LayerSource) -> Result<(), ConfigError> {
        if let Some(key) = layer.unknown_keys(*source == LayerSource::Local).next() {
            return Err(ConfigError::UnknownKey {
                key: key.to_string(),
                layer: source.to_string(),
            });
        }
        if let Some(ref parser) = layer.parser {
            if !self.catalog.has_parser(parser) {
                return Err(ConfigError::MissingParser(parser.clone()));
            }
        }
        for plugin in &layer.plugins {
            if !self.catalog.has_plugin(plugin) {
                return Err(ConfigError::MissingPlugin(plugin.clone()));
            }
        }
        for env in layer.env.keys() {
            if !self.catalog.has_environment(env) {
                return Err(ConfigError::UnknownEnvironment(env.clone()));
            }
        }
        Ok(())
    }

    /// Enabled rules whose plugin is not declared by a layer covering at least
    /// the same files, as `(rule, plugin, source)`. Each rule is reported once.
    fn undeclared_plugins(&self) -> Vec<(String, String, &LayerSource)> {
        let mut reported = BTreeSet::new();
        let mut found = Vec::new();

        for layer in &self.layers {
            // Layers whose conditions are a subset of this one's apply wherever it does.
            let declared: BTreeSet<&str> = self
                .layers
                .iter()
                .filter(|d| d.conditions.iter().all(|c| layer.conditions.contains(c)))
                .flat_map(|d| d.body.plugins.iter().map(String::as_str))
                .collect();

            for (id, entry) in &layer.body.rules {
                if entry.severity == Severity::Off {
                    continue;
                }
                let Some(prefix) = catalog::plugin_prefix(id) else {
                    continue;
                };
                let plugin = catalog::normalize_plugin_name(prefix);
                if !declared.contains(plugin.as_str()) && reported.insert(id.clone()) {
                    found.push((id.clone(), plugin, &layer.source));
                }
            }
        }
        found
    }

    /// Undeclared plugins still compile, with a warning.
    fn warn_undeclared_plugins(&self) {
        for (rule, plugin, source) in self.undeclared_plugins() {
            tracing::warn!(
                rule = %rule,
                plugin = %plugin,
                source = %source,
                "rule is enabled but its plugin is not declared for the files it applies to"
            );
        }
    }
}

impl CompiledPolicy {
    /// Locate every preset, plugin, parser and environment the descriptor
    /// references and compile all patterns. Fails on the first missing reference.
    pub fn compile(descriptor: &Descriptor, catalog: &Catalog) -> Result<Self, ConfigError> {
        let mut compiler = Compiler {
            descriptor,
            catalog,
            matchers: Vec::new(),
            layers: Vec::new(),
            stack: Vec::new(),
        };
        compiler.expand(&descriptor.base, LayerSource::Local, &[])?;
        compiler.warn_undeclared_plugins();

        let ignore = IgnoreMatcher::new(&descriptor.ignore_patterns)?;
        let base_dir = if descriptor.base_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            descriptor.base_dir.clone()
        };

        tracing::debug!(
            layers = compiler.layers.len(),
            overrides = compiler.matchers.len(),
            ignore_patterns = ignore.len(),
            "compiled rule policy"
        );

        Ok(Self {
            base_dir,
            ignore,
            matchers: compiler.matchers,
            layers: compiler.layers,
        })
    }

    /// Compute the effective policy for `path`.
    ///
    /// Relative paths are relative to the descriptor's base directory. An
    /// ignored path yields an empty policy with `ignored` set.
    pub fn resolve(&self, path: &Path) -> ResolvedPolicy {
        let rel = matcher::relativize(path, &self.base_dir);
        if self.ignore.is_ignored(&rel, false) {
            tracing::debug!(path = %rel.display(), "path is ignored");
            return ResolvedPolicy::empty(rel, true);
        }

        let matched: Vec<bool> = self.matchers.iter().map(|m| m.matches(&rel)).collect();
        let mut resolved = ResolvedPolicy::empty(rel, false);
        let mut explicit_globals = BTreeMap::new();

        for layer in &self.layers {
            if !layer.conditions.iter().all(|&i| matched[i]) {
                continue;
            }
            tracing::trace!(path = %resolved.path.display(), source = %layer.source, "applying layer");
            resolved.apply(&layer.body, &mut explicit_globals);
        }
        resolved.settle_globals(&explicit_globals);
        resolved
    }

    /// Whether `path` (file or directory) is excluded by the ignore patterns.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.ignore
            .is_ignored(&matcher::relativize(path, &self.base_dir), is_dir)
    }

    /// An owned ignore check for callbacks that must be `'static`, such as a
    /// directory walker's entry filter. Copies only the ignore patterns.
    pub fn ignore_filter(&self) -> impl Fn(&Path, bool) -> bool + Send + Sync + 'static {
        let ignore = self.ignore.clone();
        let base_dir = self.base_dir.clone();
        move |path: &Path, is_dir: bool| ignore.is_ignored(&matcher::relativize(path, &base_dir), is_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Layer sources in application order, with whether each is path-scoped.
    pub fn layers(&self) -> impl Iterator<Item = (&LayerSource, bool)> {
        self.layers
            .iter()
            .map(|l| (&l.source, !l.conditions.is_empty()))
    }

    /// Presets in the order they are applied; a preset extended twice appears twice.
    pub fn presets(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter_map(|l| match l.source {
                LayerSource::Preset(ref name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn override_count(&self) -> usize {
        self.matchers.len()
    }

    pub fn ignore_pattern_count(&self) -> usize {
        self.ignore.len()
    }
}

/// Compile `descriptor` and resolve a single `path`.
pub fn resolve(
    path: &Path,
    descriptor: &Descriptor,
    catalog: &Catalog,
) -> Result<ResolvedPolicy, ConfigError> {
    Ok(CompiledPolicy::compile(descriptor, catalog)?.resolve(path))
}
