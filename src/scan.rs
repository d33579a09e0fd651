use crate::config::Severity;
use crate::policy::{CompiledPolicy, ResolvedPolicy};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::PathBuf;

/// Rule counts for one resolved file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub errors: usize,
    pub warnings: usize,
    pub disabled: usize,
}

impl From<&ResolvedPolicy> for FileSummary {
    fn from(policy: &ResolvedPolicy) -> Self {
        Self {
            path: policy.path.clone(),
            errors: policy.count(Severity::Error),
            warnings: policy.count(Severity::Warn),
            disabled: policy.count(Severity::Off),
        }
    }
}

pub struct ScanResult {
    pub files: Vec<FileSummary>,
    /// Files named directly or found while walking that resolved as ignored.
    pub files_ignored: usize,
    pub layers_loaded: usize,
}

/// Walk `target_paths`, skip ignored directories without descending into
/// them, and resolve every remaining file in parallel.
pub fn run_scan(policy: &CompiledPolicy, target_paths: &[PathBuf]) -> ScanResult {
    let mut files: Vec<PathBuf> = Vec::new();

    for target in target_paths {
        if target.is_file() {
            files.push(target.clone());
            continue;
        }

        let is_ignored = policy.ignore_filter();
        let walker = WalkBuilder::new(target)
            .standard_filters(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                // Never prune the walk root itself.
                entry.depth() == 0 || !is_ignored(entry.path(), is_dir)
            })
            .build();

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "skipping unreadable path"),
            }
        }
    }

    files.sort();
    files.dedup();
    tracing::debug!(files = files.len(), "resolving files");

    let resolved: Vec<ResolvedPolicy> = files.par_iter().map(|p| policy.resolve(p)).collect();
    let files_ignored = resolved.iter().filter(|r| r.ignored).count();

    ScanResult {
        files: resolved
            .iter()
            .filter(|r| !r.ignored)
            .map(FileSummary::from)
            .collect(),
        files_ignored,
        layers_loaded: policy.layers().count(),
    }
}

/// Resolve each path; used by `rulebook resolve`.
pub fn resolve_all(policy: &CompiledPolicy, paths: &[PathBuf]) -> Vec<ResolvedPolicy> {
    paths.par_iter().map(|p| policy.resolve(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::parse_toml;
    use crate::policy::Catalog;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export {};\n").unwrap();
    }

    #[test]
    fn scan_skips_ignored_directories_and_resolves_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/app.tsx");
        write(root, "src/util.js");
        write(root, "dist/bundle.js");
        write(root, "node_modules/react/index.js");

        let descriptor = parse_toml(
            r#"
ignore_patterns = ["dist", "node_modules"]
[rules]
"no-console" = "warn"
"no-var" = "error"
[[overrides]]
files = ["*.js"]
rules = { "no-var" = "off" }
"#,
        )
        .unwrap()
        .with_base_dir(root);
        let policy = CompiledPolicy::compile(&descriptor, &Catalog::empty()).unwrap();

        let result = run_scan(&policy, &[root.to_path_buf()]);
        let paths: Vec<_> = result.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("src/app.tsx"), PathBuf::from("src/util.js")]
        );
        assert_eq!(result.files_ignored, 0);
        assert_eq!(result.layers_loaded, 2);

        let tsx = &result.files[0];
        assert_eq!((tsx.errors, tsx.warnings, tsx.disabled), (1, 1, 0));
        let js = &result.files[1];
        assert_eq!((js.errors, js.warnings, js.disabled), (0, 1, 1));
    }

    #[test]
    fn explicitly_named_ignored_file_is_counted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "dist/bundle.js");

        let descriptor = parse_toml("ignore_patterns = [\"dist\"]\n")
            .unwrap()
            .with_base_dir(root);
        let policy = CompiledPolicy::compile(&descriptor, &Catalog::empty()).unwrap();

        let result = run_scan(&policy, &[root.join("dist/bundle.js")]);
        assert!(result.files.is_empty());
        assert_eq!(result.files_ignored, 1);
    }

    #[test]
    fn resolve_all_keeps_input_order() {
        let descriptor = parse_toml("[rules]\nsemi = \"error\"\n").unwrap();
        let policy = CompiledPolicy::compile(&descriptor, &Catalog::empty()).unwrap();
        let out = resolve_all(&policy, &[PathBuf::from("b.js"), PathBuf::from("a.js")]);
        assert_eq!(out[0].path, PathBuf::from("b.js"));
        assert_eq!(out[1].path, PathBuf::from("a.js"));
    }
}
