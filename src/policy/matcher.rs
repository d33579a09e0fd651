use crate::error::ConfigError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Component, Path, PathBuf};

/// File matcher for one override block.
///
/// Patterns containing `/` are matched against the whole relative path with
/// `*` not crossing directory separators. Patterns without `/` are matched
/// against the file name only, so `*.js` matches `src/a.js`.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    include: PatternSet,
    exclude: PatternSet,
}

impl PathMatcher {
    pub fn new(files: &[String], excluded_files: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: PatternSet::new(files)?,
            exclude: PatternSet::new(excluded_files)?,
        })
    }

    /// Paths outside the base directory never match.
    pub fn matches(&self, rel: &Path) -> bool {
        !is_outside(rel) && self.include.is_match(rel) && !self.exclude.is_match(rel)
    }
}

#[derive(Debug, Clone)]
struct PatternSet {
    full: GlobSet,
    basename: GlobSet,
}

impl PatternSet {
    fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut full = GlobSetBuilder::new();
        let mut basename = GlobSetBuilder::new();
        for pattern in patterns {
            let trimmed = pattern.trim_start_matches("./").trim_start_matches('/');
            let glob = GlobBuilder::new(trimmed)
                .literal_separator(true)
                .build()
                .map_err(|source| ConfigError::Glob {
                    pattern: pattern.clone(),
                    source,
                })?;
            if trimmed.contains('/') {
                full.add(glob);
            } else {
                basename.add(glob);
            }
        }

        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|source| ConfigError::Glob {
                pattern: patterns.join(", "),
                source,
            })
        };
        Ok(Self {
            full: build(full)?,
            basename: build(basename)?,
        })
    }

    fn is_match(&self, rel: &Path) -> bool {
        if self.full.is_match(rel) {
            return true;
        }
        match rel.file_name() {
            Some(name) => self.basename.is_match(Path::new(name)),
            None => false,
        }
    }
}

/// Gitignore-style matcher for `ignore_patterns`.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    gitignore: Gitignore,
}

impl IgnoreMatcher {
    /// Patterns are matched against paths already made relative by [`relativize`].
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GitignoreBuilder::new(".");
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|source| ConfigError::IgnorePattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }
        let gitignore = builder.build().map_err(|source| ConfigError::IgnorePattern {
            pattern: patterns.join(", "),
            source,
        })?;
        Ok(Self { gitignore })
    }

    /// `rel` must be relative; see [`relativize`]. Paths outside the base
    /// directory are never ignored.
    pub fn is_ignored(&self, rel: &Path, is_dir: bool) -> bool {
        if rel.as_os_str().is_empty() || is_outside(rel) {
            return false;
        }
        self.gitignore
            .matched_path_or_any_parents(rel, is_dir)
            .is_ignore()
    }

    pub fn len(&self) -> usize {
        self.gitignore.num_ignores() as usize + self.gitignore.num_whitelists() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.gitignore.is_empty()
    }
}

/// Express `path` relative to `base_dir`.
///
/// Relative paths are taken to be relative to `base_dir` already. Both paths
/// are normalized lexically; nothing touches the filesystem. A path outside
/// `base_dir` keeps its leading `..` components, see [`is_outside`]. An
/// absolute path under a relative `base_dir` cannot be related and keeps its
/// normal components.
pub fn relativize(path: &Path, base_dir: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base_dir);
    if !path.is_absolute() || !base.is_absolute() {
        return path
            .components()
            .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
            .collect();
    }

    let shared = path
        .components()
        .zip(base.components())
        .take_while(|(a, b)| a == b)
        .count();
    let mut rel: PathBuf = base.components().skip(shared).map(|_| Component::ParentDir).collect();
    rel.extend(path.components().skip(shared));
    rel
}

/// Whether a path produced by [`relativize`] points above the base directory.
pub fn is_outside(rel: &Path) -> bool {
    matches!(rel.components().next(), Some(Component::ParentDir))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn double_star_matches_any_depth() {
        let m = PathMatcher::new(&strings(&["**/*.js"]), &[]).unwrap();
        assert!(m.matches(Path::new("src/foo.js")));
        assert!(m.matches(Path::new("foo.js")));
        assert!(m.matches(Path::new("a/b/c/foo.js")));
        assert!(!m.matches(Path::new("src/foo.tsx")));
    }

    #[test]
    fn slashless_pattern_matches_basename() {
        let m = PathMatcher::new(&strings(&["*.test.ts"]), &[]).unwrap();
        assert!(m.matches(Path::new("src/deep/a.test.ts")));
        assert!(!m.matches(Path::new("src/deep/a.ts")));
    }

    #[test]
    fn slash_pattern_star_does_not_cross_directories() {
        let m = PathMatcher::new(&strings(&["src/*.ts"]), &[]).unwrap();
        assert!(m.matches(Path::new("src/a.ts")));
        assert!(!m.matches(Path::new("src/nested/a.ts")));
        let dotted = PathMatcher::new(&strings(&["./src/*.ts"]), &[]).unwrap();
        assert!(dotted.matches(Path::new("src/a.ts")));
    }

    #[test]
    fn excluded_files_win() {
        let m = PathMatcher::new(&strings(&["**/*.ts"]), &strings(&["fixtures/**"])).unwrap();
        assert!(m.matches(Path::new("src/a.ts")));
        assert!(!m.matches(Path::new("fixtures/a.ts")));
    }

    #[test]
    fn bad_glob_is_config_error() {
        let err = PathMatcher::new(&strings(&["src/[.ts"]), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Glob { .. }));
    }

    #[test]
    fn ignore_directory_names_at_any_depth() {
        let m = IgnoreMatcher::new(&strings(&["dist", "node_modules", "build"])).unwrap();
        assert!(m.is_ignored(Path::new("dist/main.js"), false));
        assert!(m.is_ignored(Path::new("packages/ui/node_modules/x/index.js"), false));
        assert!(m.is_ignored(Path::new("build"), true));
        assert!(!m.is_ignored(Path::new("src/build.ts"), false));
        assert!(!m.is_ignored(Path::new("src/main.ts"), false));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn ignore_negation() {
        let m = IgnoreMatcher::new(&strings(&["*.js", "!keep.js"])).unwrap();
        assert!(m.is_ignored(Path::new("a.js"), false));
        assert!(!m.is_ignored(Path::new("keep.js"), false));
    }

    #[test]
    fn relativize_paths() {
        let base = Path::new("/repo/app");
        assert_eq!(relativize(Path::new("/repo/app/src/a.ts"), base), PathBuf::from("src/a.ts"));
        assert_eq!(relativize(Path::new("./src/../lib/a.ts"), base), PathBuf::from("lib/a.ts"));
        assert_eq!(relativize(Path::new("/repo/app/./src/a.ts"), base), PathBuf::from("src/a.ts"));
        assert_eq!(relativize(Path::new("/repo/app"), base), PathBuf::new());
    }

    #[test]
    fn paths_outside_base_keep_parent_components() {
        let base = Path::new("/repo/app");
        let root_src = relativize(Path::new("/src/x.js"), base);
        let sibling_src = relativize(Path::new("/repo/app/../src/x.js"), base);
        assert_eq!(root_src, PathBuf::from("../../src/x.js"));
        assert_eq!(sibling_src, PathBuf::from("../src/x.js"));
        assert_eq!(relativize(Path::new("../src/x.js"), base), PathBuf::from("../src/x.js"));
        assert!(is_outside(&root_src));
        assert!(!is_outside(Path::new("src/x.js")));
    }

    #[test]
    fn outside_paths_never_match() {
        let m = PathMatcher::new(&strings(&["**/*.js"]), &[]).unwrap();
        assert!(!m.matches(Path::new("../src/x.js")));
        let ignore = IgnoreMatcher::new(&strings(&["src", "*.js"])).unwrap();
        assert!(!ignore.is_ignored(Path::new("../src/x.js"), false));
    }
}
