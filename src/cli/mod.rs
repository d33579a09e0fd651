pub mod format;

use crate::descriptor::{self, Descriptor};
use crate::error::ConfigError;
use crate::policy::{Catalog, CompiledPolicy};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "rulebook", version, about = "Resolve layered lint rule policies per file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective rule policy for each file
    Resolve {
        /// Files to resolve
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Validate the config: every preset, plugin, parser and environment must exist
    Check {
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Walk paths and summarize the policy of every non-ignored file
    Scan {
        /// Files or directories to scan
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Path to the config file (default: discovered from the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Extra directory of preset files; may be repeated
    #[arg(long = "preset-dir")]
    pub preset_dirs: Vec<PathBuf>,

    /// Register an extra plugin name; may be repeated
    #[arg(long = "plugin")]
    pub plugins: Vec<String>,

    /// Register an extra parser name; may be repeated
    #[arg(long = "parser")]
    pub parsers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// A compiled policy and the config file it came from.
#[derive(Debug)]
pub struct LoadedPolicy {
    pub config_path: PathBuf,
    pub policy: CompiledPolicy,
}

/// Locate, load and compile the config described by `args`.
///
/// The descriptor's base directory is made absolute against `cwd` so that
/// file arguments given relative to `cwd` resolve correctly.
pub fn load_policy(args: &PolicyArgs, cwd: &Path) -> Result<LoadedPolicy, ConfigError> {
    let config_path = match args.config {
        Some(ref path) => path.clone(),
        None => descriptor::find_config(cwd)?,
    };

    let loaded = descriptor::load_descriptor(&config_path)?;
    let base_dir = cwd.join(&loaded.base_dir);
    let descriptor: Descriptor = loaded.with_base_dir(base_dir);

    let mut catalog = Catalog::for_descriptor(&descriptor)?;
    for dir in &args.preset_dirs {
        catalog = catalog.with_preset_dir(&cwd.join(dir))?;
    }
    for plugin in &args.plugins {
        catalog = catalog.with_plugin(plugin);
    }
    for parser in &args.parsers {
        catalog = catalog.with_parser(parser);
    }

    let policy = CompiledPolicy::compile(&descriptor, &catalog)?;
    Ok(LoadedPolicy {
        config_path,
        policy,
    })
}

/// Make CLI path arguments absolute against `cwd`.
pub fn absolutize(paths: &[PathBuf], cwd: &Path) -> Vec<PathBuf> {
    paths.iter().map(|p| cwd.join(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Severity;
    use std::fs;

    #[test]
    fn parse_resolve_command() {
        let cli = Cli::try_parse_from([
            "rulebook",
            "resolve",
            "src/a.ts",
            "src/b.js",
            "--config",
            "rulebook.toml",
            "--preset-dir",
            "presets",
            "--plugin",
            "vue",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Resolve {
                files,
                policy,
                format,
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(policy.config, Some(PathBuf::from("rulebook.toml")));
                assert_eq!(policy.preset_dirs, vec![PathBuf::from("presets")]);
                assert_eq!(policy.plugins, vec!["vue"]);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn resolve_requires_files() {
        assert!(Cli::try_parse_from(["rulebook", "resolve"]).is_err());
    }

    #[test]
    fn scan_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["rulebook", "scan", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Scan { paths, format, .. } => {
                assert_eq!(paths, vec![PathBuf::from(".")]);
                assert_eq!(format, OutputFormat::Pretty);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn load_policy_discovers_config_and_registers_plugins() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("shared")).unwrap();
        fs::write(
            root.join("rulebook.toml"),
            "extends = [\"team\"]\nplugins = [\"vue\"]\n",
        )
        .unwrap();
        fs::write(root.join("shared/team.toml"), "[rules]\neqeqeq = \"error\"\n").unwrap();

        let args = PolicyArgs {
            preset_dirs: vec![PathBuf::from("shared")],
            plugins: vec!["vue".into()],
            ..Default::default()
        };
        let loaded = load_policy(&args, &root.join("src")).unwrap_err();
        // preset dir is relative to cwd, which is src/ here
        assert!(matches!(loaded, ConfigError::Read { .. }));

        let loaded = load_policy(&args, root).unwrap();
        assert_eq!(loaded.config_path, root.join("rulebook.toml"));
        let resolved = loaded.policy.resolve(&root.join("src/a.ts"));
        assert_eq!(resolved.severity("eqeqeq"), Some(Severity::Error));
        assert_eq!(resolved.plugins, vec!["vue"]);
    }

    #[test]
    fn load_policy_reports_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = PolicyArgs {
            config: Some(dir.path().join("nope.toml")),
            ..Default::default()
        };
        assert!(matches!(
            load_policy(&args, dir.path()),
            Err(ConfigError::Read { .. })
        ));
    }
}
