use clap::Parser;
use rulebook::cli::format;
use rulebook::cli::{self, Cli, Commands, LoadedPolicy, OutputFormat, PolicyArgs};
use rulebook::logging;
use rulebook::scan;
use std::path::Path;
use std::process;

fn load_or_exit(args: &PolicyArgs, cwd: &Path) -> LoadedPolicy {
    match cli::load_policy(args, cwd) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\x1b[31merror\x1b[0m: {}", e);
            process::exit(2);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("\x1b[31merror\x1b[0m: cannot read current directory: {}", e);
            process::exit(2);
        }
    };

    match cli.command {
        Commands::Resolve {
            files,
            policy,
            format: output_format,
        } => {
            let loaded = load_or_exit(&policy, &cwd);
            let resolved = scan::resolve_all(&loaded.policy, &cli::absolutize(&files, &cwd));

            match output_format {
                OutputFormat::Pretty => format::print_resolved_pretty(&resolved),
                OutputFormat::Json => format::print_resolved_json(&resolved),
            }
        }
        Commands::Check { policy } => {
            let loaded = load_or_exit(&policy, &cwd);
            format::print_check(&loaded.config_path, &loaded.policy);
        }
        Commands::Scan {
            paths,
            policy,
            format: output_format,
        } => {
            let loaded = load_or_exit(&policy, &cwd);
            let result = scan::run_scan(&loaded.policy, &cli::absolutize(&paths, &cwd));

            match output_format {
                OutputFormat::Pretty => format::print_scan_pretty(&result),
                OutputFormat::Json => format::print_scan_json(&result),
            }
        }
    }
}
