use crate::config::Severity;
use crate::policy::{CompiledPolicy, ResolvedPolicy};
use crate::scan::ScanResult;
use serde_json::json;
use std::path::Path;

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warn => "\x1b[33mwarn \x1b[0m",
        Severity::Off => "\x1b[90moff  \x1b[0m",
    }
}

fn plural(n: usize, word: &str) -> String {
    format!("{} {}{}", n, word, if n == 1 { "" } else { "s" })
}

/// Print each resolved policy with ANSI colors.
pub fn print_resolved_pretty(policies: &[ResolvedPolicy]) {
    for (i, policy) in policies.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("\x1b[4m{}\x1b[0m", policy.path.display());

        if policy.ignored {
            println!("  \x1b[90mignored by ignore_patterns\x1b[0m");
            continue;
        }

        if let Some(ref parser) = policy.parser {
            println!("  \x1b[90mparser \x1b[0m {}", parser);
        }
        if !policy.plugins.is_empty() {
            println!("  \x1b[90mplugins\x1b[0m {}", policy.plugins.join(", "));
        }
        let envs: Vec<&str> = policy
            .env
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.as_str())
            .collect();
        if !envs.is_empty() {
            println!(
                "  \x1b[90menv    \x1b[0m {} \x1b[90m({})\x1b[0m",
                envs.join(", "),
                plural(policy.globals.len(), "global")
            );
        }

        for (id, setting) in &policy.rules {
            if setting.options.is_empty() {
                println!("  {} {}", severity_label(setting.severity), id);
            } else {
                let options: Vec<String> = setting.options.iter().map(|o| o.to_string()).collect();
                println!(
                    "  {} {:<40} \x1b[36m{}\x1b[0m",
                    severity_label(setting.severity),
                    id,
                    options.join(" ")
                );
            }
        }

        println!(
            "\x1b[1m  {}, {}, {}\x1b[0m",
            plural(policy.count(Severity::Error), "error rule"),
            plural(policy.count(Severity::Warn), "warning rule"),
            plural(policy.count(Severity::Off), "disabled rule"),
        );
    }
}

/// Print resolved policies as a JSON array.
pub fn print_resolved_json(policies: &[ResolvedPolicy]) {
    match serde_json::to_string_pretty(policies) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error = %e, "failed to serialize resolved policies"),
    }
}

/// Print a summary of a successfully compiled config.
pub fn print_check(config_path: &Path, policy: &CompiledPolicy) {
    println!("\x1b[32m✓\x1b[0m {} is valid", config_path.display());

    let presets = policy.presets();
    if presets.is_empty() {
        println!("  presets         none");
    } else {
        println!("  presets         {}", presets.join(" → "));
    }
    println!("  layers          {}", policy.layers().count());
    println!("  overrides       {}", policy.override_count());
    println!("  ignore patterns {}", policy.ignore_pattern_count());
    println!("  base dir        {}", policy.base_dir().display());
}

/// Print per-file rule counts grouped like the scan output.
pub fn print_scan_pretty(result: &ScanResult) {
    for file in &result.files {
        println!(
            "  {:<50} \x1b[31m{:>3}\x1b[0m \x1b[33m{:>3}\x1b[0m \x1b[90m{:>3}\x1b[0m",
            file.path.display(),
            file.errors,
            file.warnings,
            file.disabled
        );
    }

    println!();
    println!(
        "\x1b[1m{} resolved, {} ignored ({} loaded)\x1b[0m",
        plural(result.files.len(), "file"),
        result.files_ignored,
        plural(result.layers_loaded, "layer")
    );
}

/// Print scan results as structured JSON.
pub fn print_scan_json(result: &ScanResult) {
    let files: Vec<_> = result
        .files
        .iter()
        .map(|f| {
            json!({
                "path": f.path.display().to_string(),
                "errors": f.errors,
                "warnings": f.warnings,
                "disabled": f.disabled,
            })
        })
        .collect();

    let output = json!({
        "files": files,
        "summary": {
            "files_resolved": result.files.len(),
            "files_ignored": result.files_ignored,
            "layers_loaded": result.layers_loaded,
        },
    });

    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error = %e, "failed to serialize scan result"),
    }
}
