use std::fs;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

/// `(directory, forbidden needle)` pairs enforcing the core layering.
const LAYERING_RULES: &[(&str, &str)] = &[
    ("src/core", "crate::adapters"),
    ("src/core", "crate::application"),
    ("src/core", "tokio::"),
    ("src/application", "crate::adapters"),
];

#[derive(Parser)]
#[command(author, version, about = "Workspace maintenance tasks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run layering guardrails over the countdown crate.
    CheckArchitecture,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::CheckArchitecture => check_architecture(),
    }
}

fn check_architecture() -> Result<()> {
    let mut failures = Vec::new();
    for (dir, needle) in LAYERING_RULES {
        if let Err(err) = ensure_no_pattern(dir, needle) {
            failures.push(err.to_string());
        }
    }
    if failures.is_empty() {
        println!("layering ok ({} rules)", LAYERING_RULES.len());
        Ok(())
    } else {
        Err(anyhow!(failures.join("\n")))
    }
}

fn ensure_no_pattern(dir: &str, needle: &str) -> Result<()> {
    let mut offenders = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                offenders.push(format!("{dir} (walk error: {e})"));
                continue;
            }
        };
        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|ext| ext.to_str()) != Some("rs")
        {
            continue;
        }
        let content = fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        if content.contains(needle) {
            offenders.push(entry.path().display().to_string());
        }
    }

    if offenders.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "Forbidden reference to '{needle}' found in: {}",
            offenders.join(", ")
        ))
    }
}
