use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playforge_core::{
    find_secrets, FormatError, InspectionError, InspectionPolicy, SecretFinding,
};
use playforge_observability::{init_tracing, InspectionMetrics};
use playforge_review::ScriptReviewer;
use serde::Serialize;

const EXIT_BLOCKED: u8 = 1;
const EXIT_FORMAT_ERROR: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "playforge")]
#[command(about = "Classify automation requests and inspect generated playbooks")]
struct Cli {
    /// JSON inspection policy; defaults apply to any field it omits.
    #[arg(long, env = "PLAYFORGE_POLICY", global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the structured context for a free-text request.
    Classify {
        #[arg(required_unless_present = "stdin")]
        words: Vec<String>,
        #[arg(long)]
        stdin: bool,
    },
    /// Run secret detection and quality checks on a playbook (`-` for stdin).
    Inspect {
        path: PathBuf,
        #[arg(long)]
        strict: bool,
    },
    /// Only look for hardcoded secrets (`-` for stdin).
    Secrets { path: PathBuf },
}

#[derive(Debug, Serialize)]
struct FormatErrorOutput<'a> {
    error: &'static str,
    message: String,
    secrets: &'a [SecretFinding],
}

fn main() -> Result<ExitCode> {
    init_tracing("playforge_cli");
    let cli = Cli::parse();

    let mut policy = load_policy(cli.policy.as_deref())?;

    match cli.command {
        Command::Classify { words, stdin } => {
            let text = if stdin {
                read_input(Path::new("-"))?
            } else {
                words.join(" ")
            };

            let reviewer = ScriptReviewer::new(policy, InspectionMetrics::shared());
            print_json(&reviewer.classify(&text))?;
        }
        Command::Inspect { path, strict } => {
            policy.strict |= strict;
            let text = read_input(&path)?;
            let reviewer = ScriptReviewer::new(policy, InspectionMetrics::shared());

            match reviewer.review(&text) {
                Ok(report) => {
                    print_json(&report)?;
                    if report.blocked {
                        return Ok(ExitCode::from(EXIT_BLOCKED));
                    }
                }
                Err(err) => {
                    print_json(&format_error_output(&err))?;
                    return Ok(ExitCode::from(EXIT_FORMAT_ERROR));
                }
            }
        }
        Command::Secrets { path } => {
            let text = read_input(&path)?;
            let findings = find_secrets(&text);
            print_json(&findings)?;
            if !findings.is_empty() {
                return Ok(ExitCode::from(EXIT_BLOCKED));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_policy(path: Option<&Path>) -> Result<InspectionPolicy> {
    let Some(path) = path else {
        return Ok(InspectionPolicy::default());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading policy file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid policy file {}", path.display()))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed reading stdin")?;
        return Ok(buffer);
    }

    fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))
}

fn format_error_output(err: &InspectionError) -> FormatErrorOutput<'_> {
    let error = match err.format {
        FormatError::Syntax(_) => "syntax",
        FormatError::Structure(_) => "structure",
    };

    FormatErrorOutput {
        error,
        message: err.to_string(),
        secrets: &err.secrets,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
