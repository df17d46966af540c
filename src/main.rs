//! Command-line front end for checking dialogue scripts.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{ArgAction, Parser, Subcommand};
use miette::{miette, IntoDiagnostic, Report, Result, WrapErr};
use tome::{check_source, graph::graph::DialogueGraph, CheckOutcome};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod diagnostic;

use diagnostic::{
    json_report, read_error_report, script_diagnostics, summary, MinSeverity, OutputFormat,
};

/// Static checker for branching dialogue scripts
#[derive(Debug, Parser)]
#[command(name = "tome")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v: info, -vv: debug, -vvv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lex, parse and analyze scripts, reporting every problem found
    Check {
        /// Script files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, env = "TOME_FORMAT", default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Hide analysis diagnostics below this severity
        #[arg(long, value_enum, env = "TOME_MIN_SEVERITY", default_value_t = MinSeverity::Suggestion)]
        min_severity: MinSeverity,
    },

    /// Print the node graph of a script as JSON
    Graph {
        /// Script file to export
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let all_valid = match cli.command {
        Command::Check {
            files,
            format,
            min_severity,
        } => check(&files, format, min_severity)?,
        Command::Graph { file } => {
            graph(&file)?;
            true
        }
    };

    if !all_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "tome=warn",
        1 => "tome=info",
        2 => "tome=debug",
        _ => "tome=trace",
    }
}

fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}

/// Checks each file in turn. Returns whether every file is valid.
fn check(files: &[PathBuf], format: OutputFormat, min_severity: MinSeverity) -> Result<bool> {
    let mut all_valid = true;

    for path in files {
        let name = path.display().to_string();
        let source = match read_script(path) {
            Ok(source) => source,
            Err(report) => {
                warn!(file = %name, "skipping unreadable file");
                all_valid = false;
                match format {
                    OutputFormat::Json => println!("{}", read_error_report(&name, &report)),
                    OutputFormat::Text => eprintln!("{:?}", report),
                }
                continue;
            }
        };

        let start = Instant::now();
        let outcome = check_source(&source);
        info!(file = %name, elapsed = ?start.elapsed(), valid = outcome.is_valid(), "checked");

        all_valid &= outcome.is_valid();

        match format {
            OutputFormat::Json => println!("{}", json_report(&name, &outcome, min_severity)),
            OutputFormat::Text => {
                for diagnostic in script_diagnostics(&outcome, min_severity, &name, &source) {
                    eprintln!("{:?}", Report::new(diagnostic));
                }
                println!("{}", summary(&name, &outcome));
            }
        }
    }

    debug!(files = files.len(), all_valid, "check finished");
    Ok(all_valid)
}

fn graph(path: &Path) -> Result<()> {
    let source = read_script(path)?;
    let name = path.display().to_string();

    let start = Instant::now();
    let outcome = check_source(&source);
    info!(file = %name, elapsed = ?start.elapsed(), "parsed for graph export");

    let CheckOutcome::Analyzed { program, .. } = &outcome else {
        for diagnostic in script_diagnostics(&outcome, MinSeverity::Error, &name, &source) {
            eprintln!("{:?}", Report::new(diagnostic));
        }
        return Err(miette!("{} could not be parsed", name));
    };

    let json = DialogueGraph::from_program(program)
        .to_json()
        .into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_arguments() {
        let cli = Cli::try_parse_from([
            "tome",
            "-vv",
            "check",
            "a.tome",
            "b.tome",
            "--format",
            "json",
            "--min-severity",
            "warning",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Check {
                files,
                format,
                min_severity,
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(min_severity, MinSeverity::Warning);
            }
            other => panic!("expected check, got {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_files() {
        assert!(Cli::try_parse_from(["tome", "check"]).is_err());
    }

    #[test]
    fn test_check_continues_past_unreadable_file() {
        let script = std::env::temp_dir().join("tome_check_continues.tome");
        fs::write(&script, "node start\n  goto :start\nend\n").unwrap();

        let files = [PathBuf::from("no/such/dir/missing.tome"), script.clone()];
        let all_valid = check(&files, OutputFormat::Json, MinSeverity::Error).unwrap();
        fs::remove_file(&script).unwrap();

        assert!(!all_valid);
    }

    #[test]
    fn test_check_valid_file() {
        let script = std::env::temp_dir().join("tome_check_valid.tome");
        fs::write(&script, "node start\n  goto :start\nend\n").unwrap();

        let all_valid = check(&[script.clone()], OutputFormat::Json, MinSeverity::Error).unwrap();
        fs::remove_file(&script).unwrap();

        assert!(all_valid);
    }

    #[test]
    fn test_directive_for_verbosity() {
        assert_eq!(directive_for_verbosity(0), "tome=warn");
        assert_eq!(directive_for_verbosity(1), "tome=info");
        assert_eq!(directive_for_verbosity(5), "tome=trace");
    }
}
