//! invoicedash - invoice analytics over extracted documents.

mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use invoicedash_client::ClientError;
use invoicedash_client::config::AppConfig;
use stdout_io::write_stdout_text;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ROOT_HELP: &str = "invoicedash - invoice analytics over extracted documents

Usage:
  invoicedash <command>

Start here:
  invoicedash ingest --help
  invoicedash db status
  invoicedash stats
";

const TOP_LEVEL_HELP: &str = "invoicedash - invoice analytics over extracted documents

USAGE: invoicedash <command>

Load your documents:
  1. invoicedash ingest --help                    Read the record shape and ingestion rules
  2. invoicedash ingest <path|->                  Load a JSON export (use - for stdin)
  3. invoicedash ingest list                      Review earlier runs

Dashboard:
  invoicedash stats                               Year-to-date spend, counts and averages
  invoicedash trends                              Invoice count and value per month
  invoicedash vendors top                         Top 10 vendors by spend
  invoicedash categories                          Spend per category
  invoicedash cash-outflow [--from D] [--to D]    Amounts due per payment date
  invoicedash invoices [--search S] [--page N]    Browse and filter invoices

Ask in plain language:
  invoicedash chat \"top vendors last quarter\"     Answer via the text-to-SQL service
  invoicedash chat \"...\" --stream                 Print answer frames as server-sent events

Other commands:
  invoicedash db status                           Row counts and a sample invoice
  invoicedash export csv <dir>                    Write one CSV per table
  invoicedash health                              Liveness check

Every dashboard command accepts --json and prints its contract verbatim.
Pass --verbose (or set RUST_LOG) to log progress to stderr.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    // Load .env file if present (before anything else)
    let dotenv = dotenvy::dotenv();

    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => return Err(handle_parse_error(&err, &raw_args)),
    };

    init_tracing(cli.verbose);
    if let Err(error) = dotenv
        && !error.not_found()
    {
        tracing::warn!(error = %error, "ignoring unreadable .env file");
    }

    let config = AppConfig::from_env();
    let mode = output::mode_for_command(&cli.command);
    match dispatch::dispatch(&cli, &config) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "invoicedash=info"
    } else {
        "invoicedash=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Help and version requests succeed; everything else is reported as an
/// `invalid_argument` failure in the requested output mode.
fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let text = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            if write_stdout_text(&text).is_err() {
                return ExitCode::from(2);
            }
            ExitCode::SUCCESS
        }
        ErrorKind::DisplayVersion => {
            if write_stdout_text(&err.to_string()).is_err() {
                return ExitCode::from(2);
            }
            ExitCode::SUCCESS
        }
        _ => {
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let command_hint = command_path_from_args(raw_args);
            let parse_error =
                ClientError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return ExitCode::from(2);
            }
            ExitCode::from(1)
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing Usage line and "For more information" hint so the
/// "What to do next" section is the only guidance printed.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let words = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect::<Vec<&str>>();

    let hint = match words.as_slice() {
        ["ingest", "list", ..] => "ingest list",
        ["ingest", ..] => "ingest",
        ["vendors", "top", ..] => "vendors top",
        ["vendors", ..] => "vendors",
        ["db", "status", ..] => "db status",
        ["db", ..] => "db",
        ["export", "csv", ..] => "export csv",
        ["export", ..] => "export",
        [
            command @ ("stats" | "trends" | "categories" | "cash-outflow" | "invoices" | "chat"
            | "health"),
            ..,
        ] => command,
        _ => return None,
    };
    Some(hint.to_string())
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if error.is_internal() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::{command_path_from_args, strip_clap_boilerplate};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn command_hint_follows_subcommand_words() {
        assert_eq!(
            command_path_from_args(&args(&["invoicedash", "ingest", "list", "--bogus"])),
            Some("ingest list".to_string())
        );
        assert_eq!(
            command_path_from_args(&args(&["invoicedash", "invoices", "--page", "0"])),
            Some("invoices".to_string())
        );
        assert_eq!(
            command_path_from_args(&args(&["invoicedash", "--json"])),
            None
        );
        assert_eq!(command_path_from_args(&args(&["invoicedash", "bogus"])), None);
    }

    #[test]
    fn clap_boilerplate_is_removed() {
        let message = "error: unexpected argument '--bogus' found\n\nUsage: invoicedash stats [OPTIONS]\n\nFor more information, try '--help'.\n";
        assert_eq!(
            strip_clap_boilerplate(message),
            "error: unexpected argument '--bogus' found"
        );
    }
}
