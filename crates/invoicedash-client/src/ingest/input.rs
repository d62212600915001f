use std::fs;
use std::io::{IsTerminal, Read};

use crate::error::INGEST_HELP_COMMAND;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub(crate) source_kind: SourceKind,
    pub(crate) source_ref: Option<String>,
    pub(crate) content: String,
}

/// Picks the ingestion source. `-` reads stdin; a path reads that file and
/// refuses to silently ignore piped input.
pub(crate) fn resolve_source(
    path: Option<String>,
    stdin_override: Option<String>,
) -> ClientResult<ResolvedSource> {
    let stdin_body = read_stdin(stdin_override)?;

    match path.as_deref() {
        Some("-") | None => match stdin_body {
            Some(content) => Ok(ResolvedSource {
                source_kind: SourceKind::Stdin,
                source_ref: None,
                content,
            }),
            None if path.is_some() => Err(invalid_source_error(
                "Path `-` means stdin input, but stdin was empty. Pipe a JSON array or pass a file path.",
            )),
            None => Err(invalid_source_error(
                "No ingestion source provided. Pass a file path or pipe input via stdin.",
            )),
        },
        Some(path_value) => {
            if stdin_body.is_some() {
                return Err(invalid_source_error(
                    "Both stdin and file input were provided. Pass exactly one source: either a file path or piped stdin.",
                ));
            }

            let content = fs::read_to_string(path_value).map_err(|error| {
                ClientError::invalid_argument_with_recovery(
                    &format!("Could not read ingestion file `{path_value}`: {error}"),
                    vec![
                        "Verify the path exists and is readable.".to_string(),
                        "Rerun invoicedash ingest <path>.".to_string(),
                    ],
                )
            })?;

            Ok(ResolvedSource {
                source_kind: SourceKind::File,
                source_ref: Some(path_value.to_string()),
                content,
            })
        }
    }
}

fn invalid_source_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![format!("Run `{INGEST_HELP_COMMAND}` for usage.")],
    )
}

fn read_stdin(stdin_override: Option<String>) -> ClientResult<Option<String>> {
    if let Some(value) = stdin_override {
        return Ok(Some(value).filter(|body| !body.trim().is_empty()));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read stdin: {error}"),
                vec![
                    "Retry with an explicit file path argument.".to_string(),
                    "Or rerun with valid stdin content.".to_string(),
                ],
            )
        })?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(buffer))
}
