//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use unitboard_config::ConfigError;
use unitboard_core::{CoreError, ParseError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const PAYLOAD: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Source ───────────────────────────────────────────────────────
    #[error("Could not reach the sheet at {url}")]
    #[diagnostic(
        code(unitboard::source_unreachable),
        help(
            "Check the export URL and your network connection.\n\
             Reason: {reason}\n\
             Behind a proxy with a private CA? Set ca_cert in the profile or pass --insecure."
        )
    )]
    SourceUnreachable { url: String, reason: String },

    #[error("The sheet responded with HTTP {status}")]
    #[diagnostic(code(unitboard::source_status), help("{hint}"))]
    SourceStatus { status: u16, hint: String },

    #[error("Fetch timed out after {seconds}s")]
    #[diagnostic(
        code(unitboard::timeout),
        help("Increase it with --timeout or the profile's `timeout` setting.")
    )]
    Timeout { seconds: u64 },

    // ── Payload ──────────────────────────────────────────────────────
    #[error("The sheet returned an empty payload")]
    #[diagnostic(
        code(unitboard::empty_payload),
        help("Make sure the sheet has data and is published or shared for viewing.")
    )]
    EmptyPayload,

    #[error("Could not read the sheet: {source}")]
    #[diagnostic(code(unitboard::malformed_payload), help("{hint}"))]
    MalformedPayload {
        #[source]
        source: ParseError,
        hint: String,
    },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Unit '{unit_id}' not found")]
    #[diagnostic(
        code(unitboard::unit_not_found),
        help("Run `unitboard show` to list every unit in the sheet.")
    )]
    UnitNotFound { unit_id: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No sheet configured")]
    #[diagnostic(
        code(unitboard::no_source),
        help(
            "Create a profile with `unitboard config init --url <export-url>`\n\
             or pass --source <url-or-sheet-id>.\n\
             Config file: {path}"
        )
    )]
    NoSource { path: String },

    #[error("Profile '{name}' not found")]
    #[diagnostic(
        code(unitboard::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Profile '{name}' already exists")]
    #[diagnostic(
        code(unitboard::profile_exists),
        help("Pass --force to replace it.")
    )]
    ProfileExists { name: String },

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(unitboard::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(unitboard::config_error),
        help("Check the config file with `unitboard config show`.")
    )]
    Config { message: String },

    // ── Local ────────────────────────────────────────────────────────
    #[error("Failed to render output: {message}")]
    #[diagnostic(code(unitboard::render))]
    Render { message: String },

    #[error(transparent)]
    #[diagnostic(code(unitboard::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceUnreachable { .. } | Self::SourceStatus { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::EmptyPayload | Self::MalformedPayload { .. } => exit_code::PAYLOAD,
            Self::UnitNotFound { .. } => exit_code::NOT_FOUND,
            Self::NoSource { .. } | Self::ProfileNotFound { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::ProfileExists { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::Render { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SourceUnreachable { url, reason } => Self::SourceUnreachable { url, reason },
            CoreError::SourceStatus { status } => Self::SourceStatus {
                status,
                hint: status_hint(status).into(),
            },
            CoreError::EmptyPayload => Self::EmptyPayload,
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Parse(source) => {
                let hint = parse_hint(&source).into();
                Self::MalformedPayload { source, hint }
            }
            CoreError::Config { message } => Self::Config { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoSource { profile } => Self::Config {
                message: format!("profile '{profile}' has neither `url` nor `sheet_id`"),
            },
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

fn status_hint(status: u16) -> &'static str {
    match status {
        401 | 403 => {
            "The sheet is private. Publish it to the web, share it for viewing, \
             or configure an API key."
        }
        404 => "Check the spreadsheet id and worksheet name.",
        429 => "The source is rate limiting requests. Try a longer --interval.",
        s if s >= 500 => "The source is having trouble. The next refresh may succeed.",
        _ => "Check the export URL.",
    }
}

fn parse_hint(err: &ParseError) -> &'static str {
    match err {
        ParseError::MissingUnitColumn { .. } => {
            "The header needs a unit column (`Unit`, `Unit No`, ...). \
             Add aliases under [profiles.<name>.columns] if yours is named differently."
        }
        ParseError::Source { .. } => "The sheet service rejected the query. Check the sheet name.",
        ParseError::Empty => "The sheet has no rows.",
        ParseError::WrapperTooShort { .. } | ParseError::Json(_) | ParseError::MissingTable => {
            "The response is not a table export. Try --format csv with a CSV export URL."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::SourceUnreachable {
                    url: "https://x".into(),
                    reason: "dns".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::SourceStatus { status: 404 }, exit_code::CONNECTION),
            (CoreError::Timeout { timeout_secs: 15 }, exit_code::TIMEOUT),
            (CoreError::EmptyPayload, exit_code::PAYLOAD),
            (CoreError::Parse(ParseError::MissingTable), exit_code::PAYLOAD),
            (
                CoreError::Config {
                    message: "bad".into(),
                },
                exit_code::CONFIG,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn private_sheet_gets_sharing_hint() {
        let err = CliError::from(CoreError::SourceStatus { status: 403 });
        let CliError::SourceStatus { hint, .. } = err else {
            panic!("expected SourceStatus");
        };
        assert!(hint.contains("private"));
    }
}
