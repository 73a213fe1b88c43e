use std::path::PathBuf;

use automn_dsl::{DslError, ErrorKind};

/// Exit codes for the CLI process.
///
/// - 0: success
/// - 1: general error
/// - 2: invalid arguments / usage error
/// - 3: parse error in at least one input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    ParseError = 3,
}

/// Errors returned by CLI command handlers.
///
/// Each variant maps to an `ExitCode` and can produce structured
/// output in JSON mode.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A single file failed to parse; not yet reported to the user.
    #[error("{file}: {error}")]
    Parse {
        error: DslError,
        source_text: String,
        file: PathBuf,
    },

    /// Some files failed and their diagnostics were already printed.
    #[error("{failed} of {total} files failed to parse")]
    ParseFailures { failed: usize, total: usize },

    /// `fmt --check` found files that are not in canonical form.
    #[error("{count} files would be reformatted")]
    Unformatted { count: usize },

    /// IO errors (file not found, permission denied).
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Source file or directory not found.
    #[error("no schema files found in {path}")]
    NoSchemaFiles { path: PathBuf },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Maps this error to the appropriate exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Parse { .. } | Self::ParseFailures { .. } => ExitCode::ParseError,
            Self::Config { .. } | Self::NoSchemaFiles { .. } => ExitCode::InvalidArguments,
            Self::Unformatted { .. } | Self::Io { .. } | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Serializes this error as a JSON value for `--format json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Parse { error, file, .. } => serde_json::json!({
                "error": "parse_error",
                "file": file.display().to_string(),
                "errors": [dsl_error_json(error)],
            }),
            Self::ParseFailures { failed, total } => serde_json::json!({
                "error": "parse_error",
                "failed": failed,
                "files": total,
            }),
            Self::Unformatted { count } => serde_json::json!({
                "error": "unformatted",
                "files": count,
            }),
            Self::Io { path, source } => serde_json::json!({
                "error": "io_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            Self::Config { message } => serde_json::json!({
                "error": "config_error",
                "message": message,
            }),
            other => serde_json::json!({
                "error": "error",
                "message": other.to_string(),
            }),
        }
    }
}

/// JSON form of a single DSL error, shared by error output and the
/// `parse` summary.
pub fn dsl_error_json(error: &DslError) -> serde_json::Value {
    let location = error.location();
    let span = error.span();
    let expected: Vec<&str> = error.expected().iter().map(|t| t.description()).collect();
    let kind = match error.kind() {
        ErrorKind::Lexical => "lexical",
        ErrorKind::Syntax => "syntax",
    };
    serde_json::json!({
        "kind": kind,
        "message": error.to_string(),
        "line": location.line,
        "column": location.column,
        "span": { "start": span.start, "end": span.end },
        "expected": expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> DslError {
        automn_dsl::parse("User\n  name String String\n").unwrap_err()
    }

    #[test]
    fn parse_error_exit_code() {
        let err = CliError::Parse {
            error: parse_error(),
            source_text: "x".into(),
            file: PathBuf::from("test.automn"),
        };
        assert_eq!(err.exit_code(), ExitCode::ParseError);
        let err = CliError::ParseFailures { failed: 1, total: 2 };
        assert_eq!(err.exit_code(), ExitCode::ParseError);
    }

    #[test]
    fn config_error_exit_code() {
        let err = CliError::Config {
            message: "bad config".into(),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
    }

    #[test]
    fn no_schema_files_exit_code() {
        let err = CliError::NoSchemaFiles {
            path: PathBuf::from("schemas/"),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
    }

    #[test]
    fn unformatted_exit_code() {
        let err = CliError::Unformatted { count: 3 };
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
        assert!(err.to_string().contains("3 files"));
    }

    #[test]
    fn display_parse_error_names_file() {
        let err = CliError::Parse {
            error: parse_error(),
            source_text: String::new(),
            file: PathBuf::from("test.automn"),
        };
        let text = err.to_string();
        assert!(text.starts_with("test.automn: "));
        assert!(text.contains("2:"));
    }

    #[test]
    fn to_json_parse_error() {
        let err = CliError::Parse {
            error: parse_error(),
            source_text: "x".into(),
            file: PathBuf::from("test.automn"),
        };
        let json = err.to_json();
        assert_eq!(json["error"], "parse_error");
        assert_eq!(json["file"], "test.automn");
        assert_eq!(json["errors"][0]["kind"], "syntax");
        assert_eq!(json["errors"][0]["line"], 2);
        assert!(json["errors"][0]["expected"].is_array());
    }

    #[test]
    fn dsl_error_json_for_lexical_error() {
        let error = automn_dsl::parse("User $").unwrap_err();
        let json = dsl_error_json(&error);
        assert_eq!(json["kind"], "lexical");
        assert_eq!(json["column"], 6);
        assert_eq!(json["span"]["start"], 5);
        assert_eq!(json["expected"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn to_json_io_error() {
        let err = CliError::Io {
            path: PathBuf::from("/tmp/file"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let json = err.to_json();
        assert_eq!(json["error"], "io_error");
        assert_eq!(json["path"], "/tmp/file");
    }

    #[test]
    fn to_json_other_error() {
        let err = CliError::Other("unexpected".into());
        let json = err.to_json();
        assert_eq!(json["error"], "error");
        assert!(json["message"].as_str().unwrap().contains("unexpected"));
    }

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::GeneralError as i32, 1);
        assert_eq!(ExitCode::InvalidArguments as i32, 2);
        assert_eq!(ExitCode::ParseError as i32, 3);
    }
}
