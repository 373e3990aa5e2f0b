use std::{fmt, path::PathBuf, time::Duration};

use serde_json::Number;
use thiserror::Error;

const MAX_BODY_CHARS: usize = 200;

/// Shortens a response body for messages, on a char boundary.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_BODY_CHARS {
        format!("{}...", body.chars().take(MAX_BODY_CHARS).collect::<String>())
    } else {
        body.to_string()
    }
}

/// The error taxonomy a single invocation can end in.
///
/// Each kind maps to its own process exit code so scripts can tell a bad
/// credential from an unknown city without parsing stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MockFile,
    Auth,
    NotFound,
    Network,
    Service,
    MalformedData,
    CacheWrite,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MockFile => "MockFileError",
            ErrorKind::Auth => "AuthError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Network => "NetworkError",
            ErrorKind::Service => "ServiceError",
            ErrorKind::MalformedData => "MalformedDataError",
            ErrorKind::CacheWrite => "CacheWriteError",
        }
    }

    /// Exit codes start at 3: 1 is startup/config, 2 is clap's usage error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::MockFile => 3,
            ErrorKind::Auth => 4,
            ErrorKind::NotFound => 5,
            ErrorKind::Network => 6,
            ErrorKind::Service => 7,
            ErrorKind::MalformedData => 8,
            ErrorKind::CacheWrite => 9,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What exactly is wrong with a payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    WrongType { expected: &'static str },
    Empty,
    OutOfRange { value: Number, min: i64, max: i64 },
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing => f.write_str("missing"),
            FieldProblem::WrongType { expected } => write!(f, "expected {expected}"),
            FieldProblem::Empty => f.write_str("empty"),
            FieldProblem::OutOfRange { value, min, max } => {
                write!(f, "{value} is out of range [{min}, {max}]")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("mock file '{}' not found", .path.display())]
    MockFileNotFound { path: PathBuf },

    #[error("cannot read mock file '{}': {source}", .path.display())]
    MockFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in mock file '{}': {source}", .path.display())]
    MockFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no API key configured; set {env_var} in the environment or .env, or run `weather-fetch --configure`")]
    MissingApiKey { env_var: &'static str },

    #[error("credential rejected while fetching '{location}': {detail}")]
    Auth { location: String, detail: String },

    #[error("location '{location}' not recognised by the weather service: {detail}")]
    NotFound { location: String, detail: String },

    #[error("request for '{location}' timed out after {}s", .after.as_secs_f64())]
    Timeout { location: String, after: Duration },

    #[error("request for '{location}' failed before a response arrived: {source}")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    /// `body` is the raw response; only the message shortens it.
    #[error("weather service answered {status} for '{location}': {}", truncate_body(.body))]
    Service {
        location: String,
        status: u16,
        body: String,
    },

    #[error("malformed weather data: field '{field}' {problem}")]
    MalformedData {
        field: &'static str,
        problem: FieldProblem,
    },

    #[error("cannot write cache file '{}': {source}", .path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::MockFileNotFound { .. }
            | FetchError::MockFileRead { .. }
            | FetchError::MockFileParse { .. } => ErrorKind::MockFile,
            FetchError::MissingApiKey { .. } | FetchError::Auth { .. } => ErrorKind::Auth,
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::Timeout { .. } | FetchError::Transport { .. } => ErrorKind::Network,
            FetchError::Service { .. } => ErrorKind::Service,
            FetchError::MalformedData { .. } => ErrorKind::MalformedData,
            FetchError::CacheWrite { .. } => ErrorKind::CacheWrite,
        }
    }

    pub(crate) fn malformed(field: &'static str, problem: FieldProblem) -> Self {
        FetchError::MalformedData { field, problem }
    }

    /// Name of the offending payload field, for `MalformedData` errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FetchError::MalformedData { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let kinds = [
            ErrorKind::MockFile,
            ErrorKind::Auth,
            ErrorKind::NotFound,
            ErrorKind::Network,
            ErrorKind::Service,
            ErrorKind::MalformedData,
            ErrorKind::CacheWrite,
        ];

        let mut codes: Vec<u8> = kinds.iter().map(ErrorKind::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();

        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|c| *c > 2));
    }

    #[test]
    fn malformed_message_names_field_and_problem() {
        let err = FetchError::malformed("current.humidity", FieldProblem::OutOfRange {
            value: 101.into(),
            min: 0,
            max: 100,
        });

        assert_eq!(err.kind(), ErrorKind::MalformedData);
        assert_eq!(err.field(), Some("current.humidity"));
        assert_eq!(
            err.to_string(),
            "malformed weather data: field 'current.humidity' 101 is out of range [0, 100]"
        );
    }

    #[test]
    fn service_error_keeps_raw_body_but_shortens_message() {
        let raw = "x".repeat(300);
        let err = FetchError::Service { location: "Berlin".into(), status: 500, body: raw.clone() };

        let msg = err.to_string();
        assert!(msg.starts_with("weather service answered 500 for 'Berlin': "));
        assert!(msg.ends_with(&format!("{}...", "x".repeat(200))));
        assert!(!msg.contains(&raw));

        let FetchError::Service { body, .. } = err else { unreachable!() };
        assert_eq!(body, raw);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(250);
        let truncated = truncate_body(&long);

        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn mock_file_variants_share_a_kind() {
        let err = FetchError::MockFileNotFound { path: PathBuf::from("mocks/nope.json") };
        assert_eq!(err.kind(), ErrorKind::MockFile);
        assert!(err.to_string().contains("mocks/nope.json"));
    }
}
