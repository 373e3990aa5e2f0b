//! One invocation, start to finish.
//!
//! The run walks `Idle → ResolvingSource → Normalizing → Formatting →
//! (Persisting) → Done` strictly forward. Any step may fail, which ends the
//! run with a [`Failure`] recording where it stopped and which input was at
//! fault. The formatted line is only handed back once every step, including
//! the optional snapshot, has succeeded.

use std::{fmt, path::PathBuf};

use crate::{
    cache::save_snapshot,
    config::Settings,
    error::{ErrorKind, FetchError},
    format::format_report,
    normalize::normalize,
    source::source_for,
    units::UnitPreference,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    ResolvingSource,
    Normalizing,
    Formatting,
    Persisting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::ResolvingSource => "resolving source",
            Stage::Normalizing => "normalizing",
            Stage::Formatting => "formatting",
            Stage::Persisting => "persisting",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything one invocation needs besides [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub location: String,
    pub units: UnitPreference,
    pub mock: Option<PathBuf>,
    /// Snapshot destination; `None` means don't persist.
    pub save: Option<PathBuf>,
}

impl Request {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            units: UnitPreference::default(),
            mock: None,
            save: None,
        }
    }

    /// The user-supplied input a failure should be blamed on.
    pub fn input(&self) -> Input {
        match &self.mock {
            Some(path) => Input::MockFile(path.clone()),
            None => Input::Location(self.location.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Location(String),
    MockFile(PathBuf),
    CacheFile(PathBuf),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Location(name) => write!(f, "location '{name}'"),
            Input::MockFile(path) => write!(f, "mock file '{}'", path.display()),
            Input::CacheFile(path) => write!(f, "cache file '{}'", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub line: String,
    pub saved_to: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Failure {
    pub stage: Stage,
    pub input: Input,
    pub error: FetchError,
}

impl Failure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {}: {}", self.kind(), self.input, self.error)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Tracks the current stage and turns errors into [`Failure`]s.
#[derive(Debug)]
struct Run<'a> {
    request: &'a Request,
    stage: Stage,
}

impl<'a> Run<'a> {
    fn new(request: &'a Request) -> Self {
        Self { request, stage: Stage::Idle }
    }

    fn enter(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage {next} cannot follow {}", self.stage);
        tracing::debug!(from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }

    fn fail(&self, error: FetchError) -> Failure {
        let input = match &error {
            FetchError::CacheWrite { path, .. } => Input::CacheFile(path.clone()),
            _ => self.request.input(),
        };
        tracing::debug!(stage = %self.stage, kind = %error.kind(), "run failed");
        Failure { stage: self.stage, input, error }
    }
}

pub async fn run(request: &Request, settings: &Settings) -> Result<Outcome, Failure> {
    let mut state = Run::new(request);

    state.enter(Stage::ResolvingSource);
    let source = source_for(request.mock.as_deref(), settings).map_err(|e| state.fail(e))?;
    tracing::info!(source = %source.describe(), location = %request.location, "fetching weather");
    let payload = source.fetch(&request.location).await.map_err(|e| state.fail(e))?;

    state.enter(Stage::Normalizing);
    let report = normalize(&payload).map_err(|e| state.fail(e))?;

    if let Some(mock) = &request.mock {
        if let Some(message) = mock_mismatch(report.location(), &request.location) {
            tracing::warn!(mock = %mock.display(), "{message}");
        }
    }

    state.enter(Stage::Formatting);
    let line = format_report(&report, request.units);

    let saved_to = match &request.save {
        Some(path) => {
            state.enter(Stage::Persisting);
            save_snapshot(&payload, path).map_err(|e| state.fail(e))?;
            Some(path.clone())
        }
        None => None,
    };

    state.enter(Stage::Done);
    Ok(Outcome { line, saved_to })
}

/// Warning text when a mock file describes a different place than the one asked for.
fn mock_mismatch(reported: &str, requested: &str) -> Option<String> {
    (reported.to_lowercase() != requested.to_lowercase())
        .then(|| format!("using mock data for '{reported}' (requested '{requested}')"))
}
