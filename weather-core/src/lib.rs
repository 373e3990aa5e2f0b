//! Core library for the `weather-fetch` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Data sources: the live WeatherAPI.com service and mock JSON files
//! - Validation of raw payloads into a canonical weather report
//! - Unit selection, output formatting and the cache snapshot
//! - The orchestrator tying one invocation together
//!
//! It is used by `weather-fetch`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod source;
pub mod units;

pub use cache::{DEFAULT_CACHE_FILE, save_snapshot};
pub use config::{Config, Settings};
pub use error::{ErrorKind, FetchError, FieldProblem};
pub use format::format_report;
pub use model::{RawPayload, WeatherReport};
pub use normalize::normalize;
pub use orchestrator::{Failure, Input, Outcome, Request, Stage, run};
pub use source::{WeatherSource, source_for};
pub use units::{UnitPreference, celsius_to_fahrenheit};
