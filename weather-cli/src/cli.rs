use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use inquire::{Password, PasswordDisplayMode};
use weather_core::{Config, DEFAULT_CACHE_FILE, Request, Settings, UnitPreference, orchestrator};

const EXAMPLES: &str = "\
Examples:
  weather-fetch Berlin
  weather-fetch \"New York\" --units imperial
  weather-fetch Tokyo --mock mocks/sunny_berlin.json
  weather-fetch London --save";

/// Exit status for startup and configuration failures.
const STARTUP_FAILURE: u8 = 1;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-fetch",
    version,
    about = "Fetch current weather from WeatherAPI.com",
    after_help = EXAMPLES
)]
pub struct Cli {
    /// City or location name to query.
    #[arg(required_unless_present = "configure")]
    pub location: Option<String>,

    /// Units for temperature: metric or imperial.
    #[arg(long, value_name = "UNITS", default_value_t = UnitPreference::Metric)]
    pub units: UnitPreference,

    /// Use a mock JSON file instead of calling the API.
    #[arg(long, value_name = "PATH")]
    pub mock: Option<PathBuf>,

    /// Save the raw response to the cache file.
    #[arg(long)]
    pub save: bool,

    /// Destination of the snapshot written by --save.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,

    /// Prompt for a WeatherAPI.com key and store it in the config file.
    #[arg(long, conflicts_with_all = ["location", "mock", "save"])]
    pub configure: bool,

    /// More log output on stderr (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub async fn run(self) -> ExitCode {
        ExitCode::from(self.execute().await)
    }

    async fn execute(self) -> u8 {
        if self.configure {
            return match configure() {
                Ok(path) => {
                    println!("API key saved to {}", path.display());
                    0
                }
                Err(err) => {
                    eprintln!("Error: {err:#}");
                    STARTUP_FAILURE
                }
            };
        }

        // Mock runs never need the credential, so nothing is loaded for them.
        let settings = if self.mock.is_some() {
            Settings::default()
        } else {
            match Settings::load() {
                Ok(settings) => settings,
                Err(err) => {
                    eprintln!("Error: {err:#}");
                    return STARTUP_FAILURE;
                }
            }
        };

        tracing::debug!(
            endpoint = %settings.endpoint,
            timeout = ?settings.timeout,
            has_key = settings.api_key.is_some(),
            "settings loaded"
        );

        let Some(request) = self.into_request() else {
            eprintln!("Error: a location is required");
            return 2;
        };

        match orchestrator::run(&request, &settings).await {
            Ok(outcome) => {
                if let Some(path) = &outcome.saved_to {
                    eprintln!("Saved to {}", path.display());
                }
                println!("{}", outcome.line);
                0
            }
            Err(failure) => {
                eprintln!("Error: {failure}");
                failure.exit_code()
            }
        }
    }

    fn into_request(self) -> Option<Request> {
        Some(Request {
            location: self.location?,
            units: self.units,
            mock: self.mock,
            save: self.save.then_some(self.cache_file),
        })
    }
}

fn configure() -> anyhow::Result<PathBuf> {
    let key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    let mut config = Config::load()?;
    config.api_key = Some(key.to_string());
    config.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("weather-fetch").chain(args.iter().copied()))
    }

    fn sample_mock() -> String {
        format!("{}/../mocks/sunny_berlin.json", env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = parse(&["Berlin"]).unwrap();

        assert_eq!(cli.location.as_deref(), Some("Berlin"));
        assert_eq!(cli.units, UnitPreference::Metric);
        assert_eq!(cli.mock, None);
        assert!(!cli.save);
        assert_eq!(cli.cache_file, PathBuf::from("cache.json"));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn all_options() {
        let cli = parse(&[
            "New York",
            "--units",
            "imperial",
            "--mock",
            "mocks/ny.json",
            "--save",
            "--cache-file",
            "out/last.json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.location.as_deref(), Some("New York"));
        assert_eq!(cli.units, UnitPreference::Imperial);
        assert_eq!(cli.mock, Some(PathBuf::from("mocks/ny.json")));
        assert_eq!(cli.verbose, 2);

        let request = cli.into_request().unwrap();
        assert_eq!(request.save, Some(PathBuf::from("out/last.json")));
    }

    #[test]
    fn save_flag_controls_destination() {
        let request = parse(&["Berlin"]).unwrap().into_request().unwrap();
        assert_eq!(request.save, None);

        let request = parse(&["Berlin", "--save"]).unwrap().into_request().unwrap();
        assert_eq!(request.save, Some(PathBuf::from(DEFAULT_CACHE_FILE)));
    }

    #[test]
    fn rejects_unknown_units() {
        let err = parse(&["Berlin", "--units", "kelvin"]).unwrap_err();
        assert!(err.to_string().contains("kelvin"));
    }

    #[test]
    fn location_is_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--save"]).is_err());
    }

    #[test]
    fn configure_stands_alone() {
        let cli = parse(&["--configure"]).unwrap();
        assert!(cli.configure);
        assert_eq!(cli.location, None);

        assert!(parse(&["Berlin", "--configure"]).is_err());
    }

    #[tokio::test]
    async fn mock_run_succeeds() {
        let mock = sample_mock();
        let code = parse(&["Berlin", "--mock", &mock]).unwrap().execute().await;
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn missing_mock_exits_with_mock_file_code() {
        let code = parse(&["Berlin", "--mock", "mocks/non_existent_file.json"])
            .unwrap()
            .execute()
            .await;
        assert_eq!(code, weather_core::ErrorKind::MockFile.exit_code());
    }

    #[tokio::test]
    async fn save_writes_cache_file() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("cache.json");
        let mock = sample_mock();
        let cache_arg = cache.display().to_string();

        let code = parse(&["Berlin", "--mock", &mock, "--save", "--cache-file", &cache_arg])
            .unwrap()
            .execute()
            .await;

        assert_eq!(code, 0);
        assert!(cache.exists());
    }
}
