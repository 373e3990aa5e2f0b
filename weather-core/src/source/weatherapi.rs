use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{fmt, time::Duration};

use crate::{
    config::{ENV_API_KEY, Settings},
    error::{FetchError, FieldProblem, truncate_body},
    model::RawPayload,
};

use super::WeatherSource;

/// WeatherAPI error codes that mean the credential is the problem:
/// not provided, invalid, quota exceeded, disabled.
const AUTH_CODES: &[i64] = &[1002, 2006, 2007, 2008];
/// "No location found matching parameter 'q'".
const NO_LOCATION_CODE: i64 = 1006;

#[derive(Clone)]
pub struct WeatherApiSource {
    api_key: String,
    endpoint: String,
    timeout: Duration,
    http: Client,
}

impl fmt::Debug for WeatherApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherApiSource")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl WeatherApiSource {
    pub fn new(api_key: String, endpoint: String, timeout: Duration) -> Self {
        Self { api_key, endpoint, timeout, http: Client::new() }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(FetchError::MissingApiKey { env_var: ENV_API_KEY })?;

        Ok(Self::new(api_key, settings.endpoint.clone(), settings.timeout))
    }

    fn transport_error(&self, location: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout { location: location.to_string(), after: self.timeout }
        } else {
            // The URL carries the key as a query parameter.
            FetchError::Transport { location: location.to_string(), source: err.without_url() }
        }
    }
}

#[async_trait]
impl WeatherSource for WeatherApiSource {
    async fn fetch(&self, location: &str) -> Result<RawPayload, FetchError> {
        tracing::debug!(endpoint = %self.endpoint, location, timeout = ?self.timeout, "requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("key", self.api_key.as_str()), ("q", location)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(location, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport_error(location, e))?;

        tracing::debug!(%status, bytes = body.len(), "weather service responded");

        classify_response(location, status, &body)
    }

    fn describe(&self) -> String {
        format!("WeatherAPI.com ({})", self.endpoint)
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorEnvelope {
    error: WaError,
}

#[derive(Debug, Deserialize)]
struct WaError {
    code: Option<i64>,
    message: String,
}

fn parse_envelope(body: &str) -> Option<WaError> {
    serde_json::from_str::<WaErrorEnvelope>(body).ok().map(|e| e.error)
}

/// Maps status and body to a payload or to the matching error kind.
fn classify_response(location: &str, status: StatusCode, body: &str) -> Result<RawPayload, FetchError> {
    let envelope = parse_envelope(body);

    if status.is_success() {
        return match envelope {
            Some(api) => Err(envelope_error(location, status, api, body)),
            None => RawPayload::from_json_str(body).map_err(|_| {
                FetchError::malformed("body", FieldProblem::WrongType { expected: "JSON document" })
            }),
        };
    }

    let detail = match &envelope {
        Some(api) => api.message.clone(),
        None => describe_body(status, body),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(FetchError::Auth { location: location.to_string(), detail })
        }
        StatusCode::NOT_FOUND => Err(FetchError::NotFound { location: location.to_string(), detail }),
        StatusCode::BAD_REQUEST => match envelope {
            Some(api) if api.code.is_some_and(|c| c != NO_LOCATION_CODE) => {
                Err(envelope_error(location, status, api, body))
            }
            _ => Err(FetchError::NotFound { location: location.to_string(), detail }),
        },
        _ => Err(FetchError::Service {
            location: location.to_string(),
            status: status.as_u16(),
            body: body.to_string(),
        }),
    }
}

fn envelope_error(location: &str, status: StatusCode, api: WaError, body: &str) -> FetchError {
    match api.code {
        Some(code) if AUTH_CODES.contains(&code) => {
            FetchError::Auth { location: location.to_string(), detail: api.message }
        }
        Some(NO_LOCATION_CODE) => FetchError::NotFound { location: location.to_string(), detail: api.message },
        _ => FetchError::Service {
            location: location.to_string(),
            status: status.as_u16(),
            body: body.to_string(),
        },
    }
}

fn describe_body(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no details").to_string()
    } else {
        truncate_body(body)
    }
}
