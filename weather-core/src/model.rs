use serde::Serialize;
use serde_json::Value;

/// Untyped weather payload exactly as received from the service or read
/// from a mock file. Only the normalizer and the cache writer look inside.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawPayload(Value);

impl RawPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Walks a dotted path such as `current.condition.text`.
    pub(crate) fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.0, |node, key| node.get(key))
    }
}

/// Validated current conditions for one location.
///
/// Built only by [`crate::normalize::normalize`], so every instance carries
/// all five fields.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub(crate) location: String,
    pub(crate) temperature_celsius: f64,
    pub(crate) temperature_fahrenheit: f64,
    pub(crate) humidity_percent: u8,
    pub(crate) condition_text: String,
}

impl WeatherReport {
    /// Place name as reported by the source, not the query string.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    pub fn temperature_fahrenheit(&self) -> f64 {
        self.temperature_fahrenheit
    }

    pub fn humidity_percent(&self) -> u8 {
        self.humidity_percent
    }

    pub fn condition_text(&self) -> &str {
        &self.condition_text
    }
}
