use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::model::WeatherReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitPreference {
    #[default]
    Metric,
    Imperial,
}

impl UnitPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitPreference::Metric => "metric",
            UnitPreference::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitPreference] {
        &[UnitPreference::Metric, UnitPreference::Imperial]
    }
}

impl fmt::Display for UnitPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown units '{0}'; expected one of: metric, imperial")]
pub struct ParseUnitsError(String);

impl FromStr for UnitPreference {
    type Err = ParseUnitsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitPreference::Metric),
            "imperial" => Ok(UnitPreference::Imperial),
            _ => Err(ParseUnitsError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

/// Picks the temperature matching `units`. Both scales are sourced, so no
/// arithmetic happens here.
pub fn temperature(report: &WeatherReport, units: UnitPreference) -> Temperature {
    match units {
        UnitPreference::Metric => Temperature {
            value: report.temperature_celsius(),
            unit: TemperatureUnit::Celsius,
        },
        UnitPreference::Imperial => Temperature {
            value: report.temperature_fahrenheit(),
            unit: TemperatureUnit::Fahrenheit,
        },
    }
}

/// `F = C × 9/5 + 32`, rounded to one decimal like the service's own values.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_one_decimal(celsius * 9.0 / 5.0 + 32.0)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
