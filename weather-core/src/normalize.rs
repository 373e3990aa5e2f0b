//! Validation of raw payloads into [`WeatherReport`]s.
//!
//! Live responses and mock files both pass through [`normalize`], which is
//! what makes a mock fixture a faithful stand-in for the service.

use serde_json::Value;

use crate::{
    error::{FetchError, FieldProblem},
    model::{RawPayload, WeatherReport},
    units::celsius_to_fahrenheit,
};

pub const LOCATION_NAME: &str = "location.name";
pub const TEMP_C: &str = "current.temp_c";
pub const TEMP_F: &str = "current.temp_f";
pub const HUMIDITY: &str = "current.humidity";
pub const CONDITION_TEXT: &str = "current.condition.text";

/// Fields in the order they are checked; the first failure is reported.
pub const CHECKED_FIELDS: [&str; 5] = [LOCATION_NAME, TEMP_C, TEMP_F, HUMIDITY, CONDITION_TEXT];

const HUMIDITY_RANGE: (i64, i64) = (0, 100);

pub fn normalize(payload: &RawPayload) -> Result<WeatherReport, FetchError> {
    let location = required_text(payload, LOCATION_NAME)?;
    let temperature_celsius = required_number(payload, TEMP_C)?;
    let temperature_fahrenheit = required_number(payload, TEMP_F)?;
    let humidity_percent = required_humidity(payload)?;
    let condition_text = required_text(payload, CONDITION_TEXT)?;

    let derived = celsius_to_fahrenheit(temperature_celsius);
    if (derived - temperature_fahrenheit).abs() > 0.1 {
        tracing::debug!(
            temp_c = temperature_celsius,
            temp_f = temperature_fahrenheit,
            derived_f = derived,
            "sourced Fahrenheit differs from converted Celsius"
        );
    }

    Ok(WeatherReport {
        location,
        temperature_celsius,
        temperature_fahrenheit,
        humidity_percent,
        condition_text,
    })
}

fn required<'a>(payload: &'a RawPayload, field: &'static str) -> Result<&'a Value, FetchError> {
    match payload.lookup(field) {
        None | Some(Value::Null) => Err(FetchError::malformed(field, FieldProblem::Missing)),
        Some(value) => Ok(value),
    }
}

fn required_text(payload: &RawPayload, field: &'static str) -> Result<String, FetchError> {
    let text = required(payload, field)?
        .as_str()
        .ok_or_else(|| FetchError::malformed(field, FieldProblem::WrongType { expected: "string" }))?;

    if text.trim().is_empty() {
        return Err(FetchError::malformed(field, FieldProblem::Empty));
    }

    Ok(text.to_string())
}

fn required_number(payload: &RawPayload, field: &'static str) -> Result<f64, FetchError> {
    required(payload, field)?
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FetchError::malformed(field, FieldProblem::WrongType { expected: "number" }))
}

fn required_humidity(payload: &RawPayload) -> Result<u8, FetchError> {
    let wrong_type = || FetchError::malformed(HUMIDITY, FieldProblem::WrongType { expected: "integer" });

    let Value::Number(number) = required(payload, HUMIDITY)? else {
        return Err(wrong_type());
    };

    // WeatherAPI sends integers, but a re-serialised 62.0 is still whole.
    let whole = number.is_i64() || number.is_u64() || number.as_f64().is_some_and(|n| n.fract() == 0.0);
    if !whole {
        return Err(wrong_type());
    }

    let (min, max) = HUMIDITY_RANGE;
    number
        .as_i64()
        // Whole floats past i64 saturate, which still lands outside the range.
        .or_else(|| number.as_f64().map(|n| n as i64))
        .filter(|n| (min..=max).contains(n))
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| {
            FetchError::malformed(HUMIDITY, FieldProblem::OutOfRange { value: number.clone(), min, max })
        })
}
