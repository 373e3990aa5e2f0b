use crate::{
    model::WeatherReport,
    units::{UnitPreference, temperature},
};

/// Renders `"<location>: <temp><unit>, <humidity>% humidity, <condition>"`.
pub fn format_report(report: &WeatherReport, units: UnitPreference) -> String {
    let temp = temperature(report, units);
    format!(
        "{}: {:.1}{}, {}% humidity, {}",
        report.location(),
        temp.value,
        temp.unit.symbol(),
        report.humidity_percent(),
        report.condition_text(),
    )
}
