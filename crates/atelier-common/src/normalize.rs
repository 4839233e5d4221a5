use crate::schema::{ForecastRecord, PricePoint, PriceRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A single plotted coordinate; whichever value-field type the caller selects.
///
/// Serializes untagged, so a chart widget receives plain JSON scalars:
///
/// ```text
/// Date(2024-01-01)    -> "2024-01-01"
/// Text("LV")          -> "LV"
/// Number(2.5)         -> 2.5
/// ```
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Datum {
    Date(NaiveDate),
    Text(String),
    Number(f64),
}

impl Datum {
    /// Strings & numbers are plottable; `null`, booleans, arrays & objects are not.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Datum::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(Datum::Number),
            _ => None,
        }
    }

    /// Back to JSON; dates go out in ISO form.
    pub fn to_json(&self) -> Value {
        match self {
            Datum::Date(date) => Value::String(format_date(*date)),
            Datum::Text(s) => Value::String(s.clone()),
            Datum::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl From<NaiveDate> for Datum {
    fn from(date: NaiveDate) -> Self {
        Datum::Date(date)
    }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self {
        Datum::Number(n)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

/// Parse the date formats the backend is known to produce, e.g.,
///
/// ```text
/// 2024-01-01
/// 2024-01-01T09:30:00
/// 2024-01-01T09:30:00+01:00
/// Mon, 01 Jan 2024 00:00:00 GMT       (HTTP-date, from the JSON encoder)
/// ```
///
/// Offsets are resolved to UTC before the calendar date is taken.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// `2024-01-01`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Decode each row of a JSON array on its own; a row that does not fit `T`
/// is logged & dropped, the rest keep their order.
pub fn decode_rows<T: DeserializeOwned>(what: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(i, row)| match serde_json::from_value::<T>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed row {i} in {what}: {e}");
                None
            }
        })
        .collect()
}

/// Historical prices with unparseable dates dropped; order is preserved.
pub fn normalize_prices(records: &[PriceRecord]) -> Vec<PricePoint> {
    records
        .iter()
        .filter_map(|r| match parse_date(&r.date) {
            Some(date) => Some(PricePoint {
                date,
                price: r.close_price,
            }),
            None => {
                log::warn!("Invalid date in stock data: {:?}", r.date);
                None
            }
        })
        .collect()
}

/// Forecast prices with unparseable dates dropped; order is preserved.
pub fn normalize_forecasts(records: &[ForecastRecord]) -> Vec<PricePoint> {
    records
        .iter()
        .filter_map(|r| match parse_date(&r.forecast_date) {
            Some(date) => Some(PricePoint {
                date,
                price: r.forecast_price,
            }),
            None => {
                log::warn!("Invalid date in forecast data: {:?}", r.forecast_date);
                None
            }
        })
        .collect()
}

/// Two decimal places, or `N/A` when the value is missing or NaN.
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(n) if !n.is_nan() => format!("{n:.2}"),
        _ => "N/A".to_string(),
    }
}

/// A fractional value as a percentage, e.g., `0.0123` -> `1.23`.
pub fn format_percent(value: Option<f64>) -> String {
    format_number(value.map(|n| n * 100.0))
}
