use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fashion event, as listed in the event selector.
///
/// ```json
/// [
///     {
///         "id": 3,
///         "description": "Paris Fashion Week"
///     },
///     // ...
/// ]
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EventName {
    pub id: i64,
    pub description: String,
}

/// A tradeable fashion company.
///
/// ```json
/// [
///     {
///         "stock_symbol": "MC.PA",
///         "company_name": "LVMH"
///     },
///     // ...
/// ]
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Ticker {
    pub stock_symbol: String,
    pub company_name: String,
}

/// Raw historical close price, exactly as served; `date` is not yet validated.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: String,
    pub close_price: f64,
}

/// Raw forecast price, exactly as served; `forecast_date` is not yet validated.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub forecast_date: String,
    pub forecast_price: f64,
}

/// A price with a validated date; the output of [`normalize_prices()`] and
/// [`normalize_forecasts()`].
///
/// [`normalize_prices()`]: crate::normalize::normalize_prices
/// [`normalize_forecasts()`]: crate::normalize::normalize_forecasts
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A brand owned by a ticker's parent company.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BrandRecord {
    pub brand_name: String,
}

impl BrandRecord {
    /// Image file name for the brand card, e.g., `Louis Vuitton` -> `louis_vuitton.jpg`.
    pub fn image_name(&self) -> String {
        let stem = self
            .brand_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase();
        format!("{stem}.jpg")
    }
}

/// A ranked investment option. The statistics are computed server-side and
/// any of them may be missing.
///
/// ```json
/// [
///     {
///         "ticker": "RMS.PA",
///         "avg_return": 0.0012,
///         "volatility": 0.018,
///         "cumulative_return": 0.41,
///         "sentiment_trend": 0.3,
///         "avg_event_impact": 1.7
///     },
///     // ...
/// ]
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RecommendedStock {
    pub ticker: String,
    #[serde(default)]
    pub avg_return: Option<f64>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub cumulative_return: Option<f64>,
    #[serde(default)]
    pub sentiment_trend: Option<f64>,
    #[serde(default)]
    pub avg_event_impact: Option<f64>,
}

/// An ungrouped API row; the per-event impact, sentiment & average impact
/// endpoints all decode to a list of these.
///
/// ```json
/// {
///     "stock_symbol": "LV",
///     "event_date": "2024-01-01",
///     "impact": 2.0
/// }
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct FlatRecord(pub Map<String, Value>);

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for assembling records by hand.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The field rendered as grouping text. Strings are taken verbatim,
    /// numbers & booleans by their JSON text; `null` or absent is `None`.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for FlatRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_image_name_collapses_whitespace() {
        let brand = BrandRecord {
            brand_name: "Louis  Vuitton\tMen".to_string(),
        };
        assert_eq!(brand.image_name(), "louis_vuitton_men.jpg");
    }

    #[test]
    fn recommended_stock_tolerates_missing_statistics() {
        let stock: RecommendedStock =
            serde_json::from_str(r#"{"ticker": "KER.PA", "volatility": 0.02}"#).unwrap();
        assert_eq!(stock.ticker, "KER.PA");
        assert_eq!(stock.volatility, Some(0.02));
        assert_eq!(stock.avg_return, None);
    }

    #[test]
    fn flat_record_text_covers_json_scalars() {
        let record: FlatRecord = serde_json::from_str(
            r#"{"stock_symbol": "LV", "id": 7, "flag": true, "gone": null}"#,
        )
        .unwrap();
        assert_eq!(record.text("stock_symbol").as_deref(), Some("LV"));
        assert_eq!(record.text("id").as_deref(), Some("7"));
        assert_eq!(record.text("flag").as_deref(), Some("true"));
        assert_eq!(record.text("gone"), None);
        assert_eq!(record.text("absent"), None);
    }
}
