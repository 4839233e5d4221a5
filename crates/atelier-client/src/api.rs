use crate::cache::KeyedFetch;
use crate::client_ext::json::ClientJsonExt;
use crate::config::Config;
use anyhow::{anyhow, Result};
use atelier_common::normalize::decode_rows;
use atelier_common::schema::{
    BrandRecord, EventName, FlatRecord, ForecastRecord, PriceRecord, RecommendedStock, Ticker,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The backend's read-only JSON endpoints.
///
/// ```ignore
/// let api = Api::from_config(&Config::from_env()?)?;
/// let events = api.event_names().await?;
/// let impacts = api.event_impacts(events[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Api {
    base: Url,
    client: Client,
}

impl Api {
    pub fn new(base: &str, client: Client) -> Result<Self> {
        let base = Url::parse(base).map_err(|e| anyhow!("invalid API url {base:?}: {e}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("API url {base} cannot carry a path"));
        }
        Ok(Self { base, client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = crate::prelude::build_client(config)?;
        Self::new(&config.api_url, client)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/api/{segments..}`; each segment is percent-encoded on its own,
    /// so a ticker such as `MC.PA` or `BRK/B` stays a single segment.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    // ---------------------------------------------------------------------------------------------
    // Events

    pub async fn event_names(&self) -> Result<Vec<EventName>> {
        self.client.get_json(self.url(&["event-names"])).await
    }

    /// `{stock_symbol, event_date, impact, post_event_price}` rows.
    pub async fn event_impacts(&self, event_id: i64) -> Result<Vec<FlatRecord>> {
        self.rows("event impact data", &["event-impacts", &event_id.to_string()])
            .await
    }

    /// `{stock_symbol, event_date, sentiment_score, impact}` rows.
    pub async fn event_sentiment_scores(&self, event_id: i64) -> Result<Vec<FlatRecord>> {
        self.rows(
            "event sentiment scores",
            &["event-sentiment-scores", &event_id.to_string()],
        )
        .await
    }

    /// `{stock_symbol, event_date, average_impact}` rows.
    pub async fn event_average_impact(&self, event_id: i64) -> Result<Vec<FlatRecord>> {
        self.rows(
            "event average impact data",
            &["event-average-impact-graph", &event_id.to_string()],
        )
        .await
    }

    // ---------------------------------------------------------------------------------------------
    // Stocks

    pub async fn stock_tickers(&self) -> Result<Vec<Ticker>> {
        self.client.get_json(self.url(&["stock-tickers"])).await
    }

    pub async fn stock_data(&self, ticker: &str) -> Result<Vec<PriceRecord>> {
        self.rows("stock data", &["stock-data", ticker]).await
    }

    /// Forecast rows. A body that is not a JSON array is logged & treated as
    /// no forecast, rather than failing the page.
    pub async fn stock_forecast(&self, ticker: &str) -> Result<Vec<ForecastRecord>> {
        let body: Value = self
            .client
            .get_json(self.url(&["stock-forecast", ticker]))
            .await?;
        forecast_rows(ticker, body)
    }

    pub async fn recommended_stocks(&self) -> Result<Vec<RecommendedStock>> {
        self.client.get_json(self.url(&["recommended-stocks"])).await
    }

    pub async fn fashion_brands(&self, ticker: &str) -> Result<Vec<BrandRecord>> {
        self.client
            .get_json(self.url(&["fashion-brands", ticker]))
            .await
    }

    /// A JSON array decoded row by row; a malformed row is dropped on its own
    /// rather than failing the whole list.
    async fn rows<T: DeserializeOwned>(&self, what: &str, segments: &[&str]) -> Result<Vec<T>> {
        let rows: Vec<Value> = self.client.get_json(self.url(segments)).await?;
        Ok(decode_rows(what, rows))
    }
}

fn forecast_rows(ticker: &str, body: Value) -> Result<Vec<ForecastRecord>> {
    match body {
        Value::Array(rows) => Ok(decode_rows("forecast data", rows)),
        other => {
            log::error!("[{ticker}] unexpected response format for forecast data: {other}");
            Ok(vec![])
        }
    }
}

/// Brand details per ticker, fetched through the lazy cache.
#[derive(Debug, Clone)]
pub struct BrandSource {
    api: Api,
}

impl BrandSource {
    pub fn new(api: Api) -> Self {
        Self { api }
    }
}

impl KeyedFetch for BrandSource {
    type Value = Vec<BrandRecord>;

    async fn fetch(&self, key: &str) -> Result<Self::Value> {
        self.api.fashion_brands(key).await
    }
}
