use super::{settle, Chart, TraceKind};
use crate::api::Api;
use anyhow::Result;
use atelier_common::group::price_series;
use atelier_common::normalize::{normalize_forecasts, normalize_prices};
use atelier_common::schema::{ForecastRecord, PricePoint, PriceRecord, Ticker};

/// State of the stock analysis page.
#[derive(Debug, Default)]
pub struct StockDashboard {
    tickers: Vec<Ticker>,
    selected: Option<String>,
    // `None` until a history has loaded; an empty history still draws its chart
    history: Option<Vec<PricePoint>>,
    forecast: Vec<PricePoint>,
}

impl StockDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the ticker selector.
    pub async fn load(&mut self, api: &Api) {
        self.tickers = settle("tickers", api.stock_tickers().await);
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub async fn select(&mut self, api: &Api, ticker: &str) {
        self.selected = Some(ticker.to_string());
        let (history, forecast) =
            futures::join!(api.stock_data(ticker), api.stock_forecast(ticker));
        self.apply(ticker, history, forecast);
    }

    /// Take the results of a selection; malformed dates are dropped here.
    ///
    /// [`select()`](Self::select) holds the page across both fetches, so a
    /// stale ticker only reaches this when the caller drives the fetches
    /// itself; such results are discarded.
    pub fn apply(
        &mut self,
        ticker: &str,
        history: Result<Vec<PriceRecord>>,
        forecast: Result<Vec<ForecastRecord>>,
    ) {
        if self.selected() != Some(ticker) {
            log::debug!("Discarding results for [{ticker}]; no longer selected");
            return;
        }
        self.history = match history {
            Ok(records) => Some(normalize_prices(&records)),
            Err(e) => {
                log::error!("Error fetching stock data: {e:#}");
                None
            }
        };
        self.forecast = normalize_forecasts(&settle("forecast data", forecast));
    }

    pub fn history_chart(&self) -> Option<Chart> {
        let history = self.history.as_ref()?;
        Some(Chart {
            title: format!("Stock Prices for {}", self.selected().unwrap_or_default()),
            x_title: "Date".into(),
            y_title: "Close Price".into(),
            kind: TraceKind::Line,
            series: vec![price_series("Historical Prices", history)],
        })
    }

    pub fn forecast_chart(&self) -> Option<Chart> {
        if self.forecast.is_empty() {
            return None;
        }
        Some(Chart {
            title: format!(
                "Forecasted Prices for {}",
                self.selected().unwrap_or_default()
            ),
            x_title: "Forecast Date".into(),
            y_title: "Forecast Price".into(),
            kind: TraceKind::Line,
            series: vec![price_series("Forecasted Prices", &self.forecast)],
        })
    }

    pub fn charts(&self) -> Vec<Chart> {
        [self.history_chart(), self.forecast_chart()]
            .into_iter()
            .flatten()
            .collect()
    }
}
