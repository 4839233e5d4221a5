use super::settle;
use crate::api::{Api, BrandSource};
use crate::cache::{Activation, KeyedFetch, LazyCache, Status};
use atelier_common::normalize::{format_number, format_percent};
use atelier_common::schema::{BrandRecord, RecommendedStock};
use serde::Serialize;

/// A recommendation, formatted for display; percentages are already scaled.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRow {
    pub ticker: String,
    pub avg_return_pct: String,
    pub volatility: String,
    pub cumulative_return_pct: String,
    pub sentiment_trend: String,
    pub avg_event_impact: String,
}

impl From<&RecommendedStock> for RecommendationRow {
    fn from(stock: &RecommendedStock) -> Self {
        Self {
            ticker: stock.ticker.clone(),
            avg_return_pct: format_percent(stock.avg_return),
            volatility: format_number(stock.volatility),
            cumulative_return_pct: format_percent(stock.cumulative_return),
            sentiment_trend: format_number(stock.sentiment_trend),
            avg_event_impact: format_number(stock.avg_event_impact),
        }
    }
}

/// State of the invest page: the ranked list, plus brand details fetched the
/// first time each ticker is hovered.
pub struct InvestDashboard<F = BrandSource>
where
    F: KeyedFetch<Value = Vec<BrandRecord>>,
{
    options: Vec<RecommendedStock>,
    brands: LazyCache<F>,
}

impl InvestDashboard<BrandSource> {
    pub fn from_api(api: &Api) -> Self {
        Self::new(BrandSource::new(api.clone()))
    }
}

impl<F> InvestDashboard<F>
where
    F: KeyedFetch<Value = Vec<BrandRecord>>,
{
    pub fn new(fetcher: F) -> Self {
        Self {
            options: Vec::new(),
            brands: LazyCache::new(fetcher),
        }
    }

    pub async fn load(&mut self, api: &Api) {
        self.options = settle("investment options", api.recommended_stocks().await);
    }

    pub fn set_options(&mut self, options: Vec<RecommendedStock>) {
        self.options = options;
    }

    pub fn options(&self) -> &[RecommendedStock] {
        &self.options
    }

    pub fn rows(&self) -> Vec<RecommendationRow> {
        self.options.iter().map(RecommendationRow::from).collect()
    }

    pub fn brands(&self) -> &LazyCache<F> {
        &self.brands
    }

    /// Pointer entered `ticker`'s row.
    pub fn hover(&self, ticker: &str) -> Activation {
        self.brands.show(ticker)
    }

    /// Pointer left the row; cached brands are kept.
    pub fn leave(&self) {
        self.brands.hide();
    }

    /// Brands of the hovered ticker, once they have arrived.
    pub fn brands_for_display(&self) -> Option<(String, Vec<BrandRecord>)> {
        let entry = self.brands.displayed()?;
        match (entry.status, entry.value) {
            (Status::Ready, Some(brands)) => Some((entry.key, brands)),
            _ => None,
        }
    }
}
