/// Impact, sentiment & average impact of a selected event.
pub mod event;

/// Recommended tickers, with brand details on hover.
pub mod invest;

/// Historical & forecast prices of a selected ticker.
pub mod stock;

use anyhow::Result;
use atelier_common::group::Series;
use serde::Serialize;

/// How a chart's traces are drawn.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    /// `lines+markers` scatter
    Line,
    Bar,
}

/// Everything a generic multi-series chart widget needs.
///
/// ```json
/// {
///     "title": "Event Impact Scores for Paris Fashion Week",
///     "x_title": "Event Date",
///     "y_title": "Impact",
///     "kind": "line",
///     "series": [{ "name": "LV", "x": ["2024-01-01"], "y": [2.0] }]
/// }
/// ```
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub kind: TraceKind,
    pub series: Vec<Series>,
}

/// Unwrap a fetch for one section of a page. Failures are logged & leave that
/// section empty; they never take the rest of the page down.
pub(crate) fn settle<T: Default>(what: &str, result: Result<T>) -> T {
    match result {
        Ok(data) => data,
        Err(e) => {
            log::error!("Error fetching {what}: {e:#}");
            T::default()
        }
    }
}
