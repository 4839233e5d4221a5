use super::{settle, Chart, TraceKind};
use crate::api::Api;
use anyhow::Result;
use atelier_common::group::{average_impact_series, impact_series, sentiment_series};
use atelier_common::schema::{EventName, FlatRecord};

/// State of the event analysis page.
///
/// Selecting an event fetches its three datasets concurrently; each one is
/// independent, so a failed sentiment query still leaves the impact charts.
#[derive(Debug, Default)]
pub struct EventDashboard {
    events: Vec<EventName>,
    selected: Option<i64>,
    impacts: Vec<FlatRecord>,
    sentiments: Vec<FlatRecord>,
    average_impacts: Vec<FlatRecord>,
}

impl EventDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the event selector.
    pub async fn load(&mut self, api: &Api) {
        self.events = settle("events", api.event_names().await);
    }

    pub fn events(&self) -> &[EventName] {
        &self.events
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub async fn select(&mut self, api: &Api, event_id: i64) {
        self.selected = Some(event_id);
        let (impacts, sentiments, average_impacts) = futures::join!(
            api.event_impacts(event_id),
            api.event_sentiment_scores(event_id),
            api.event_average_impact(event_id),
        );
        self.apply(event_id, impacts, sentiments, average_impacts);
    }

    /// Take the results of a selection. [`select()`](Self::select) holds the
    /// page for the whole fetch, so this only sees stale results when a caller
    /// runs the fetches itself and the selection has moved on meanwhile; those
    /// are discarded.
    pub fn apply(
        &mut self,
        event_id: i64,
        impacts: Result<Vec<FlatRecord>>,
        sentiments: Result<Vec<FlatRecord>>,
        average_impacts: Result<Vec<FlatRecord>>,
    ) {
        if self.selected != Some(event_id) {
            log::debug!("Discarding results for event {event_id}; no longer selected");
            return;
        }
        self.impacts = settle("event impact data", impacts);
        self.sentiments = settle("event sentiment scores", sentiments);
        self.average_impacts = settle("event average impact data", average_impacts);
    }

    /// Display name of the selected event, falling back to its id.
    pub fn description(&self) -> String {
        let Some(id) = self.selected else {
            return String::new();
        };
        self.events
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.description.clone())
            .unwrap_or_else(|| format!("event {id}"))
    }

    pub fn impact_chart(&self) -> Option<Chart> {
        if self.impacts.is_empty() {
            return None;
        }
        Some(Chart {
            title: format!("Event Impact Scores for {}", self.description()),
            x_title: "Event Date".into(),
            y_title: "Impact".into(),
            kind: TraceKind::Line,
            series: impact_series(&self.impacts),
        })
    }

    pub fn sentiment_chart(&self) -> Option<Chart> {
        if self.sentiments.is_empty() {
            return None;
        }
        Some(Chart {
            title: format!("Event Sentiment Scores for {}", self.description()),
            x_title: "Event Date".into(),
            y_title: "Sentiment Score".into(),
            kind: TraceKind::Line,
            series: sentiment_series(&self.sentiments),
        })
    }

    pub fn average_impact_chart(&self) -> Option<Chart> {
        if self.average_impacts.is_empty() {
            return None;
        }
        Some(Chart {
            title: format!("Event Average Impact for {}", self.description()),
            x_title: "Event Date".into(),
            y_title: "Average Impact".into(),
            kind: TraceKind::Bar,
            series: average_impact_series(&self.average_impacts),
        })
    }

    /// Every chart that currently has data, in page order.
    pub fn charts(&self) -> Vec<Chart> {
        [
            self.impact_chart(),
            self.sentiment_chart(),
            self.average_impact_chart(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
