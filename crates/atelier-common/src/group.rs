use crate::normalize::Datum;
use crate::schema::{FlatRecord, PricePoint};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

pub const SYMBOL_FIELD: &str = "stock_symbol";
pub const EVENT_DATE_FIELD: &str = "event_date";
pub const IMPACT_FIELD: &str = "impact";
pub const SENTIMENT_FIELD: &str = "sentiment_score";
pub const AVERAGE_IMPACT_FIELD: &str = "average_impact";

/// Joins the parts of a composite key, e.g., `2024-02-01 - LV`.
pub const COMPOSITE_SEPARATOR: &str = " - ";

/// One named, ordered `(x, y)` point sequence; a single plotted trace.
///
/// ```json
/// {
///     "name": "LV",
///     "x": ["2024-01-01", "2024-01-02"],
///     "y": [2.0, 3.0]
/// }
/// ```
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub x: Vec<Datum>,
    pub y: Vec<Datum>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Build a series from parallel sequences. Mismatched lengths are a bug in
    /// the caller, and panic in debug builds.
    pub fn from_parts(name: impl Into<String>, x: Vec<Datum>, y: Vec<Datum>) -> Self {
        debug_assert_eq!(x.len(), y.len(), "series x/y lengths diverged");
        Self {
            name: name.into(),
            x,
            y,
        }
    }

    pub fn push(&mut self, x: Datum, y: Datum) {
        self.x.push(x);
        self.y.push(y);
        debug_assert_eq!(self.x.len(), self.y.len(), "series x/y lengths diverged");
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (&Datum, &Datum)> {
        self.x.iter().zip(self.y.iter())
    }
}

/// How a [`FlatRecord`] is assigned to a series.
///
/// A composite key may group more finely than it labels: the average impact
/// chart groups by `event_date - stock_symbol` but names each bar by the
/// symbol alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    Field(String),
    Composite {
        fields: Vec<String>,
        separator: String,
        label: Option<String>,
    },
}

impl GroupKey {
    pub fn field(name: &str) -> Self {
        GroupKey::Field(name.to_string())
    }

    pub fn composite(fields: &[&str], separator: &str) -> Self {
        GroupKey::Composite {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            separator: separator.to_string(),
            label: None,
        }
    }

    /// Name composite groups by this field of their first record, rather than
    /// by the composite key itself. No effect on a single-field key.
    pub fn labelled_by(self, field: &str) -> Self {
        match self {
            GroupKey::Composite {
                fields, separator, ..
            } => GroupKey::Composite {
                fields,
                separator,
                label: Some(field.to_string()),
            },
            key => key,
        }
    }

    /// The grouping key of `record`. A missing field contributes an empty string.
    pub fn key_of(&self, record: &FlatRecord) -> String {
        match self {
            GroupKey::Field(field) => record.text(field).unwrap_or_default(),
            GroupKey::Composite {
                fields, separator, ..
            } => fields
                .iter()
                .map(|f| record.text(f).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(separator),
        }
    }

    /// The display name of a series whose first record is `record`.
    pub fn label_of(&self, record: &FlatRecord) -> String {
        match self {
            GroupKey::Composite {
                label: Some(field), ..
            } => record.text(field).unwrap_or_default(),
            key => key.key_of(record),
        }
    }
}

/// Partition `records` into series, one per distinct key, in order of first
/// appearance. Points keep their input order; nothing is sorted or de-duplicated.
///
/// `point` extracts the `(x, y)` pair; a record yielding `None` is skipped and
/// never opens a series of its own.
pub fn group_with<R, K, L, P>(records: &[R], key: K, label: L, point: P) -> Vec<Series>
where
    K: Fn(&R) -> String,
    L: Fn(&R) -> String,
    P: Fn(&R) -> Option<(Datum, Datum)>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut series: Vec<Series> = Vec::new();

    for record in records {
        let Some((x, y)) = point(record) else {
            continue;
        };
        let k = key(record);
        let slot = match slots.get(&k) {
            Some(&slot) => slot,
            None => {
                series.push(Series::new(label(record)));
                slots.insert(k, series.len() - 1);
                series.len() - 1
            }
        };
        series[slot].push(x, y);
    }

    series
}

/// [`group_with()`] over JSON rows, selecting `x_field` & `y_field` by name.
/// Rows missing either field (or holding a non-scalar there) are dropped.
pub fn group(records: &[FlatRecord], key: &GroupKey, x_field: &str, y_field: &str) -> Vec<Series> {
    let grouped = group_with(
        records,
        |r| key.key_of(r),
        |r| key.label_of(r),
        |r| {
            let x = r.get(x_field).and_then(Datum::from_json);
            let y = r.get(y_field).and_then(Datum::from_json);
            match (x, y) {
                (Some(x), Some(y)) => Some((x, y)),
                _ => {
                    log::debug!("Skipping record without plottable `{x_field}`/`{y_field}`: {r:?}");
                    None
                }
            }
        },
    );
    log::trace!(
        "Grouped {} records into {} series",
        records.len(),
        grouped.len()
    );
    grouped
}

/// Flatten series back into rows of `{key_field, x_field, y_field}`, in series
/// order. Regrouping the output by `key_field` reproduces `series`.
pub fn flatten(series: &[Series], key_field: &str, x_field: &str, y_field: &str) -> Vec<FlatRecord> {
    series
        .iter()
        .flat_map(|s| {
            s.points().map(move |(x, y)| {
                FlatRecord::new()
                    .with(key_field, Value::String(s.name.clone()))
                    .with(x_field, x.to_json())
                    .with(y_field, y.to_json())
            })
        })
        .collect()
}

// -------------------------------------------------------------------------------------------------
// Chart-specific groupings

/// Per-symbol line series of `y_field` against the event date.
pub fn by_symbol(records: &[FlatRecord], y_field: &str) -> Vec<Series> {
    group(records, &GroupKey::field(SYMBOL_FIELD), EVENT_DATE_FIELD, y_field)
}

pub fn impact_series(records: &[FlatRecord]) -> Vec<Series> {
    by_symbol(records, IMPACT_FIELD)
}

pub fn sentiment_series(records: &[FlatRecord]) -> Vec<Series> {
    by_symbol(records, SENTIMENT_FIELD)
}

/// Per-(date, symbol) bars, each named by its symbol.
pub fn average_impact_series(records: &[FlatRecord]) -> Vec<Series> {
    let key = GroupKey::composite(&[EVENT_DATE_FIELD, SYMBOL_FIELD], COMPOSITE_SEPARATOR)
        .labelled_by(SYMBOL_FIELD);
    group(records, &key, EVENT_DATE_FIELD, AVERAGE_IMPACT_FIELD)
}

/// A single dated line, e.g., historical or forecast prices of one ticker.
pub fn price_series(name: &str, points: &[PricePoint]) -> Series {
    let (x, y) = points
        .iter()
        .map(|p| (Datum::Date(p.date), Datum::Number(p.price)))
        .unzip();
    Series::from_parts(name, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str, date: &str, field: &str, value: f64) -> FlatRecord {
        FlatRecord::new()
            .with(SYMBOL_FIELD, symbol)
            .with(EVENT_DATE_FIELD, date)
            .with(field, value)
    }

    #[test]
    fn empty_input_gives_no_series() {
        assert!(impact_series(&[]).is_empty());
        assert!(average_impact_series(&[]).is_empty());
    }

    #[test]
    fn groups_by_symbol_in_first_seen_order() {
        let records = vec![
            row("LV", "2024-01-01", IMPACT_FIELD, 2.0),
            row("CHN", "2024-01-01", IMPACT_FIELD, -1.0),
            row("LV", "2024-01-02", IMPACT_FIELD, 3.0),
        ];
        let series = impact_series(&records);
        assert_eq!(
            series,
            vec![
                Series::from_parts(
                    "LV",
                    vec!["2024-01-01".into(), "2024-01-02".into()],
                    vec![2.0.into(), 3.0.into()],
                ),
                Series::from_parts("CHN", vec!["2024-01-01".into()], vec![(-1.0).into()]),
            ]
        );
    }

    #[test]
    fn composite_key_groups_finely_but_labels_by_symbol() {
        let records = vec![
            row("LV", "2024-02-01", AVERAGE_IMPACT_FIELD, 5.0),
            row("LV", "2024-02-08", AVERAGE_IMPACT_FIELD, 1.0),
            row("LV", "2024-02-01", AVERAGE_IMPACT_FIELD, 4.0),
        ];
        let key = GroupKey::composite(&[EVENT_DATE_FIELD, SYMBOL_FIELD], COMPOSITE_SEPARATOR)
            .labelled_by(SYMBOL_FIELD);
        assert_eq!(key.key_of(&records[0]), "2024-02-01 - LV");

        let series = average_impact_series(&records);
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|s| s.name == "LV"));
        assert_eq!(series[0].y, vec![Datum::Number(5.0), Datum::Number(4.0)]);
        assert_eq!(series[1].y, vec![Datum::Number(1.0)]);
    }

    #[test]
    fn duplicate_x_values_are_kept_in_input_order() {
        let records = vec![
            row("LV", "2024-01-02", IMPACT_FIELD, 1.0),
            row("LV", "2024-01-01", IMPACT_FIELD, 2.0),
            row("LV", "2024-01-02", IMPACT_FIELD, 3.0),
        ];
        let series = impact_series(&records);
        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].x,
            vec![
                Datum::from("2024-01-02"),
                Datum::from("2024-01-01"),
                Datum::from("2024-01-02")
            ]
        );
    }

    #[test]
    fn missing_key_groups_under_empty_name() {
        let records = vec![
            FlatRecord::new()
                .with(EVENT_DATE_FIELD, "2024-01-01")
                .with(IMPACT_FIELD, 1.0),
            row("LV", "2024-01-01", IMPACT_FIELD, 2.0),
            FlatRecord::new()
                .with(SYMBOL_FIELD, Value::Null)
                .with(EVENT_DATE_FIELD, "2024-01-02")
                .with(IMPACT_FIELD, 3.0),
        ];
        let series = impact_series(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "");
        assert_eq!(series[0].len(), 2);
        assert_eq!(series[1].name, "LV");
    }

    #[test]
    fn records_missing_value_fields_are_skipped() {
        let records = vec![
            FlatRecord::new()
                .with(SYMBOL_FIELD, "GHOST")
                .with(EVENT_DATE_FIELD, "2024-01-01"),
            row("LV", "2024-01-01", IMPACT_FIELD, 2.0),
            FlatRecord::new()
                .with(SYMBOL_FIELD, "LV")
                .with(IMPACT_FIELD, 9.0),
            FlatRecord::new()
                .with(SYMBOL_FIELD, "LV")
                .with(EVENT_DATE_FIELD, "2024-01-03")
                .with(IMPACT_FIELD, Value::Null),
        ];
        let series = impact_series(&records);
        assert_eq!(series.len(), 1, "a skipped record opens no series");
        assert_eq!(series[0].name, "LV");
        assert_eq!(series[0].len(), 1);
    }

    #[test]
    fn grouping_is_repeatable() {
        let records = vec![
            row("A", "d1", SENTIMENT_FIELD, 0.1),
            row("B", "d1", SENTIMENT_FIELD, 0.2),
            row("A", "d2", SENTIMENT_FIELD, 0.3),
        ];
        assert_eq!(sentiment_series(&records), sentiment_series(&records));
    }

    #[test]
    fn label_field_is_ignored_for_single_field_keys() {
        let key = GroupKey::field(SYMBOL_FIELD).labelled_by(EVENT_DATE_FIELD);
        assert_eq!(key, GroupKey::field(SYMBOL_FIELD));
    }

    #[test]
    fn price_series_is_a_single_dated_line() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = price_series(
            "Historical Prices",
            &[PricePoint { date, price: 101.5 }],
        );
        assert_eq!(series.name, "Historical Prices");
        assert_eq!(series.x, vec![Datum::Date(date)]);
        assert_eq!(series.y, vec![Datum::Number(101.5)]);
        assert_eq!(
            serde_json::to_value(&series).unwrap(),
            serde_json::json!({"name": "Historical Prices", "x": ["2024-01-01"], "y": [101.5]})
        );
    }

    #[test]
    #[should_panic(expected = "diverged")]
    #[cfg(debug_assertions)]
    fn mismatched_parts_fail_loudly() {
        let _ = Series::from_parts("bad", vec![Datum::Number(1.0)], vec![]);
    }
}
