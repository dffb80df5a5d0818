//! Trend series fetching and normalization.
//!
//! RULE: TrendSeriesFetcher::fetch never fails. A source error and an
//! empty source look identical to the caller: an empty series.

use crate::{error::SimResult, store::SimStore};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Column name every normalized point carries its value under.
pub const FREQUENCY_COLUMN: &str = "frequency";

/// One day of interest for a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub frequency: f64,
}

impl TrendPoint {
    pub fn new(date: NaiveDate, frequency: f64) -> Self {
        Self { date, frequency }
    }
}

/// A row as the source labels it: a date plus arbitrary columns.
/// Sources commonly key the value by the keyword itself and may carry
/// extra flags (e.g. `isPartial`) that normalization ignores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrendRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl RawTrendRow {
    pub fn new(date: NaiveDate, label: &str, value: f64) -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(label.to_string(), Value::from(value));
        Self { date, columns }
    }

    /// The numeric value under the keyword's column, else under `frequency`.
    fn value_for(&self, keyword: &str) -> Option<f64> {
        self.columns
            .get(keyword)
            .and_then(Value::as_f64)
            .or_else(|| self.columns.get(FREQUENCY_COLUMN).and_then(Value::as_f64))
    }
}

/// Anything that can supply raw trend rows for a keyword and region.
pub trait TrendSource {
    fn fetch(&self, keyword: &str, geo: &str) -> SimResult<Vec<RawTrendRow>>;
}

/// Fixed rows held in memory. Ignores keyword and geo.
#[derive(Debug, Clone, Default)]
pub struct StaticTrendSource {
    rows: Vec<RawTrendRow>,
}

impl StaticTrendSource {
    pub fn new(rows: Vec<RawTrendRow>) -> Self {
        Self { rows }
    }

    pub fn from_points(points: &[TrendPoint]) -> Self {
        Self {
            rows: points
                .iter()
                .map(|p| RawTrendRow::new(p.date, FREQUENCY_COLUMN, p.frequency))
                .collect(),
        }
    }
}

impl TrendSource for StaticTrendSource {
    fn fetch(&self, _keyword: &str, _geo: &str) -> SimResult<Vec<RawTrendRow>> {
        Ok(self.rows.clone())
    }
}

/// A JSON export: an array of `{"date": "YYYY-MM-DD", "<keyword>": n}` objects.
#[derive(Debug, Clone)]
pub struct JsonFileTrendSource {
    path: String,
}

impl JsonFileTrendSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl TrendSource for JsonFileTrendSource {
    fn fetch(&self, _keyword: &str, _geo: &str) -> SimResult<Vec<RawTrendRow>> {
        let content = std::fs::read_to_string(&self.path)?;
        let rows: Vec<RawTrendRow> = serde_json::from_str(&content)?;
        Ok(rows)
    }
}

/// Reads the `google_trends` table.
pub struct StoreTrendSource<'a> {
    store: &'a SimStore,
}

impl<'a> StoreTrendSource<'a> {
    pub fn new(store: &'a SimStore) -> Self {
        Self { store }
    }
}

impl TrendSource for StoreTrendSource<'_> {
    fn fetch(&self, keyword: &str, geo: &str) -> SimResult<Vec<RawTrendRow>> {
        Ok(self
            .store
            .trend_points(keyword, geo)?
            .into_iter()
            .map(|p| RawTrendRow::new(p.date, keyword, p.frequency))
            .collect())
    }
}

/// Wraps a source with the degrade-to-empty contract and normalization.
pub struct TrendSeriesFetcher<'a> {
    source: &'a dyn TrendSource,
    window_days: u32,
}

impl<'a> TrendSeriesFetcher<'a> {
    pub fn new(source: &'a dyn TrendSource, window_days: u32) -> Self {
        Self { source, window_days }
    }

    /// Date-ordered points for the trailing window. Empty on any failure.
    pub fn fetch(&self, keyword: &str, geo: &str) -> Vec<TrendPoint> {
        let rows = match self.source.fetch(keyword, geo) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("trend: error fetching '{keyword}' ({geo}): {e}");
                return Vec::new();
            }
        };
        if rows.is_empty() {
            log::warn!("trend: no data found for keyword '{keyword}' ({geo})");
            return Vec::new();
        }
        let points = normalize(&rows, keyword, self.window_days);
        log::info!(
            "trend: {} points for '{keyword}' ({geo}) from {} raw rows",
            points.len(),
            rows.len()
        );
        points
    }
}

/// Map raw rows onto (date, frequency), sort by date and keep the
/// trailing window ending at the latest date.
pub fn normalize(rows: &[RawTrendRow], keyword: &str, window_days: u32) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = rows
        .iter()
        .filter_map(|row| match row.value_for(keyword) {
            Some(v) if v.is_finite() && v >= 0.0 => Some(TrendPoint::new(row.date, v)),
            other => {
                log::debug!("trend: dropping row {} with value {other:?}", row.date);
                None
            }
        })
        .collect();
    points.sort_by_key(|p| p.date);

    // A window reaching past NaiveDate::MIN keeps everything.
    let cutoff = points
        .last()
        .and_then(|p| p.date.checked_sub_signed(Duration::days(i64::from(window_days))));
    if let Some(cutoff) = cutoff {
        points.retain(|p| p.date > cutoff);
    }
    points
}
