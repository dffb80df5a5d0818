//! Trend series fetcher tests.
//!
//! Verifies:
//!   - Source errors and empty sources both become an empty series
//!   - Values labelled by keyword are normalized to `frequency`
//!   - Output is date-ordered and trimmed to the trailing window
//!   - The google_trends cache round-trips through the store

use activity_sim_core::{
    config::SimConfig,
    error::{SimError, SimResult},
    store::SimStore,
    trend::{
        normalize, JsonFileTrendSource, RawTrendRow, StaticTrendSource, StoreTrendSource,
        TrendPoint, TrendSeriesFetcher, TrendSource,
    },
};
use chrono::NaiveDate;

struct FailingSource;

impl TrendSource for FailingSource {
    fn fetch(&self, _keyword: &str, _geo: &str) -> SimResult<Vec<RawTrendRow>> {
        Err(SimError::TrendSource {
            reason: "429 Too Many Requests".into(),
        })
    }
}

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(n)
}

#[test]
fn source_error_degrades_to_empty() {
    let source = FailingSource;
    let points = TrendSeriesFetcher::new(&source, 90).fetch("BrainPOP", "US");
    assert!(points.is_empty());
}

#[test]
fn empty_source_returns_empty() {
    let source = StaticTrendSource::default();
    let points = TrendSeriesFetcher::new(&source, 90).fetch("BrainPOP", "US");
    assert!(points.is_empty());
}

#[test]
fn keyword_column_is_renamed_to_frequency() {
    let source = StaticTrendSource::new(vec![
        RawTrendRow::new(day(1), "BrainPOP", 42.0),
        RawTrendRow::new(day(0), "BrainPOP", 17.0),
    ]);
    let points = TrendSeriesFetcher::new(&source, 90).fetch("BrainPOP", "US");
    assert_eq!(
        points,
        vec![TrendPoint::new(day(0), 17.0), TrendPoint::new(day(1), 42.0)]
    );
}

#[test]
fn unusable_rows_are_dropped() {
    let rows = vec![
        RawTrendRow::new(day(0), "BrainPOP", 10.0),
        RawTrendRow::new(day(1), "BrainPOP", -3.0),
        RawTrendRow::new(day(2), "SomethingElse", 8.0),
        RawTrendRow::new(day(3), "frequency", 5.0),
    ];
    let points = normalize(&rows, "BrainPOP", 90);
    assert_eq!(
        points,
        vec![TrendPoint::new(day(0), 10.0), TrendPoint::new(day(3), 5.0)]
    );
}

#[test]
fn window_keeps_trailing_days_only() {
    let rows: Vec<_> = (0..120)
        .map(|d| RawTrendRow::new(day(d), "frequency", d as f64))
        .collect();
    let points = normalize(&rows, "BrainPOP", 90);

    assert_eq!(points.len(), 90);
    assert_eq!(points.first().unwrap().date, day(30));
    assert_eq!(points.last().unwrap().date, day(119));
    assert!(points.windows(2).all(|w| w[0].date <= w[1].date));
}

#[test]
fn json_export_with_extra_columns_parses() {
    let path = std::env::temp_dir().join(format!("trends-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"[
            {"date": "2024-01-02", "BrainPOP": 55, "isPartial": false},
            {"date": "2024-01-01", "BrainPOP": 61, "isPartial": false},
            {"date": "2024-01-03", "BrainPOP": 12, "isPartial": true}
        ]"#,
    )
    .unwrap();

    let source = JsonFileTrendSource::new(path.to_string_lossy().to_string());
    let points = TrendSeriesFetcher::new(&source, 90).fetch("BrainPOP", "US");
    std::fs::remove_file(&path).ok();

    assert_eq!(points.len(), 3);
    assert_eq!(points[0], TrendPoint::new(day(0), 61.0));
    assert_eq!(points[2], TrendPoint::new(day(2), 12.0));
}

#[test]
fn missing_json_file_is_just_no_data() {
    let source = JsonFileTrendSource::new("/definitely/not/here/trends.json");
    let points = TrendSeriesFetcher::new(&source, 90).fetch("BrainPOP", "US");
    assert!(points.is_empty());
}

#[test]
fn store_cache_round_trips() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();

    let points: Vec<_> = (0..10).map(|d| TrendPoint::new(day(d), 10.0 + d as f64)).collect();
    store.store_trend_points("BrainPOP", "US", &points).unwrap();
    // Re-storing upserts instead of duplicating.
    store.store_trend_points("BrainPOP", "US", &points[..3]).unwrap();
    store
        .store_trend_points("BrainPOP", "GB", &[TrendPoint::new(day(0), 99.0)])
        .unwrap();

    let source = StoreTrendSource::new(&store);
    let fetched = TrendSeriesFetcher::new(&source, 90).fetch("BrainPOP", "US");
    assert_eq!(fetched, points);
}

#[test]
fn oversized_window_keeps_every_point() {
    let mut config = SimConfig::default();
    config.trend.window_days = u32::MAX;
    config.validate().unwrap();

    let points: Vec<_> = (0..5).map(|d| TrendPoint::new(day(d), 3.0)).collect();
    let source = StaticTrendSource::from_points(&points);
    let fetched = TrendSeriesFetcher::new(&source, config.trend.window_days)
        .fetch(&config.trend.keyword, &config.trend.geo);
    assert_eq!(fetched, points);
}

#[test]
fn non_numeric_keyword_column_falls_back_to_frequency() {
    let rows: Vec<RawTrendRow> = serde_json::from_str(
        r#"[
            {"date": "2024-01-01", "BrainPOP": null, "frequency": 12},
            {"date": "2024-01-02", "BrainPOP": "<1", "frequency": 4},
            {"date": "2024-01-03", "BrainPOP": 9, "frequency": 100}
        ]"#,
    )
    .unwrap();
    let points = normalize(&rows, "BrainPOP", 90);
    assert_eq!(
        points,
        vec![
            TrendPoint::new(day(0), 12.0),
            TrendPoint::new(day(1), 4.0),
            TrendPoint::new(day(2), 9.0),
        ]
    );
}
