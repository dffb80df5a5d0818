//! activity-runner: headless generation runner.
//!
//! Usage:
//!   activity-runner --seed 12345 --trends trends.json --db activities.db
//!   activity-runner --seed 7 --db activities.db --roster-from-db
//!
//! Without --trends, the series is read from the google_trends table.

use activity_sim_core::{
    config::SimConfig,
    engine::{ActivityEngine, RunSummary},
    store::SimStore,
    trend::{JsonFileTrendSource, StoreTrendSource, TrendSeriesFetcher},
    types::Roster,
};
use anyhow::{Context, Result};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let students = parse_arg(&args, "--students", 100usize);
    let accounts = parse_arg(&args, "--accounts", 20usize);
    let roster_from_db = args.iter().any(|a| a == "--roster-from-db");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let trends_path = str_arg(&args, "--trends");

    let mut config = match str_arg(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(keyword) = str_arg(&args, "--keyword") {
        config.trend.keyword = keyword.to_string();
    }
    if let Some(geo) = str_arg(&args, "--geo") {
        config.trend.geo = geo.to_string();
    }

    println!("activity-runner");
    println!("  seed:      {seed}");
    println!("  db:        {db}");
    println!("  keyword:   {} ({})", config.trend.keyword, config.trend.geo);
    println!("  trends:    {}", trends_path.unwrap_or("google_trends table"));
    println!();

    let store = SimStore::open(db).with_context(|| format!("failed to open {db}"))?;
    store.migrate()?;

    let roster = if roster_from_db {
        store.load_roster()?
    } else {
        let roster = Roster::sequential(students, accounts);
        store.seed_roster(&roster)?;
        roster
    };
    if roster.student_ids.is_empty() {
        log::warn!("roster has no students; nothing will be generated");
    }

    // Cache a file series into google_trends so reruns can skip the file.
    if let Some(path) = trends_path {
        let source = JsonFileTrendSource::new(path);
        let points = TrendSeriesFetcher::new(&source, config.trend.window_days)
            .fetch(&config.trend.keyword, &config.trend.geo);
        store.store_trend_points(&config.trend.keyword, &config.trend.geo, &points)?;
    }

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());
    let engine = ActivityEngine::build(run_id, seed, config, store)?;
    let (summary, _dataset) = {
        let source = StoreTrendSource::new(&engine.store);
        engine.run(&source, &roster)?
    };
    print_summary(&summary, &roster);
    engine.close()?;
    Ok(())
}

fn print_summary(summary: &RunSummary, roster: &Roster) {
    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {}", summary.run_id);
    println!("  students:      {}", roster.student_ids.len());
    println!("  accounts:      {}", roster.account_ids.len());
    println!("  trend points:  {}", summary.trend_points);
    println!("  originals:     {}", summary.original_records);
    println!("  duplicates:    {}", summary.duplicate_records);
    println!("  saved rows:    {}", summary.saved_records);
    if summary.trend_points > 0 {
        let per_day = summary.original_records as f64 / summary.trend_points as f64;
        println!("  avg per day:   {per_day:.1}");
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
