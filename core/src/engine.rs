//! The run engine: one generation run from trend source to storage.
//!
//! EXECUTION ORDER (fixed):
//!   1. Record the run
//!   2. Fetch the trend series (never fails; may be empty)
//!   3. Generate the dataset
//!   4. Persist it (no-op when empty)
//!   5. Record the counts

use crate::{
    activity::GeneratedDataset,
    config::SimConfig,
    error::SimResult,
    generator::ActivityGenerator,
    persist::save_activities,
    store::SimStore,
    trend::{TrendSeriesFetcher, TrendSource},
    types::{Roster, RunId},
};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub seed: u64,
    pub trend_points: usize,
    pub original_records: usize,
    pub duplicate_records: usize,
    pub saved_records: usize,
}

pub struct ActivityEngine {
    pub run_id: RunId,
    pub config: SimConfig,
    pub store: SimStore,
    seed: u64,
    generator: ActivityGenerator,
}

impl ActivityEngine {
    /// Build an engine over a migrated store. Rejects invalid configs.
    pub fn build(run_id: RunId, seed: u64, config: SimConfig, store: SimStore) -> SimResult<Self> {
        config.validate()?;
        let generator = ActivityGenerator::new(config.generator.clone(), seed)?;
        Ok(Self {
            run_id,
            config,
            store,
            seed,
            generator,
        })
    }

    /// In-memory store, default config. Used by tests.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        Self::build(run_id, seed, SimConfig::default(), store)
    }

    /// Fetch, generate and persist. Returns the generated dataset too so
    /// callers can inspect what was written.
    pub fn run(
        &self,
        source: &dyn TrendSource,
        roster: &Roster,
    ) -> SimResult<(RunSummary, GeneratedDataset)> {
        let trend = &self.config.trend;
        self.store.insert_run(
            &self.run_id,
            self.seed,
            env!("CARGO_PKG_VERSION"),
            &trend.keyword,
            &trend.geo,
        )?;

        let fetcher = TrendSeriesFetcher::new(source, trend.window_days);
        let points = fetcher.fetch(&trend.keyword, &trend.geo);

        let dataset = self.generator.generate(&points, roster);
        let saved = save_activities(&dataset, &self.store, &self.config.target_table)?;

        self.store.finish_run(
            &self.run_id,
            points.len(),
            dataset.original_count,
            dataset.duplicate_count(),
        )?;

        let summary = RunSummary {
            run_id: self.run_id.clone(),
            seed: self.seed,
            trend_points: points.len(),
            original_records: dataset.original_count,
            duplicate_records: dataset.duplicate_count(),
            saved_records: saved,
        };
        log::info!(
            "run={} seed={}: {} points, {} originals, {} duplicates, {} saved",
            summary.run_id,
            summary.seed,
            summary.trend_points,
            summary.original_records,
            summary.duplicate_records,
            summary.saved_records
        );
        Ok((summary, dataset))
    }

    /// Release the store.
    pub fn close(self) -> SimResult<()> {
        self.store.close()
    }
}
