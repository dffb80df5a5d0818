//! The activity generator.
//!
//! PHASE ORDER (fixed, never reordered):
//!   1. Assignment   accounts and performance tiers, once per run
//!   2. Expansion    trend points -> activity records, in date order
//!   3. Correlation  quizzes pulled onto movie dates (batch-level)
//!   4. Duplication  corrupted duplicate rows appended
//!
//! Each phase draws from its own RngBank slot.

use crate::{
    activity::{ActivityRecord, GeneratedDataset, ResourceType},
    assignment::RunAssignment,
    config::GeneratorConfig,
    error::SimResult,
    rng::{PhaseRng, PhaseSlot, RngBank},
    score::quiz_score,
    trend::TrendPoint,
    types::{Roster, SENTINEL_ACCOUNT},
};
use chrono::{Duration, NaiveDate, NaiveTime};
use std::collections::BTreeSet;

pub struct ActivityGenerator {
    config: GeneratorConfig,
    rng_bank: RngBank,
}

impl ActivityGenerator {
    /// Rejects configs whose ranges or probabilities cannot be drawn from.
    pub fn new(config: GeneratorConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng_bank: RngBank::new(seed),
        })
    }

    /// Run all four phases over one trend series and roster.
    pub fn generate(&self, trends: &[TrendPoint], roster: &Roster) -> GeneratedDataset {
        let mut assignment_rng = self.rng_bank.for_phase(PhaseSlot::Assignment);
        let assignment = RunAssignment::draw(
            &roster.student_ids,
            &roster.account_ids,
            &self.config,
            &mut assignment_rng,
        );

        let mut expansion_rng = self.rng_bank.for_phase(PhaseSlot::Expansion);
        let mut records = self.expand(trends, roster, &assignment, &mut expansion_rng);

        let mut correlation_rng = self.rng_bank.for_phase(PhaseSlot::Correlation);
        let moved = self.correlate_quizzes_with_movies(&mut records, &mut correlation_rng);

        let mut duplication_rng = self.rng_bank.for_phase(PhaseSlot::Duplication);
        let dataset = self.inject_duplicates(records, &mut duplication_rng);

        log::info!(
            "generator: {} trend points -> {} records ({} originals, {} duplicates, {} quizzes moved)",
            trends.len(),
            dataset.len(),
            dataset.original_count,
            dataset.duplicate_count(),
            moved
        );
        dataset
    }

    /// Turn each trend point into records for that day's active students.
    pub fn expand(
        &self,
        trends: &[TrendPoint],
        roster: &Roster,
        assignment: &RunAssignment,
        rng: &mut PhaseRng,
    ) -> Vec<ActivityRecord> {
        let mut records = Vec::new();
        for point in trends {
            let active_count = active_students_for(point.frequency, roster.student_ids.len());
            let active = rng.sample_without_replacement(&roster.student_ids, active_count);
            let timestamp = point.date.and_time(NaiveTime::MIN);

            for student_id in active {
                // Always the pre-assigned account. Never redrawn per record.
                let account_id = assignment
                    .accounts
                    .account_for(student_id)
                    .unwrap_or(SENTINEL_ACCOUNT);
                let tier = assignment.tiers.tier_for(student_id);

                for _ in 0..self.interaction_count(rng) {
                    let resource_type = if rng.chance(self.config.movie_probability) {
                        ResourceType::Movie
                    } else {
                        ResourceType::Quiz
                    };
                    let (score, quiz_id) = match resource_type {
                        ResourceType::Quiz => {
                            let score = quiz_score(&self.config.score_models, tier, rng);
                            let (lo, hi) = self.config.quiz_id_range;
                            (score, Some(rng.range_inclusive(lo, hi)))
                        }
                        ResourceType::Movie => (0, None),
                    };
                    let (id_lo, id_hi) = self.config.record_id_range;
                    records.push(ActivityRecord {
                        id: rng.range_inclusive(id_lo, id_hi - 1),
                        date: point.date,
                        student_id,
                        account_id,
                        resource_type,
                        score,
                        quiz_id,
                        last_updated_timestamp: timestamp,
                    });
                }
            }
            log::debug!(
                "generator: {} frequency={:.1} active={active_count}",
                point.date,
                point.frequency
            );
        }
        records
    }

    /// max(min, round(Normal(mean, std_dev))).
    fn interaction_count(&self, rng: &mut PhaseRng) -> u32 {
        let i = &self.config.interactions;
        let draw = rng.normal(i.mean, i.std_dev).round();
        if draw < f64::from(i.min) {
            i.min
        } else {
            draw as u32
        }
    }

    /// Move each quiz onto a random movie date with the configured
    /// probability. Returns how many quizzes were moved.
    pub fn correlate_quizzes_with_movies(
        &self,
        records: &mut [ActivityRecord],
        rng: &mut PhaseRng,
    ) -> usize {
        let movie_dates: Vec<NaiveDate> = records
            .iter()
            .filter(|r| r.is_movie())
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if movie_dates.is_empty() {
            return 0;
        }

        let mut moved = 0;
        for record in records.iter_mut().filter(|r| r.is_quiz()) {
            if !rng.chance(self.config.quiz_follows_movie_probability) {
                continue;
            }
            if let Some(&date) = rng.choose(&movie_dates) {
                record.date = date;
                moved += 1;
            }
        }
        moved
    }

    /// Append floor(len * duplication_rate) rows sampled with replacement,
    /// each with the sentinel account and one shared timestamp shift.
    pub fn inject_duplicates(
        &self,
        records: Vec<ActivityRecord>,
        rng: &mut PhaseRng,
    ) -> GeneratedDataset {
        let original_count = records.len();
        let num_duplicates = (original_count as f64 * self.config.duplication_rate).floor() as usize;
        let sources = rng.sample_indices_with_replacement(original_count, num_duplicates);

        let (lo, hi) = self.config.duplicate_shift_seconds;
        // One shift per call, applied to every duplicate.
        let shift = Duration::seconds(rng.range_inclusive(lo, hi));

        let mut all = records;
        all.reserve(sources.len());
        for &src in &sources {
            let mut dup = all[src].clone();
            dup.account_id = SENTINEL_ACCOUNT;
            dup.last_updated_timestamp -= shift;
            all.push(dup);
        }
        log::debug!(
            "generator: injected {} duplicates shifted by {}s",
            sources.len(),
            shift.num_seconds()
        );

        GeneratedDataset {
            records: all,
            original_count,
            duplicate_sources: sources,
        }
    }
}

/// floor(frequency), clamped to the roster size.
pub fn active_students_for(frequency: f64, roster_size: usize) -> usize {
    if !frequency.is_finite() || frequency <= 0.0 {
        return 0;
    }
    (frequency.floor() as usize).min(roster_size)
}
