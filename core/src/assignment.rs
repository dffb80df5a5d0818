//! Per-run student assignments: account and performance tier.
//!
//! Both maps are built once, before any activity is expanded, and are
//! read-only afterwards. A student's account never changes mid-run.

use crate::{
    config::GeneratorConfig,
    rng::PhaseRng,
    types::{AccountId, StudentId, SENTINEL_ACCOUNT},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    High,
    Low,
    Average,
}

/// StudentId -> AccountId, where the account may be SENTINEL_ACCOUNT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentAccountAssignment {
    accounts: HashMap<StudentId, AccountId>,
}

impl StudentAccountAssignment {
    /// Draw one account per student, uniformly from accounts + {0}.
    pub fn draw(student_ids: &[StudentId], account_ids: &[AccountId], rng: &mut PhaseRng) -> Self {
        let mut choices = account_ids.to_vec();
        choices.push(SENTINEL_ACCOUNT);
        let accounts = student_ids
            .iter()
            .map(|&s| {
                let account = choices[rng.next_u64_below(choices.len() as u64) as usize];
                (s, account)
            })
            .collect();
        Self { accounts }
    }

    pub fn account_for(&self, student_id: StudentId) -> Option<AccountId> {
        self.accounts.get(&student_id).copied()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// StudentId -> PerformanceTier, three disjoint classes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierAssignment {
    tiers: HashMap<StudentId, PerformanceTier>,
}

impl TierAssignment {
    /// High: floor(high_share * n) students without replacement.
    /// Low: floor(low_share * n) of the *full* roster size, drawn from the
    /// remainder and clamped to what is left. Everyone else is Average.
    pub fn draw(student_ids: &[StudentId], config: &GeneratorConfig, rng: &mut PhaseRng) -> Self {
        let n = student_ids.len();
        let high_count = (config.high_tier_share * n as f64).floor() as usize;
        let high = rng.sample_without_replacement(student_ids, high_count);

        let remainder: Vec<StudentId> = student_ids
            .iter()
            .filter(|s| !high.contains(*s))
            .copied()
            .collect();
        let requested_low = (config.low_tier_share * n as f64).floor() as usize;
        if requested_low > remainder.len() {
            log::warn!(
                "assignment: low tier wants {requested_low} students, only {} remain; clamping",
                remainder.len()
            );
        }
        let low = rng.sample_without_replacement(&remainder, requested_low);

        let mut tiers: HashMap<StudentId, PerformanceTier> = student_ids
            .iter()
            .map(|&s| (s, PerformanceTier::Average))
            .collect();
        for s in high {
            tiers.insert(s, PerformanceTier::High);
        }
        for s in low {
            tiers.insert(s, PerformanceTier::Low);
        }
        Self { tiers }
    }

    /// Students missing from the map are Average.
    pub fn tier_for(&self, student_id: StudentId) -> PerformanceTier {
        self.tiers
            .get(&student_id)
            .copied()
            .unwrap_or(PerformanceTier::Average)
    }

    pub fn count(&self, tier: PerformanceTier) -> usize {
        self.tiers.values().filter(|t| **t == tier).count()
    }

    pub fn students_in(&self, tier: PerformanceTier) -> Vec<StudentId> {
        let mut ids: Vec<StudentId> = self
            .tiers
            .iter()
            .filter(|(_, t)| **t == tier)
            .map(|(s, _)| *s)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Both per-run maps, built together in the assignment phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunAssignment {
    pub accounts: StudentAccountAssignment,
    pub tiers: TierAssignment,
}

impl RunAssignment {
    pub fn draw(
        student_ids: &[StudentId],
        account_ids: &[AccountId],
        config: &GeneratorConfig,
        rng: &mut PhaseRng,
    ) -> Self {
        let accounts = StudentAccountAssignment::draw(student_ids, account_ids, rng);
        let tiers = TierAssignment::draw(student_ids, config, rng);
        log::debug!(
            "assignment: {} students, tiers high={} low={} average={}",
            accounts.len(),
            tiers.count(PerformanceTier::High),
            tiers.count(PerformanceTier::Low),
            tiers.count(PerformanceTier::Average)
        );
        Self { accounts, tiers }
    }
}
