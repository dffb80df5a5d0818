//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through PhaseRng instances derived
//! from the single master seed stored on the run record.
//!
//! Each generation phase gets its own RNG stream, seeded deterministically
//! from (master_seed XOR phase_index). This means:
//!   - Changing how many draws one phase makes never shifts another phase.
//!   - Each phase's stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single generation phase.
pub struct PhaseRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl PhaseRng {
    /// Create a phase RNG from the master seed and a stable
    /// phase index. The index must never change once assigned.
    pub fn new(master_seed: u64, phase_index: u64) -> Self {
        let derived_seed = master_seed ^ (phase_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::Rng;
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Roll an integer in [lo, hi]. Requires lo <= hi.
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        use rand::Rng;
        assert!(lo <= hi, "empty range {lo}..={hi}");
        self.inner.gen_range(lo..=hi)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from Normal(mean, std_dev) via the Box-Muller transform.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        // 1 - u keeps the log argument in (0, 1].
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + z * std_dev
    }

    /// Pick one element uniformly. None for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }

    /// Draw `k` distinct elements (partial Fisher-Yates).
    /// `k` larger than the pool returns the whole pool, shuffled.
    pub fn sample_without_replacement<T: Clone>(&mut self, items: &[T], k: usize) -> Vec<T> {
        let mut pool: Vec<T> = items.to_vec();
        let k = k.min(pool.len());
        for i in 0..k {
            let j = i + self.next_u64_below((pool.len() - i) as u64) as usize;
            pool.swap(i, j);
        }
        pool.truncate(k);
        pool
    }

    /// Draw `k` indices in [0, n) with replacement.
    pub fn sample_indices_with_replacement(&mut self, n: usize, k: usize) -> Vec<usize> {
        if n == 0 {
            return Vec::new();
        }
        (0..k)
            .map(|_| self.next_u64_below(n as u64) as usize)
            .collect()
    }
}

/// All phase RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_phase(&self, slot: PhaseSlot) -> PhaseRng {
        PhaseRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable phase slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every phase's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum PhaseSlot {
    Assignment = 0,
    Expansion = 1,
    Correlation = 2,
    Duplication = 3,
}

impl PhaseSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Expansion => "expansion",
            Self::Correlation => "correlation",
            Self::Duplication => "duplication",
        }
    }
}
