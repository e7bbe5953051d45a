//! Seeded input generators for stochastic tests
//!
//! Set `BITE_TEST_SEED` to replay a failing run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("BITE_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// A length-prefixed record: `[n]` followed by `n` payload bytes.
    pub fn record(&mut self) -> Vec<u8> {
        let len = self.geometric(0.8);
        let mut out = format!("[{len}]").into_bytes();
        out.extend((0..len).map(|_| self.rng.gen::<u8>()));
        out
    }

    /// Several records back to back, with their payloads.
    pub fn records(&mut self, count: usize) -> (Vec<u8>, Vec<Vec<u8>>) {
        let mut stream = Vec::new();
        let mut payloads = Vec::with_capacity(count);
        for _ in 0..count {
            let record = self.record();
            let start = record.iter().position(|&b| b == b']').map_or(0, |i| i + 1);
            payloads.push(record[start..].to_vec());
            stream.extend_from_slice(&record);
        }
        (stream, payloads)
    }
}
