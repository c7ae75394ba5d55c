//! Synchronized random stream
//!
//! Every random decision of the simulation (bombardment jitter, missile
//! scatter, autocast target picks) draws from one seeded ChaCha stream that
//! all participants of a session share. There is no entropy constructor.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Shared deterministic random stream
///
/// Wraps ChaCha8Rng and counts how many values were drawn, so a restored
/// stream can be fast-forwarded to the exact same position.
#[derive(Debug, Clone)]
pub struct SyncRng {
    rng: ChaCha8Rng,
    seed: u64,
    draws: u64,
}

#[derive(Serialize, Deserialize)]
struct SyncRngState {
    seed: u64,
    draws: u64,
}

// Only the seed and position are serialized; the stream is replayed on load
impl Serialize for SyncRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        SyncRngState {
            seed: self.seed,
            draws: self.draws,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SyncRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let state = SyncRngState::deserialize(deserializer)?;
        let mut rng = SyncRng::new(state.seed);
        rng.skip(state.draws);
        Ok(rng)
    }
}

impl SyncRng {
    /// Create the session stream from the seed agreed by all participants
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Seed the stream was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Next value of the stream, in `0..=i32::MAX`
    pub fn sync_rand(&mut self) -> i32 {
        self.draws += 1;
        (self.rng.next_u32() >> 1) as i32
    }

    /// `sync_rand() % n`
    ///
    /// Returns 0 without consuming the stream if n is not positive.
    pub fn rand_below(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.sync_rand() % n
    }

    fn skip(&mut self, draws: u64) {
        for _ in 0..draws {
            self.sync_rand();
        }
    }
}
