//! Windowed sampling backend.
//!
//! Entries are bucketed by level and a hash of the message. Within each
//! window, the first `first` entries of a bucket pass, then one in every
//! `thereafter`. Counters reset lazily when a write lands past the window.
//!
//! # Design Decisions
//! - Fixed bucket array, no allocation per message; distinct messages that
//!   hash to one bucket share a budget
//! - Lock-free counters: concurrent writers may both see a fresh window and
//!   race on the reset, the loser just counts into the winner's window

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Backend, Entry};

const COUNTERS_PER_LEVEL: usize = 4096;
const LEVELS: usize = 4;

#[derive(Debug, Default)]
struct Counter {
    reset_at: AtomicI64,
    count: AtomicU64,
}

impl Counter {
    fn inc_check_reset(&self, now: i64, tick: i64) -> u64 {
        let reset_after = self.reset_at.load(Ordering::Relaxed);
        if reset_after > now {
            return self.count.fetch_add(1, Ordering::Relaxed) + 1;
        }

        self.count.store(1, Ordering::Relaxed);
        let new_reset_after = now.saturating_add(tick);
        if self
            .reset_at
            .compare_exchange(reset_after, new_reset_after, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return self.count.fetch_add(1, Ordering::Relaxed) + 1;
        }
        1
    }
}

/// Rate limiting wrapper around another backend.
pub struct Sampler {
    inner: Arc<dyn Backend>,
    tick: i64,
    first: u64,
    thereafter: u64,
    epoch: Instant,
    counters: Box<[Counter]>,
}

impl Sampler {
    /// Pass `first` entries per bucket and window, then every `thereafter`-th.
    /// A `thereafter` of zero drops everything past the burst.
    pub fn new(inner: Arc<dyn Backend>, tick: Duration, first: u64, thereafter: u64) -> Self {
        let counters = (0..LEVELS * COUNTERS_PER_LEVEL)
            .map(|_| Counter::default())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            inner,
            tick: i64::try_from(tick.as_nanos()).unwrap_or(i64::MAX),
            first,
            thereafter,
            epoch: Instant::now(),
            counters,
        }
    }

    fn counter(&self, entry: &Entry<'_>) -> &Counter {
        let bucket = fnv32a(entry.message) as usize % COUNTERS_PER_LEVEL;
        &self.counters[entry.level as usize * COUNTERS_PER_LEVEL + bucket]
    }

    fn allow(&self, entry: &Entry<'_>) -> bool {
        let now = i64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(i64::MAX);
        let n = self.counter(entry).inc_check_reset(now, self.tick);
        if n <= self.first {
            return true;
        }
        self.thereafter != 0 && (n - self.first) % self.thereafter == 0
    }
}

impl Backend for Sampler {
    fn write(&self, entry: &Entry<'_>) {
        if self.allow(entry) {
            self.inner.write(entry);
        }
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("inner", &self.inner)
            .field("tick_ns", &self.tick)
            .field("first", &self.first)
            .field("thereafter", &self.thereafter)
            .finish()
    }
}

fn fnv32a(s: &str) -> u32 {
    const OFFSET: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;
    s.bytes()
        .fold(OFFSET, |hash, b| (hash ^ b as u32).wrapping_mul(PRIME))
}
