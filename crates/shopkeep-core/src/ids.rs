//! # Clock and Identifier Generation
//!
//! Record ids look like `ORD-1769300000000-42`:
//!
//! ```text
//! <prefix>-<unix millis>-<random 0..999>
//! ```
//!
//! The format is kept for compatibility with data already written by the
//! browser version of the shop. Within one process the generator never
//! repeats an id: a suffix already handed out in the same millisecond is
//! redrawn, and once all 1000 suffixes of a millisecond are used the
//! generator moves on to the next millisecond. Two processes writing the
//! same store can still collide.

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::LedgerKind;

/// Number of distinct random suffixes per millisecond.
const SUFFIX_SPACE: u16 = 1000;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current time, injected so tests control record dates.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used to stamp records (UTC).
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    /// Starts at midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        FixedClock::new(date.and_time(NaiveTime::default()).and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// =============================================================================
// Record Stamp
// =============================================================================

/// Identity and date given to a record at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStamp {
    pub id: String,
    pub date: NaiveDate,
}

// =============================================================================
// Id Generator
// =============================================================================

#[derive(Debug)]
struct GeneratorState {
    millis: i64,
    issued: HashSet<u16>,
    rng: StdRng,
}

/// Generates `<prefix>-<millis>-<suffix>` ids, unique within the process.
#[derive(Debug)]
pub struct IdGenerator {
    state: Mutex<GeneratorState>,
}

impl IdGenerator {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        IdGenerator {
            state: Mutex::new(GeneratorState {
                millis: i64::MIN,
                issued: HashSet::new(),
                rng,
            }),
        }
    }

    /// Produces the next id for `prefix` at the given instant.
    pub fn generate_at(&self, prefix: &str, now: DateTime<Utc>) -> String {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        // Never step backwards; a rewound clock keeps using the newest millisecond.
        let millis = now.timestamp_millis();
        if millis > state.millis {
            state.millis = millis;
            state.issued.clear();
        }
        if state.issued.len() >= SUFFIX_SPACE as usize {
            state.millis += 1;
            state.issued.clear();
        }

        let suffix = loop {
            let candidate = state.rng.gen_range(0..SUFFIX_SPACE);
            if state.issued.insert(candidate) {
                break candidate;
            }
        };

        format!("{}-{}-{}", prefix, state.millis, suffix)
    }

    /// Produces the next id for `prefix` using `clock`.
    pub fn generate(&self, prefix: &str, clock: &dyn Clock) -> String {
        self.generate_at(prefix, clock.now())
    }

    /// Id and date for a new record of `kind`.
    pub fn stamp(&self, kind: LedgerKind, clock: &dyn Clock) -> RecordStamp {
        let now = clock.now();
        RecordStamp {
            id: self.generate_at(kind.id_prefix(), now),
            date: now.date_naive(),
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
