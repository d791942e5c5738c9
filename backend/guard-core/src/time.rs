//! Clock abstraction so window and age computations can be driven by tests.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;

/// Source of "now" for the guard components.
pub trait Clock: Send + Sync + Debug {
    /// Monotonic instant for window arithmetic.
    fn now(&self) -> Instant;

    /// Local calendar date for age checks.
    fn today(&self) -> NaiveDate;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually advanced clock.
///
/// Clones share the same offset, so a test can keep one handle and give
/// another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
    today: Arc<Mutex<NaiveDate>>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
            today: Arc::new(Mutex::new(today)),
        }
    }

    /// Move monotonic time forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    pub fn set_today(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }

    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}
