use std::cell::Cell;

use time::Duration;

use crate::model::TimeStamp;

/// Source of "now" for rule evaluation. Implementations return local wall-clock
/// time so `hour()` is the user's hour of day.
pub trait Clock {
    fn now(&self) -> TimeStamp;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeStamp {
        // The local offset cannot always be determined (e.g. multi-threaded on unix).
        TimeStamp::now_local().unwrap_or_else(|_| TimeStamp::now_utc())
    }
}

/// Settable clock for tests and replay.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<TimeStamp>,
}

impl ManualClock {
    pub fn new(start: TimeStamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeStamp {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> TimeStamp {
        (**self).now()
    }
}
