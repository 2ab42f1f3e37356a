//! System clock, used to stamp landing reports.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Reads the wall clock.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[cfg(test)]
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_clock_is_monotonic_enough() {
        let before = Utc::now();
        let now = LiveClock.now();
        assert!(now >= before);
        assert!(now <= Utc::now());
    }
}
