//! Time source.
//!
//! Every timestamp written by the learner state (enrollment dates, quiz
//! results, subscriptions) goes through a [`Clock`].

use chrono::{DateTime, Utc};

/// Port for getting the current time.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock using the OS time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;

#[cfg(test)]
mod fixed {
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::Clock;

    /// Clock frozen at a given instant. Can be moved forward.
    #[derive(Debug)]
    pub struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        pub fn new(timestamp: DateTime<Utc>) -> Self {
            Self(Mutex::new(timestamp))
        }

        /// 2026-10-19T09:30:00Z.
        pub fn default_instant() -> Self {
            Self::new(Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap())
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }
}
