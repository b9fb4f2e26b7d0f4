use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// What a countdown reports when polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    Running { remaining_secs: u32 },
    /// Reported exactly once per countdown, on the first poll at or past zero.
    Expired,
    Stopped,
}

/// Per-question countdown anchored to a start timestamp.
///
/// Remaining and elapsed time are always recomputed from the anchor, so a
/// delayed or skipped tick never makes the displayed value drift from the
/// wall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    started_at: DateTime<Utc>,
    duration_secs: u32,
    stopped_at: Option<DateTime<Utc>>,
    expiry_reported: bool,
}

impl Countdown {
    #[must_use]
    pub fn start(started_at: DateTime<Utc>, duration_secs: u32) -> Self {
        Self {
            started_at,
            duration_secs,
            stopped_at: None,
            expiry_reported: false,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none() && !self.expiry_reported
    }

    /// Whole seconds since start, floored and clamped to the duration.
    ///
    /// A stopped countdown keeps reporting the value it had when stopped.
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        let until = self.stopped_at.unwrap_or(now);
        let millis = (until - self.started_at).num_milliseconds();
        let whole = u64::try_from(millis).unwrap_or(0) / 1000;
        let whole = u32::try_from(whole).unwrap_or(u32::MAX);
        whole.min(self.duration_secs)
    }

    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        self.duration_secs.saturating_sub(self.elapsed_secs(now))
    }

    pub fn stop(&mut self, now: DateTime<Utc>) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(now);
        }
    }

    /// Poll the countdown at `now`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> CountdownStatus {
        if !self.is_running() {
            return CountdownStatus::Stopped;
        }
        match self.remaining_secs(now) {
            0 => {
                self.expiry_reported = true;
                CountdownStatus::Expired
            }
            remaining_secs => CountdownStatus::Running { remaining_secs },
        }
    }
}
