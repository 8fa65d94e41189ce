//! Debounce primitives shared by the detectors
//!
//! - [`Debounce`]: condition must hold longer than `hold_us` to fire; fires
//!   once, then stays latched until the condition clears.
//! - [`HoldTimer`]: reports "held long enough" on every tick while the
//!   condition persists; repeats are bounded by a [`Cooldown`].

use crate::domain::dt_us;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounce {
    hold_us: u64,
    since: Option<i64>,
    latched: bool,
}

impl Debounce {
    pub fn new(hold_us: u64) -> Self {
        Self {
            hold_us,
            since: None,
            latched: false,
        }
    }

    /// Advance with this tick's condition. Returns `true` exactly once per
    /// episode, on the first tick the condition has held longer than `hold_us`.
    pub fn update(&mut self, active: bool, now_us: i64) -> bool {
        if !active {
            self.reset();
            return false;
        }
        if self.latched {
            return false;
        }
        let since = *self.since.get_or_insert(now_us);
        if dt_us(now_us, since) > self.hold_us {
            self.latched = true;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.since = None;
        self.latched = false;
    }

    pub fn since(&self) -> Option<i64> {
        self.since
    }

    /// Fired and waiting for the condition to clear.
    pub fn is_latched(&self) -> bool {
        self.latched
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldTimer {
    hold_us: u64,
    since: Option<i64>,
}

impl HoldTimer {
    pub fn new(hold_us: u64) -> Self {
        Self {
            hold_us,
            since: None,
        }
    }

    /// `true` while the condition has held longer than `hold_us`.
    pub fn update(&mut self, active: bool, now_us: i64) -> bool {
        if !active {
            self.since = None;
            return false;
        }
        let since = *self.since.get_or_insert(now_us);
        dt_us(now_us, since) > self.hold_us
    }

    pub fn since(&self) -> Option<i64> {
        self.since
    }
}

/// Minimum spacing between emissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    period_us: u64,
    last: Option<i64>,
}

impl Cooldown {
    pub fn new(period_us: u64) -> Self {
        Self {
            period_us,
            last: None,
        }
    }

    pub fn ready(&self, now_us: i64) -> bool {
        self.last
            .map_or(true, |last| dt_us(now_us, last) > self.period_us)
    }

    pub fn mark(&mut self, now_us: i64) {
        self.last = Some(now_us);
    }
}
