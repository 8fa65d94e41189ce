//! Integrity scoring
//!
//! `100 - Σ deduction(kind)`, clamped to `[0, 100]`. Pure and
//! order-independent; safe to recompute over the same events at any time.

use crate::domain::EventRecord;

pub const MAX_SCORE: u8 = 100;

/// `start ≤ ts ≤ end`; an open end accepts everything from `start` on.
#[inline]
pub fn in_window(ts_us: i64, start_us: i64, end_us: Option<i64>) -> bool {
    ts_us >= start_us && end_us.map_or(true, |end| ts_us <= end)
}

/// Score over events that are already windowed.
pub fn integrity_score<'a, I>(events: I) -> u8
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let total: u64 = events
        .into_iter()
        .map(|e| u64::from(e.event.deduction()))
        .sum();
    u64::from(MAX_SCORE).saturating_sub(total) as u8
}

/// Score over the events inside `[window_start_us, window_end_us]`.
pub fn score(events: &[EventRecord], window_start_us: i64, window_end_us: Option<i64>) -> u8 {
    integrity_score(
        events
            .iter()
            .filter(|e| in_window(e.ts_us, window_start_us, window_end_us)),
    )
}
