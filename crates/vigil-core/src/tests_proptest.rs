use proptest::prelude::*;

/// Property-based tests for the scorer and the debounce timers

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::Debounce;
    use crate::domain::{EventKind, EventRecord};
    use crate::scoring::{integrity_score, score};

    fn kind_strategy() -> impl Strategy<Value = EventKind> {
        prop::sample::select(EventKind::ALL.to_vec())
    }

    fn events_strategy() -> impl Strategy<Value = Vec<EventRecord>> {
        prop::collection::vec(
            (kind_strategy(), 0i64..100_000_000i64)
                .prop_map(|(kind, ts)| EventRecord::new(kind, ts)),
            0..60,
        )
    }

    // =========================================================================
    // Score bounds, monotonicity, purity
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_score_bounded(events in events_strategy()) {
            let s = integrity_score(&events);
            prop_assert!(s <= 100);
        }

        #[test]
        fn test_score_never_increases_on_append(
            events in events_strategy(),
            kind in kind_strategy(),
            ts in 0i64..100_000_000i64,
        ) {
            let before = integrity_score(&events);
            let mut longer = events.clone();
            longer.push(EventRecord::new(kind, ts));
            let after = integrity_score(&longer);
            prop_assert!(after <= before);
            prop_assert!(u32::from(before - after) <= kind.deduction());
        }

        #[test]
        fn test_score_is_pure_and_order_independent(events in events_strategy()) {
            let first = integrity_score(&events);
            prop_assert_eq!(first, integrity_score(&events));

            let mut reversed = events.clone();
            reversed.reverse();
            prop_assert_eq!(first, integrity_score(&reversed));
        }

        #[test]
        fn test_window_excludes_outside_events(
            events in events_strategy(),
            start in 0i64..50_000_000i64,
            len in 0i64..50_000_000i64,
        ) {
            let end = start + len;
            let inside: Vec<EventRecord> = events
                .iter()
                .filter(|e| e.ts_us >= start && e.ts_us <= end)
                .cloned()
                .collect();
            prop_assert_eq!(score(&events, start, Some(end)), integrity_score(&inside));
        }
    }

    // =========================================================================
    // Debounce emits at most once per uninterrupted episode
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_debounce_at_most_once_per_episode(
            pattern in prop::collection::vec(any::<bool>(), 1..200),
        ) {
            let mut d = Debounce::new(2_500_000);
            let mut fired_in_episode = false;
            for (i, active) in pattern.iter().enumerate() {
                let fired = d.update(*active, i as i64 * 1_000_000);
                if !*active {
                    fired_in_episode = false;
                }
                if fired {
                    prop_assert!(!fired_in_episode);
                    fired_in_episode = true;
                }
            }
        }
    }
}
