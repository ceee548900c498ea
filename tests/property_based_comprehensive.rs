//! Property-based tests for the profiler core
//!
//! Core properties:
//! 1. Quantization is idempotent and stays within half a cell
//! 2. Top-N ranking is bounded and dominates the rest
//! 3. The call counter equals the number of in-window events
//! 4. Only one hook is ever subscribed
//! 5. The command parser never panics

use hookprof::command::{StartCommand, DEFAULT_COMMAND};
use hookprof::config::ProfilerConfig;
use hookprof::hooks::{HookEvent, HookId};
use hookprof::host::Host;
use hookprof::spatial::{quantize, GridCell, Position, SpatialAggregator};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn position() -> impl Strategy<Value = Position> {
    (-1.0e6..1.0e6f64, -1.0e6..1.0e6f64, -1.0e6..1.0e6f64)
        .prop_map(|(x, y, z)| Position::new(x, y, z))
}

fn hook() -> impl Strategy<Value = HookId> {
    prop::sample::select(HookId::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_quantize_idempotent(p in position()) {
        let once = quantize(p, 100.0);
        prop_assert_eq!(quantize(once, 100.0), once);
    }

    #[test]
    fn prop_quantize_within_half_cell(p in position()) {
        let q = quantize(p, 100.0);
        prop_assert!((q.x - p.x).abs() <= 50.0 + 1e-6);
        prop_assert!((q.y - p.y).abs() <= 50.0 + 1e-6);
        prop_assert!((q.z - p.z).abs() <= 50.0 + 1e-6);
    }

    #[test]
    fn prop_cell_center_is_quantized_position(p in position()) {
        let cell = GridCell::of(p, 100.0).unwrap();
        prop_assert_eq!(cell.center(100.0), quantize(p, 100.0));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_top_n_bounded_and_dominant(
        xs in prop::collection::vec(0i64..20, 0..200),
        n in 0usize..10,
    ) {
        let mut agg = SpatialAggregator::new(100.0);
        for x in &xs {
            agg.increment(Position::new(*x as f64 * 100.0, 0.0, 0.0));
        }

        let top = agg.top_n(n);
        prop_assert!(top.len() <= n);
        prop_assert_eq!(top.len(), n.min(agg.len()));
        for pair in top.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
        }

        // Every returned count is >= every count that was left out
        let all = agg.top_n(usize::MAX);
        if let Some(min_kept) = top.last().map(|h| h.count) {
            for left_out in &all[top.len()..] {
                prop_assert!(min_kept >= left_out.count);
            }
        }
        prop_assert_eq!(all.iter().map(|h| h.count).sum::<u64>(), xs.len() as u64);
    }

    #[test]
    fn prop_call_count_matches_in_window_events(
        before in 0usize..20,
        during in 0usize..50,
        after in 0usize..20,
        active in hook(),
    ) {
        let t0 = Instant::now();
        let mut host = Host::new(&ProfilerConfig::default(), t0);
        let event = HookEvent::sample(active, Some(Position::new(1.0, 2.0, 3.0)));

        for _ in 0..before {
            host.dispatch(&event);
        }
        host.start(active, 1.0).unwrap();
        for _ in 0..during {
            host.dispatch(&event);
        }
        let reports = host.advance_to(t0 + Duration::from_secs(1));
        for _ in 0..after {
            host.dispatch(&event);
        }

        prop_assert_eq!(reports.len(), 1);
        prop_assert_eq!(reports[0].call_count, during as u64);
    }

    #[test]
    fn prop_single_subscription(starts in prop::collection::vec(hook(), 1..10)) {
        let mut host = Host::new(&ProfilerConfig::default(), Instant::now());
        for hook in &starts {
            host.start(*hook, 5.0).unwrap();
            prop_assert_eq!(host.subscriptions(), vec![*hook]);
        }
    }

    #[test]
    fn prop_command_parse_never_panics(args in prop::collection::vec("\\PC{0,12}", 0..4)) {
        let _ = StartCommand::parse(DEFAULT_COMMAND, args.as_slice());
    }
}
