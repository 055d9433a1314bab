//! Property tests for scoring invariants.
//!
//! Uses proptest to verify:
//! 1. Normalization is monotonic, saturating and symmetric under `reverse`
//! 2. Hard filters partition exactly by their six conditions
//! 3. The composite score stays in [0, 100] on both call paths
//! 4. Ranking is sorted, stable and idempotent

use proptest::prelude::*;

use copyrank::models::{RiskProfile, TraderMetrics};
use copyrank::ranking::{rank, RankedResult};
use copyrank::scoring::{FilterOverrides, HardFilter, Scorer, ScoringStrategy};
use copyrank::normalize;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_profile() -> impl Strategy<Value = RiskProfile> {
    prop_oneof![
        Just(RiskProfile::Conservative),
        Just(RiskProfile::Moderate),
        Just(RiskProfile::Aggressive),
    ]
}

fn arb_strategy() -> impl Strategy<Value = ScoringStrategy> {
    prop_oneof![Just(ScoringStrategy::Evaluation), Just(ScoringStrategy::Leaderboard)]
}

fn arb_range() -> impl Strategy<Value = (f64, f64)> {
    (-500.0..500.0_f64, 0.01..500.0_f64).prop_map(|(min, width)| (min, min + width))
}

fn arb_trader() -> impl Strategy<Value = TraderMetrics> {
    (
        prop::option::of(-100.0..300.0_f64),
        prop::option::of(-100.0..300.0_f64),
        prop::option::of(-100.0..300.0_f64),
        prop::option::of(-100.0..300.0_f64),
        prop::option::of(0.0..80.0_f64),
        prop::option::of(0.0..100.0_f64),
        prop::option::of(0.0..10.0_f64),
        prop::option::of(0..2000_u64),
        prop::option::of(-1e6..1e6_f64),
        prop::option::of(0..500_u64),
    )
        .prop_map(|(r30, r90, r180, roi, dd, wr, lev, followers, pnl, rank)| TraderMetrics {
            roi_30d: r30,
            roi_90d: r90,
            roi_180d: r180,
            roi,
            max_drawdown: dd,
            win_rate: wr,
            avg_leverage: lev,
            followers,
            pnl,
            rank,
            ..TraderMetrics::new("prop")
        })
}

fn arb_scores() -> impl Strategy<Value = Vec<f64>> {
    // coarse values so ties are common
    prop::collection::vec((0..20_u32).prop_map(|s| s as f64 * 5.0), 0..30)
}

fn results(scores: &[f64]) -> Vec<RankedResult> {
    let scorer = Scorer::new(RiskProfile::Moderate, ScoringStrategy::Leaderboard);
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut r = scorer.evaluate(&TraderMetrics::new(format!("t{i}")));
            r.total_score = *s;
            r
        })
        .collect()
}

// ── 1. Normalization ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn normalize_is_monotonic(
        (min, max) in arb_range(),
        a in 0.0..1.0_f64,
        b in 0.0..1.0_f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let v1 = min + lo * (max - min);
        let v2 = min + hi * (max - min);
        prop_assert!(normalize(v1, min, max, false) <= normalize(v2, min, max, false));
    }

    #[test]
    fn normalize_hits_endpoints((min, max) in arb_range()) {
        prop_assert_eq!(normalize(min, min, max, false), 0.0);
        prop_assert_eq!(normalize(max, min, max, false), 100.0);
    }

    #[test]
    fn normalize_saturates((min, max) in arb_range(), v in -5000.0..5000.0_f64) {
        let s = normalize(v, min, max, false);
        prop_assert!((0.0..=100.0).contains(&s));
    }

    #[test]
    fn reverse_mirrors_forward((min, max) in arb_range(), v in -1000.0..1000.0_f64) {
        let forward = normalize(v, min, max, false);
        let reverse = normalize(v, min, max, true);
        prop_assert_eq!(reverse, 100.0 - forward);
    }

    #[test]
    fn degenerate_range_is_neutral(v in -1e6..1e6_f64, m in -1e3..1e3_f64, reverse in any::<bool>()) {
        prop_assert_eq!(normalize(v, m, m, reverse), 50.0);
    }
}

// ── 2. Hard filters ──────────────────────────────────────────────────

proptest! {
    /// Passed traders fail no condition; rejected ones fail at least one and
    /// carry one reason per failed condition.
    #[test]
    fn filter_partition_matches_conditions(
        profile in arb_profile(),
        traders in prop::collection::vec(arb_trader(), 0..25),
    ) {
        let filter = HardFilter::new(profile);
        let l = *filter.limits();

        let failed_conditions = |t: &TraderMetrics| {
            let roi = t.headline_roi().unwrap_or(0.0);
            let wr = t.win_rate.unwrap_or(0.0);
            let lev = t.avg_leverage.unwrap_or(0.0);
            let followers = t.followers.unwrap_or(0);
            [
                roi < l.min_roi,
                roi > l.max_roi,
                wr < l.min_win_rate,
                lev < l.min_leverage,
                lev > l.max_leverage,
                followers < l.min_followers,
            ]
            .iter()
            .filter(|c| **c)
            .count()
        };

        let outcome = filter.apply(traders.clone());
        prop_assert_eq!(outcome.total(), traders.len());

        for t in &outcome.passed {
            prop_assert_eq!(failed_conditions(t), 0);
        }
        for r in &outcome.rejected {
            let failed = failed_conditions(&r.trader);
            prop_assert!(failed >= 1);
            prop_assert_eq!(r.rejection_reasons.len(), failed);
        }
    }

    /// Overrides never mutate the shared tables.
    #[test]
    fn overrides_leave_tables_untouched(profile in arb_profile(), min_roi in -50.0..50.0_f64) {
        let before = profile.limits();
        let _ = HardFilter::new(profile).with_overrides(&FilterOverrides {
            min_roi: Some(min_roi),
            ..Default::default()
        });
        prop_assert_eq!(profile.limits(), before);
    }
}

// ── 3. Composite score ───────────────────────────────────────────────

proptest! {
    #[test]
    fn composite_in_range(
        profile in arb_profile(),
        strategy in arb_strategy(),
        trader in arb_trader(),
        rfr in 0.0..10.0_f64,
    ) {
        let scorer = Scorer::new(profile, strategy).with_risk_free_rate(rfr);
        let derived = scorer.derive(&trader);
        let (total, breakdown) = scorer.score(&trader, &derived);

        prop_assert!((0.0..=100.0).contains(&total), "total {}", total);
        for sub in [
            breakdown.drawdown_score,
            breakdown.win_rate_score,
            breakdown.roi_score,
            breakdown.consistency_score,
            breakdown.rar_score,
        ] {
            prop_assert!((0.0..=100.0).contains(&sub));
        }
    }

    #[test]
    fn consistency_in_unit_interval(trader in arb_trader(), strategy in arb_strategy()) {
        let derived = Scorer::new(RiskProfile::Moderate, strategy).derive(&trader);
        prop_assert!((0.0..=1.0).contains(&derived.consistency));
    }
}

#[test]
fn weights_sum_to_one() {
    for profile in RiskProfile::ALL {
        assert!((profile.weights().sum() - 1.0).abs() < 1e-9);
    }
}

// ── 4. Ranking ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rank_sorts_descending(scores in arb_scores()) {
        let ranked = rank(results(&scores));
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].total_score >= pair[1].total_score);
        }
    }

    #[test]
    fn rank_is_idempotent(scores in arb_scores()) {
        let once = rank(results(&scores));
        let twice = rank(once.clone());
        prop_assert_eq!(once, twice);
    }

    /// Equal scores keep their input order.
    #[test]
    fn rank_is_stable(scores in arb_scores()) {
        let ranked = rank(results(&scores));
        for pair in ranked.windows(2) {
            if pair[0].total_score == pair[1].total_score {
                let i: usize = pair[0].trader[1..].parse().unwrap();
                let j: usize = pair[1].trader[1..].parse().unwrap();
                prop_assert!(i < j);
            }
        }
    }
}
