//! Property-based tests for hotspot detection

mod common;

use archmap::config::HotspotConfig;
use archmap::{find_hotspots, HotspotSettings, Matrix, Metric, RenameTable, TrendsAnalysis};
use common::sized_snapshot;
use proptest::prelude::*;

/// Sizes per snapshot for a fixed set of six elements
fn history_strategy() -> impl Strategy<Value = Vec<Vec<i64>>> {
    prop::collection::vec(prop::collection::vec(0i64..200, 6), 2..7)
}

const NAMES: [&str; 6] = ["a.rs", "b.rs", "c.rs", "d.rs", "e.rs", "tests/f.rs"];

fn snapshots(history: &[Vec<i64>]) -> Vec<Matrix> {
    history
        .iter()
        .enumerate()
        .map(|(i, sizes)| {
            let values: Vec<(&str, i64)> = NAMES.iter().copied().zip(sizes.iter().copied()).collect();
            sized_snapshot(&format!("v{}", i), &values)
        })
        .collect()
}

proptest! {
    /// Property: every reported hotspot was a candidate at least
    /// `min_snapshots` times
    #[test]
    fn prop_hotspots_meet_min_snapshots(history in history_strategy(), k in 1usize..4) {
        let matrices = snapshots(&history);
        let renames = RenameTable::new();
        let trends = TrendsAnalysis::new(matrices.iter().collect(), &renames);
        let report = find_hotspots(&trends, &[Metric::SIZE], &HotspotSettings::new(k, 1.0));

        for hotspot in &report.hotspots {
            prop_assert!(hotspot.times >= k);
            prop_assert!(hotspot.times < trends.len());
        }
    }

    /// Property: lowering `min_snapshots` never removes a hotspot
    #[test]
    fn prop_lower_threshold_is_superset(history in history_strategy(), k in 2usize..5) {
        let matrices = snapshots(&history);
        let renames = RenameTable::new();
        let trends = TrendsAnalysis::new(matrices.iter().collect(), &renames);
        let strict = find_hotspots(&trends, &[Metric::SIZE], &HotspotSettings::new(k, 1.0));
        let loose = find_hotspots(&trends, &[Metric::SIZE], &HotspotSettings::new(k - 1, 1.0));

        for hotspot in &strict.hotspots {
            let matching = loose.hotspots.iter().find(|h| h.element == hotspot.element);
            prop_assert_eq!(matching, Some(hotspot));
        }
    }

    /// Property: results are ordered by descending index
    #[test]
    fn prop_hotspots_sorted_by_index(history in history_strategy()) {
        let matrices = snapshots(&history);
        let renames = RenameTable::new();
        let trends = TrendsAnalysis::new(matrices.iter().collect(), &renames);
        let report = find_hotspots(&trends, &[Metric::SIZE], &HotspotSettings::new(1, 0.5));

        for pair in report.hotspots.windows(2) {
            prop_assert!(pair[0].index >= pair[1].index);
        }
    }

    /// Property: the test-name filter only removes matching elements
    #[test]
    fn prop_test_filter_only_removes_tests(history in history_strategy()) {
        let matrices = snapshots(&history);
        let renames = RenameTable::new();
        let trends = TrendsAnalysis::new(matrices.iter().collect(), &renames);
        let unfiltered = find_hotspots(&trends, &[Metric::SIZE], &HotspotSettings::new(1, 0.5));
        let filtered_settings = HotspotSettings::from_config(&HotspotConfig {
            min_snapshots: 1,
            min_deviations: 0.5,
            ..HotspotConfig::default()
        })
        .unwrap();
        let filtered = find_hotspots(&trends, &[Metric::SIZE], &filtered_settings);

        prop_assert!(!filtered.contains("tests/f.rs"));
        let kept: Vec<_> = unfiltered
            .hotspots
            .iter()
            .filter(|h| h.element != "tests/f.rs")
            .collect();
        let filtered: Vec<_> = filtered.hotspots.iter().collect();
        prop_assert_eq!(filtered, kept);
    }
}

#[test]
fn single_snapshot_has_no_hotspots() {
    let only = sized_snapshot("v1", &[("a", 1), ("b", 1000)]);
    let renames = RenameTable::new();
    let trends = TrendsAnalysis::new(vec![&only], &renames);
    let report = find_hotspots(&trends, &[Metric::SIZE], &HotspotSettings::new(1, 0.0));
    assert!(report.hotspots.is_empty());
    assert_eq!(report.metrics, vec!["DES_Size".to_string()]);
}
