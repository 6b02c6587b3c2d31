//! Property-based tests for dependency roll-up
//!
//! Random leaf graphs are grouped into one namespace level and the
//! aggregated edges are checked against totals computed directly from the
//! stored leaf edges.

mod common;

use archmap::aggregation::dependencies_between;
use archmap::{aggregate_dependencies, ElementId, Matrix, MatrixProjection, TargetSet};
use common::{abc_matrix, layered_matrix};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Group index per leaf and a list of distinct-endpoint edges
fn graph_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize, u64, u64)>)> {
    (2usize..12).prop_flat_map(|leaves| {
        let membership = prop::collection::vec(0usize..4, leaves);
        let edges = prop::collection::vec((0..leaves, 0..leaves, 1u64..20, 0u64..5), 0..30)
            .prop_map(|edges| edges.into_iter().filter(|(s, d, _, _)| s != d).collect());
        (membership, edges)
    })
}

/// Per-type counts of every stored leaf edge from under `source` to under
/// `destination`
fn direct_totals(matrix: &Matrix, source: ElementId, destination: ElementId) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for leaf in matrix.leaves_under(source) {
        for edge in matrix.element(leaf).edges() {
            let target = edge.destination();
            if target == destination || matrix.is_within(target, destination) {
                for (kind, count) in edge.dependencies() {
                    *totals.entry(kind.clone()).or_insert(0) += count;
                }
            }
        }
    }
    totals
}

proptest! {
    /// Property: an aggregated group edge carries, per dependency type, the
    /// sum of the leaf edges it covers
    #[test]
    fn prop_group_totals_match_leaf_edges((membership, edges) in graph_strategy()) {
        let matrix = layered_matrix(&membership, &edges);
        let top = matrix.top_level();
        let targets: TargetSet = top.iter().collect();

        for &source in &top {
            let aggregated = aggregate_dependencies(&matrix, source, &targets);
            for &destination in &top {
                let expected = direct_totals(&matrix, source, destination);
                let actual = aggregated
                    .iter()
                    .find(|edge| edge.destination() == destination)
                    .map(|edge| edge.dependencies().clone())
                    .unwrap_or_default();
                prop_assert_eq!(actual, expected);
            }
        }
    }

    /// Property: a group's aggregate equals the sum of its children's
    /// aggregates over the same targets
    #[test]
    fn prop_group_is_sum_of_children((membership, edges) in graph_strategy()) {
        let matrix = layered_matrix(&membership, &edges);
        let top = matrix.top_level();
        let targets: TargetSet = top.iter().collect();

        for &group in top.iter().filter(|id| matrix.element(**id).is_group()) {
            for &destination in &top {
                let whole = dependencies_between(&matrix, group, destination, &targets);
                let parts: u64 = matrix
                    .element(group)
                    .children()
                    .iter()
                    .map(|child| dependencies_between(&matrix, *child, destination, &targets))
                    .sum();
                prop_assert_eq!(whole, parts);
            }
        }
    }

    /// Property: re-keying leaf-level results by top-level ancestor gives the
    /// top-level aggregation
    #[test]
    fn prop_refinement_is_consistent((membership, edges) in graph_strategy()) {
        let matrix = layered_matrix(&membership, &edges);
        let top = matrix.top_level();
        let top_targets: TargetSet = top.iter().collect();
        let leaf_targets: TargetSet = matrix.leaves().iter().collect();
        let owner = |id: ElementId| {
            top.iter()
                .copied()
                .find(|t| *t == id || matrix.is_within(id, *t))
        };

        let mut refined: BTreeMap<(ElementId, ElementId), u64> = BTreeMap::new();
        for &leaf in matrix.leaves() {
            for edge in aggregate_dependencies(&matrix, leaf, &leaf_targets) {
                if let (Some(s), Some(d)) = (owner(leaf), owner(edge.destination())) {
                    *refined.entry((s, d)).or_insert(0) += edge.total_dependencies();
                }
            }
        }

        let mut coarse: BTreeMap<(ElementId, ElementId), u64> = BTreeMap::new();
        for &source in &top {
            for edge in aggregate_dependencies(&matrix, source, &top_targets) {
                if edge.total_dependencies() > 0 {
                    *coarse.entry((source, edge.destination())).or_insert(0) +=
                        edge.total_dependencies();
                }
            }
        }
        refined.retain(|_, total| *total > 0);
        prop_assert_eq!(refined, coarse);
    }

    /// Property: every projection cell agrees with a direct aggregation query
    #[test]
    fn prop_projection_cells_match_queries((membership, edges) in graph_strategy()) {
        let matrix = layered_matrix(&membership, &edges);
        let projection = MatrixProjection::top_level(&matrix);
        let targets: TargetSet = projection.elements().iter().collect();

        for (i, &source) in projection.elements().iter().enumerate() {
            for (j, &destination) in projection.elements().iter().enumerate() {
                prop_assert_eq!(
                    projection.cell(i, j).total_dependencies(),
                    dependencies_between(&matrix, source, destination, &targets)
                );
            }
        }
    }

    /// Property: outgoing totals of the top level add up to every stored
    /// edge that crosses between top-level elements
    #[test]
    fn prop_outgoing_totals_cover_crossing_edges((membership, edges) in graph_strategy()) {
        let matrix = layered_matrix(&membership, &edges);
        let projection = MatrixProjection::top_level(&matrix);
        let outgoing: u64 = projection
            .elements()
            .iter()
            .map(|id| projection.outgoing_dependencies(*id))
            .sum();
        let incoming: u64 = projection
            .elements()
            .iter()
            .map(|id| projection.incoming_dependencies(*id))
            .sum();
        let crossing: u64 = matrix
            .leaves()
            .iter()
            .flat_map(|leaf| matrix.element(*leaf).edges().iter().map(move |e| (*leaf, e)))
            .filter(|(leaf, edge)| {
                matrix.element(*leaf).parent() != matrix.element(edge.destination()).parent()
            })
            .map(|(_, edge)| edge.total_dependencies())
            .sum();
        prop_assert_eq!(outgoing, crossing);
        prop_assert_eq!(incoming, crossing);
    }
}

#[test]
fn call_into_group_member_rolls_up_to_group() {
    let (matrix, [a, b, _c, g]) = abc_matrix();

    let grouped: TargetSet = [a, g].into_iter().collect();
    let edges = aggregate_dependencies(&matrix, a, &grouped);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].destination(), g);
    assert_eq!(edges[0].dependency("Call"), Some(3));

    let flat: TargetSet = [a, b].into_iter().collect();
    let edges = aggregate_dependencies(&matrix, a, &flat);
    assert_eq!(edges.len(), 1);
    assert!(!edges[0].is_aggregate());
    assert_eq!(edges[0].destination(), b);
}

#[test]
fn aggregation_leaves_the_matrix_untouched() {
    let (matrix, [a, _b, _c, g]) = abc_matrix();
    let targets: TargetSet = [a, g].into_iter().collect();
    let first = aggregate_dependencies(&matrix, a, &targets);
    let second = aggregate_dependencies(&matrix, a, &targets);
    assert_eq!(first, second);
    assert_eq!(matrix.element(a).edges().len(), 1);
}
