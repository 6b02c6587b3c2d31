//! Rename resolution, derived metrics and architectural rules end to end

mod common;

use archmap::constraints::{DependencyConstraintDto, ElementConstraintDto};
use archmap::{
    dependency_violations, derive_metrics, element_violations, export_constraints,
    import_constraints, ElementConstraint, ElementStatus, Error, MatrixConstraintsDto,
    MatrixProjection, Metric, RenameTable, TrendsAnalysis,
};
use common::{abc_matrix, layered_matrix, sized_snapshot};
use indoc::indoc;
use pretty_assertions::assert_eq;

#[test]
fn separate_rename_tables_do_not_interfere() {
    let old = sized_snapshot("v1", &[("a.rs", 5)]);
    let new = sized_snapshot("v2", &[("b.rs", 7)]);
    let with_rename = RenameTable::from_alias_groups(["a.rs,b.rs"]);
    let without = RenameTable::new();

    let renamed = TrendsAnalysis::new(vec![&old, &new], &with_rename);
    let plain = TrendsAnalysis::new(vec![&old, &new], &without);

    assert_eq!(renamed.delta("b.rs", &Metric::SIZE, 1, 0).unwrap(), Some(2));
    assert_eq!(plain.delta("b.rs", &Metric::SIZE, 1, 0).unwrap(), Some(7));
    assert_eq!(with_rename.status(&old, "b.rs"), ElementStatus::Renamed);
    assert_eq!(without.status(&old, "b.rs"), ElementStatus::NotPresent);
}

#[test]
fn query_order_does_not_change_results() {
    let s0 = sized_snapshot("v1", &[("a", 3), ("b", 9), ("c", 1)]);
    let s1 = sized_snapshot("v2", &[("a", 8), ("c", 4), ("d", 2)]);
    let s2 = sized_snapshot("v3", &[("a", 2), ("c", 4), ("d", 6)]);
    let renames = RenameTable::new();

    let first = TrendsAnalysis::new(vec![&s0, &s1, &s2], &renames);
    let forward: Vec<_> = ["a", "c", "d"]
        .iter()
        .map(|n| (first.total_across_snapshots(n, &Metric::SIZE), first.trend(n, &Metric::SIZE)))
        .collect();

    let second = TrendsAnalysis::new(vec![&s0, &s1, &s2], &renames);
    let mut backward: Vec<_> = ["d", "c", "a"]
        .iter()
        .map(|n| (second.total_across_snapshots(n, &Metric::SIZE), second.trend(n, &Metric::SIZE)))
        .collect();
    backward.reverse();

    assert_eq!(forward, backward);
    assert_eq!(first.delta_min_max(&Metric::SIZE), second.delta_min_max(&Metric::SIZE));
}

#[test]
fn derived_metrics_follow_the_leaf_projection() {
    let (mut matrix, [a, b, c, _g]) = abc_matrix();
    matrix.record_co_changes(b, c, 4).unwrap();
    derive_metrics(&mut matrix);

    assert_eq!(matrix.metric_value(a, &Metric::DEPENDS_ON_PARTNERS), Some(1));
    assert_eq!(matrix.metric_value(b, &Metric::DEPENDENT_PARTNERS), Some(1));
    assert_eq!(matrix.metric_value(b, &Metric::TOTAL_DEPENDENCIES), Some(3));
    assert_eq!(matrix.metric_value(b, &Metric::CO_CHANGE_PARTNERS), Some(1));
    assert_eq!(matrix.metric_value(c, &Metric::TOTAL_DEPENDENCIES), Some(0));
    assert!(matches!(
        matrix.add_metric(a, &Metric::TOTAL_DEPENDENCIES, 1),
        Err(Error::DerivedMetric(_))
    ));
}

#[test]
fn group_constraint_is_violated_at_every_level() {
    let (mut matrix, [a, b, _c, g]) = abc_matrix();
    matrix.add_dependency_constraint(a, g).unwrap();

    let top = MatrixProjection::top_level(&matrix);
    let violations = dependency_violations(&top);
    assert_eq!(violations.len(), 1);
    assert_eq!((violations[0].source, violations[0].destination), (a, g));
    assert_eq!(violations[0].dependencies, 3);

    let leaves = MatrixProjection::over_leaves(&matrix);
    let violations = dependency_violations(&leaves);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].destination, b);

    let grid = leaves.constraint_grid();
    let row = leaves.position(a).unwrap();
    assert_eq!(grid[row].iter().filter(|covered| **covered).count(), 2);
}

#[test]
fn element_thresholds_are_strict() {
    let mut matrix = layered_matrix(&[0, 0, 1], &[]);
    let leaf = matrix.leaves()[0];
    matrix.add_metric(leaf, &Metric::SIZE, 10).unwrap();
    matrix
        .add_element_constraint(leaf, ElementConstraint::new("DES_Size", 10))
        .unwrap();
    assert!(element_violations(&matrix).is_empty());

    matrix.add_metric(leaf, &Metric::SIZE, 1).unwrap();
    let violations = element_violations(&matrix);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].element, "g0/f0");
    assert_eq!(violations[0].value, 11);
}

#[test]
fn constraints_survive_export_and_import() {
    let mut source = layered_matrix(&[0, 0, 1, 1], &[(0, 2, 3, 0)]);
    let g0 = source.get_by_full_name("g0").unwrap();
    let g1 = source.get_by_full_name("g1").unwrap();
    source.add_dependency_constraint(g1, g0).unwrap();
    let f3 = source.get_by_full_name("g1/f3").unwrap();
    source
        .add_element_constraint(f3, ElementConstraint::new("DES_Complexity", 25))
        .unwrap();

    let json = serde_json::to_string(&export_constraints(&source)).unwrap();
    let dto: MatrixConstraintsDto = serde_json::from_str(&json).unwrap();

    let mut target = layered_matrix(&[0, 0, 1, 1], &[]);
    let outcome = import_constraints(&mut target, &dto).unwrap();
    assert_eq!((outcome.applied, outcome.skipped), (2, 0));
    assert_eq!(export_constraints(&target).dependency_constraints, dto.dependency_constraints);

    assert!(matches!(
        import_constraints(&mut target, &dto),
        Err(Error::DuplicateDependencyConstraint { .. })
    ));
}

#[test]
fn unknown_names_are_skipped_on_import() {
    let dto: MatrixConstraintsDto = serde_json::from_str(indoc! {r#"
        {
            "matrix": "elsewhere",
            "dependency_constraints": [
                { "source": "g0", "destination": "g9" }
            ],
            "element_constraints": [
                { "element": "g0/f0", "metric": "DES_Size", "threshold": 100 },
                { "element": "nowhere.rs", "metric": "DES_Size", "threshold": 1 }
            ]
        }
    "#})
    .unwrap();
    assert_eq!(
        dto.dependency_constraints,
        vec![DependencyConstraintDto {
            source: "g0".into(),
            destination: "g9".into()
        }]
    );
    assert_eq!(
        dto.element_constraints[0],
        ElementConstraintDto {
            element: "g0/f0".into(),
            metric: "DES_Size".into(),
            threshold: 100
        }
    );

    let mut matrix = layered_matrix(&[0, 1], &[]);
    let outcome = import_constraints(&mut matrix, &dto).unwrap();
    assert_eq!((outcome.applied, outcome.skipped), (1, 2));
    assert!(matrix.dependency_constraints().is_empty());
}
