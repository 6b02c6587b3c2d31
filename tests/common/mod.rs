// Test utility module for archmap integration tests
#![allow(dead_code)]

use archmap::{group_by_namespace, ElementId, Matrix, MatrixInput, Metric};
use std::collections::BTreeSet;

/// A flat matrix whose leaves carry the given sizes
pub fn sized_snapshot(name: &str, sizes: &[(&str, i64)]) -> Matrix {
    let mut matrix = Matrix::from_input(MatrixInput {
        name: name.to_string(),
        elements: sizes.iter().map(|(n, _)| n.to_string()).collect(),
        edges: Vec::new(),
    })
    .expect("valid snapshot input");
    for (i, (_, size)) in sizes.iter().enumerate() {
        matrix
            .add_metric(ElementId(i), &Metric::SIZE, *size)
            .expect("stored metric");
    }
    matrix
}

/// Leaf `i` is named `g{membership[i]}/f{i}`; edges are
/// `(source, destination, count, co_changes)` with the dependency type
/// `Call` for odd counts and `Use` for even ones. Repeated pairs are skipped.
/// The matrix is grouped by namespace.
pub fn layered_matrix(membership: &[usize], edges: &[(usize, usize, u64, u64)]) -> Matrix {
    let mut matrix = Matrix::new("layered");
    for (i, group) in membership.iter().enumerate() {
        matrix
            .add_leaf(format!("g{}/f{}", group, i))
            .expect("unique leaf");
    }
    let mut seen = BTreeSet::new();
    for &(source, destination, count, co_changes) in edges {
        if !seen.insert((source, destination)) {
            continue;
        }
        let kind = if count % 2 == 0 { "Use" } else { "Call" };
        matrix
            .add_edge(
                ElementId(source),
                ElementId(destination),
                [(kind.to_string(), count)],
            )
            .expect("edge between existing leaves");
        if co_changes > 0 {
            matrix
                .record_co_changes(ElementId(source), ElementId(destination), co_changes)
                .expect("co-change on a leaf");
        }
    }
    group_by_namespace(&mut matrix, "/").expect("namespace grouping");
    matrix
}

/// The example from the design notes: A->B Call=3, G = {B, C}
pub fn abc_matrix() -> (Matrix, [ElementId; 4]) {
    let mut matrix = Matrix::new("abc");
    let a = matrix.add_leaf("A").unwrap();
    let b = matrix.add_leaf("B").unwrap();
    let c = matrix.add_leaf("C").unwrap();
    matrix.add_edge(a, b, [("Call".to_string(), 3)]).unwrap();
    let g = matrix.add_group("G");
    let root = matrix.add_group("root");
    matrix.add_child(g, b).unwrap();
    matrix.add_child(g, c).unwrap();
    matrix.add_child(root, a).unwrap();
    matrix.add_child(root, g).unwrap();
    matrix.set_root(root).unwrap();
    (matrix, [a, b, c, g])
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
