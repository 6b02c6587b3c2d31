//! Namespace hierarchy built from leaf names.

use std::collections::HashMap;

use crate::config::GroupingConfig;
use crate::errors::Result;
use crate::model::{ElementId, Matrix};

/// Group leaves by the namespace prefixes of their full names.
///
/// `src/ui/view.rs` with separator `/` lands under groups `src` and
/// `src/ui`. Leaves whose name has a single token attach to the root, which
/// is named after the matrix. Any existing hierarchy is replaced.
pub fn group_by_namespace(matrix: &mut Matrix, separator: &str) -> Result<ElementId> {
    matrix.clear_hierarchy();
    let root = matrix.add_group(matrix.name().to_string());
    let mut groups: HashMap<String, ElementId> = HashMap::new();

    for leaf in matrix.leaves().to_vec() {
        let full_name = matrix.full_name(leaf).to_string();
        let tokens: Vec<&str> = full_name.split(separator).collect();
        let mut parent = root;
        for depth in 1..tokens.len() {
            let prefix = tokens[..depth].join(separator);
            parent = match groups.get(&prefix) {
                Some(&group) => group,
                None => {
                    let group = matrix.add_group(prefix.clone());
                    matrix.add_child(parent, group)?;
                    groups.insert(prefix, group);
                    group
                }
            };
        }
        matrix.add_child(parent, leaf)?;
    }

    matrix.set_root(root)?;
    log::debug!(
        "{}: grouped {} leaves into {} namespaces",
        matrix.name(),
        matrix.leaves().len(),
        groups.len()
    );
    Ok(root)
}

/// [`group_by_namespace`] with the separator from the `[grouping]` section
pub fn group_by_config(matrix: &mut Matrix, config: &GroupingConfig) -> Result<ElementId> {
    group_by_namespace(matrix, &config.separator)
}
