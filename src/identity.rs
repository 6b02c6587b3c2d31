//! Identity resolution across snapshots.
//!
//! The rename table is owned by the analysis run and passed to every query
//! that needs it, so separate analyses never see each other's renames.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{ElementId, Matrix};

/// How a name resolves in one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementStatus {
    Present,
    Renamed,
    NotPresent,
}

/// Name to ordered alternate names the same element has carried
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTable {
    alternates: BTreeMap<String, Vec<String>>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from comma-joined alias groups such as `"old/a.rs,new/a.rs"`.
    ///
    /// Every name in a group gets the other names of the group, in group
    /// order, appended to its alternates.
    pub fn from_alias_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for group in groups {
            let names: Vec<&str> = group
                .as_ref()
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect();
            for name in &names {
                for alternate in names.iter().filter(|other| *other != name) {
                    table.insert(*name, *alternate);
                }
            }
        }
        table
    }

    /// Append an alternate, ignoring repeats
    pub fn insert(&mut self, name: impl Into<String>, alternate: impl Into<String>) {
        let alternate = alternate.into();
        let entry = self.alternates.entry(name.into()).or_default();
        if !entry.contains(&alternate) {
            entry.push(alternate);
        }
    }

    pub fn alternates(&self, name: &str) -> &[String] {
        self.alternates.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.alternates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternates.is_empty()
    }

    /// Exact match first, then the first alternate found in `matrix`
    pub fn resolve(&self, matrix: &Matrix, name: &str) -> Option<ElementId> {
        self.resolve_with_status(matrix, name).1
    }

    pub fn status(&self, matrix: &Matrix, name: &str) -> ElementStatus {
        self.resolve_with_status(matrix, name).0
    }

    pub fn resolve_with_status(
        &self,
        matrix: &Matrix,
        name: &str,
    ) -> (ElementStatus, Option<ElementId>) {
        if let Some(id) = matrix.get_by_full_name(name) {
            return (ElementStatus::Present, Some(id));
        }
        match self
            .alternates(name)
            .iter()
            .find_map(|alternate| matrix.get_by_full_name(alternate))
        {
            Some(id) => (ElementStatus::Renamed, Some(id)),
            None => (ElementStatus::NotPresent, None),
        }
    }
}
