//! Priority package set and in-place regrouping of an outdated report

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::monitor::aggregator::{DependencyUpdate, OutdatedReport};

/// Packages the user flagged as important for one project.
///
/// Membership is by exact name and insertion order is kept for display.
/// Packages are added only while they are dependencies of the project; an
/// entry left behind after the package is dropped never matches a row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrioritySet(IndexSet<String>);

impl PrioritySet {
    /// Returns true if the package was not already flagged
    pub fn add(&mut self, package: &str) -> bool {
        self.0.insert(package.to_string())
    }

    /// Returns true if the package was flagged
    pub fn remove(&mut self, package: &str) -> bool {
        self.0.shift_remove(package)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.0.contains(package)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for PrioritySet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl OutdatedReport {
    /// Move a package's row between the groups without re-fetching.
    ///
    /// The row is inserted before the first row of the target group whose
    /// distance is not greater than its own, or appended. Returns false if the
    /// package has no row in the opposite group.
    pub fn mark_priority(&mut self, package: &str, is_priority: bool) -> bool {
        let (from, to) = if is_priority {
            (&mut self.other, &mut self.priority)
        } else {
            (&mut self.priority, &mut self.other)
        };

        let Some(index) = from.iter().position(|update| update.package == package) else {
            return false;
        };

        let mut update = from.remove(index);
        update.is_priority = is_priority;
        insert_by_distance(to, update);
        true
    }
}

fn insert_by_distance(rows: &mut Vec<DependencyUpdate>, update: DependencyUpdate) {
    match rows.iter().position(|row| row.distance <= update.distance) {
        Some(index) => rows.insert(index, update),
        None => rows.push(update),
    }
}
