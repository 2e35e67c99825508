use std::collections::BTreeSet;

use crate::Followee;

/// Usernames recorded at the end of a run. Iteration is always sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    usernames: BTreeSet<String>,
}

impl Snapshot {
    pub fn from_followees(followees: &[Followee]) -> Self {
        followees.iter().map(|f| f.username.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.usernames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usernames.is_empty()
    }

    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.usernames.iter().cloned().collect()
    }
}

impl FromIterator<String> for Snapshot {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            usernames: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for Snapshot {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_owned).collect()
    }
}

/// Usernames that appeared and disappeared since the previous snapshot, each
/// sorted lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// Compares `current` against `previous`.
///
/// Returns `None` when there is nothing to compare against: no snapshot, or an
/// empty one. A first run therefore reports no changes rather than treating
/// every account as added.
pub fn compute_diff(previous: Option<&Snapshot>, current: &Snapshot) -> Option<DiffResult> {
    let previous = previous.filter(|p| !p.is_empty())?;
    let added = current
        .usernames
        .difference(&previous.usernames)
        .cloned()
        .collect();
    let removed = previous
        .usernames
        .difference(&current.usernames)
        .cloned()
        .collect();
    Some(DiffResult { added, removed })
}
