use std::collections::BTreeSet;
use crate::diff::sequence::{self, EditScript};

/// Outcome of comparing two role sets of the same host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDiff {
    pub changed: bool,
    /// Old role labels in ascending order. Empty when the host had no roles.
    pub previous: Vec<String>,
}

/// Compare the role labels a host had before and after a poll.
pub fn diff_roles(old: &BTreeSet<String>, new: &BTreeSet<String>) -> RoleDiff {
    // BTreeSet iterates in ascending order, so these are already the sorted forms
    let previous: Vec<String> = old.iter().cloned().collect();
    let changed = !previous.iter().eq(new.iter());
    RoleDiff { changed, previous }
}

/// The literal labels added and removed, for human-readable reports.
pub fn role_edits(previous: &[String], current: &BTreeSet<String>) -> EditScript<String> {
    let current: Vec<String> = current.iter().cloned().collect();
    sequence::diff(previous, &current)
}
