use serde::Serialize;
use shared::types::{HostRecord, Snapshot};
use crate::diff::host::{diff_host, ChangedHost};

/// Lifecycle and attribute changes between two consecutive snapshots.
/// Each list is in ascending host ID order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    pub created: Vec<HostRecord>,
    pub retired: Vec<HostRecord>,
    pub changed: Vec<ChangedHost>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.retired.is_empty() && self.changed.is_empty()
    }

    /// Number of hosts mentioned across all three lists
    pub fn len(&self) -> usize {
        self.created.len() + self.retired.len() + self.changed.len()
    }
}

/// Partition the hosts of two snapshots into created, retired and changed.
/// Hosts present in both with no material change are left out.
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot) -> SnapshotDiff {
    let mut diff = SnapshotDiff::default();

    diff.retired.extend(
        old.hosts()
            .filter(|host| !new.contains(&host.id))
            .cloned(),
    );

    for host in new.hosts() {
        match old.get(&host.id) {
            None => diff.created.push(host.clone()),
            Some(previous) => {
                if let Some(change) = diff_host(&previous.state, host) {
                    diff.changed.push(change);
                }
            }
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use shared::types::{HostId, HostState};
    use std::collections::BTreeSet;

    fn host(id: &str, status: &str, roles: &[&str]) -> HostRecord {
        HostRecord::new(id, format!("host-{}", id), HostState::new(status, roles.iter().copied()))
    }

    fn snapshot(hosts: Vec<HostRecord>) -> Snapshot {
        Snapshot::from_hosts(Utc::now(), hosts)
    }

    fn ids(hosts: &[HostRecord]) -> Vec<&str> {
        hosts.iter().map(|h| h.id.as_str()).collect()
    }

    #[test]
    fn test_created_host() {
        let old = snapshot(vec![host("1", "working", &[])]);
        let new = snapshot(vec![host("1", "working", &[]), host("2", "standby", &[])]);

        let diff = diff_snapshots(&old, &new);
        assert_eq!(ids(&diff.created), vec!["2"]);
        assert!(diff.retired.is_empty());
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_retired_host() {
        let old = snapshot(vec![host("1", "working", &[])]);
        let new = snapshot(vec![]);

        let diff = diff_snapshots(&old, &new);
        assert_eq!(ids(&diff.retired), vec!["1"]);
        assert!(diff.created.is_empty());
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_status_change() {
        let old = snapshot(vec![host("1", "working", &["svc:web"])]);
        let new = snapshot(vec![host("1", "maintenance", &["svc:web"])]);

        let diff = diff_snapshots(&old, &new);
        assert_eq!(diff.changed.len(), 1);
        let change = &diff.changed[0];
        assert_eq!(change.host.id, HostId::from("1"));
        assert_eq!(change.previous_status.as_deref(), Some("working"));
        assert!(!change.roles_changed());
    }

    #[test]
    fn test_identical_snapshots() {
        let hosts = vec![host("1", "working", &["svc:web"]), host("2", "poweroff", &[])];
        let diff = diff_snapshots(&snapshot(hosts.clone()), &snapshot(hosts));

        assert!(diff.is_empty());
        assert_eq!(diff.len(), 0);
    }

    #[test]
    fn test_lists_ordered_by_id() {
        let old = snapshot(vec![host("c", "working", &[]), host("a", "working", &[])]);
        let new = snapshot(vec![host("z", "working", &[]), host("b", "working", &[])]);

        let diff = diff_snapshots(&old, &new);
        assert_eq!(ids(&diff.retired), vec!["a", "c"]);
        assert_eq!(ids(&diff.created), vec!["b", "z"]);
    }

    fn arb_hosts() -> impl Strategy<Value = Vec<HostRecord>> {
        let status = prop::sample::select(vec!["working", "standby", "maintenance", "poweroff"]);
        let roles = prop::collection::btree_set(prop::sample::select(vec!["a:web", "a:db", "b:api"]), 0..3);
        prop::collection::vec(("[0-7]", status, roles), 0..8).prop_map(|rows| {
            rows.into_iter()
                .map(|(id, status, roles)| HostRecord::new(id, "h", HostState::new(status, roles)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_partition_is_complete(old in arb_hosts(), new in arb_hosts()) {
            let (old, new) = (snapshot(old), snapshot(new));
            let diff = diff_snapshots(&old, &new);

            let mut seen: Vec<&HostId> = Vec::new();
            seen.extend(diff.created.iter().map(|h| &h.id));
            seen.extend(diff.retired.iter().map(|h| &h.id));
            seen.extend(diff.changed.iter().map(|c| &c.host.id));
            let unchanged: Vec<&HostId> = new
                .hosts()
                .filter(|h| old.get(&h.id).map(|o| o.state == h.state).unwrap_or(false))
                .map(|h| &h.id)
                .collect();
            seen.extend(unchanged);

            let distinct: BTreeSet<&HostId> = seen.iter().copied().collect();
            prop_assert_eq!(distinct.len(), seen.len(), "A host was reported twice");

            let expected: BTreeSet<&HostId> = old.hosts().chain(new.hosts()).map(|h| &h.id).collect();
            prop_assert_eq!(distinct, expected);
        }

        #[test]
        fn prop_changes_are_material(old in arb_hosts(), new in arb_hosts()) {
            let (old, new) = (snapshot(old), snapshot(new));
            for change in diff_snapshots(&old, &new).changed {
                prop_assert!(change.status_changed() || change.roles_changed());
                let before = old.get(&change.host.id).unwrap();
                prop_assert_ne!(&before.state, &change.host.state);
            }
        }
    }
}
