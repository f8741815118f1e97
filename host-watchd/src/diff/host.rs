use serde::Serialize;
use shared::types::{HostRecord, HostState};
use crate::diff::roles::diff_roles;

/// A host present in both snapshots whose status or roles differ.
///
/// `previous_status` and `previous_roles` are `Some` exactly when that
/// attribute changed, so an unchanged attribute has no "previous" to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedHost {
    /// The host as seen in the newer snapshot
    pub host: HostRecord,
    pub previous_status: Option<String>,
    /// Sorted ascending
    pub previous_roles: Option<Vec<String>>,
}

impl ChangedHost {
    pub fn status_changed(&self) -> bool {
        self.previous_status.is_some()
    }

    pub fn roles_changed(&self) -> bool {
        self.previous_roles.is_some()
    }
}

/// Compare one host across two polls. Returns `None` when nothing material changed.
///
/// Only the newer record carries the host ID; the older side is just its
/// attributes, so the two halves cannot belong to different hosts.
pub fn diff_host(old: &HostState, new: &HostRecord) -> Option<ChangedHost> {
    let previous_status = (old.status != new.state.status).then(|| old.status.clone());

    let roles = diff_roles(&old.roles, &new.state.roles);
    let previous_roles = roles.changed.then_some(roles.previous);

    if previous_status.is_none() && previous_roles.is_none() {
        return None;
    }

    Some(ChangedHost {
        host: new.clone(),
        previous_status,
        previous_roles,
    })
}
