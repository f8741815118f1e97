use sha2::{Digest, Sha256};
use shared::types::Snapshot;

/// SHA-256 over the fields the differ compares: ID, status and roles.
/// Display metadata and capture time are left out, so two snapshots with the
/// same fingerprint always diff to nothing.
pub fn compute_fingerprint(snapshot: &Snapshot) -> String {
    let mut hasher = Sha256::new();

    // hosts() and the role sets both iterate in sorted order
    for host in snapshot.hosts() {
        feed(&mut hasher, host.id.as_str());
        feed(&mut hasher, &host.state.status);
        hasher.update((host.state.roles.len() as u64).to_le_bytes());
        for role in &host.state.roles {
            feed(&mut hasher, role);
        }
    }

    hex::encode(hasher.finalize())
}

/// Length-prefixed so adjacent fields cannot run together
fn feed(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}
