pub mod host;
pub mod roles;
pub mod sequence;
pub mod snapshot;

pub use host::ChangedHost;
pub use snapshot::{diff_snapshots, SnapshotDiff};
