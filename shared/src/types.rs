use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Opaque host identifier assigned by the inventory service.
/// Stable for the lifetime of a host and never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The attributes of a host that are compared between polls.
///
/// Status and role labels are free-form strings from the inventory service;
/// they are compared only by equality and sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostState {
    /// e.g. "working", "standby", "maintenance", "poweroff"
    pub status: String,

    /// Role full names, e.g. "shop:web"
    pub roles: BTreeSet<String>,
}

impl HostState {
    pub fn new<I, S>(status: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: status.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// One host as observed in a single snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub id: HostId,

    /// Hostname reported by the agent
    pub name: String,

    /// Optional name set in the console
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub memo: String,

    #[serde(flatten)]
    pub state: HostState,
}

impl HostRecord {
    pub fn new(id: impl Into<HostId>, name: impl Into<String>, state: HostState) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: None,
            memo: String::new(),
            state,
        }
    }

    /// Name to show humans: the display name when set, otherwise the hostname.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(display) if !display.is_empty() => display,
            _ => &self.name,
        }
    }
}

/// All hosts observed at one poll instant, indexed by ID.
///
/// A snapshot is never mutated after capture; the next poll produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    captured_at: DateTime<Utc>,
    hosts: BTreeMap<HostId, HostRecord>,
}

impl Snapshot {
    /// Index a host list by ID. If the list repeats an ID the later record wins.
    pub fn from_hosts(captured_at: DateTime<Utc>, hosts: impl IntoIterator<Item = HostRecord>) -> Self {
        let hosts = hosts
            .into_iter()
            .map(|host| (host.id.clone(), host))
            .collect();
        Self { captured_at, hosts }
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn get(&self, id: &HostId) -> Option<&HostRecord> {
        self.hosts.get(id)
    }

    pub fn contains(&self, id: &HostId) -> bool {
        self.hosts.contains_key(id)
    }

    /// Hosts in ascending ID order
    pub fn hosts(&self) -> impl Iterator<Item = &HostRecord> {
        self.hosts.values()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
