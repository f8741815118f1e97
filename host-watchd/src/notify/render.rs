use shared::protocol::ROLE_SEPARATOR;
use shared::types::{HostId, HostRecord};
use crate::diff::roles::role_edits;
use crate::diff::{ChangedHost, SnapshotDiff};

/// Builds links back into the monitoring web console
#[derive(Debug, Clone)]
pub struct Links {
    pub web_base: String,
    /// Without an organization nothing is linked
    pub organization: Option<String>,
}

/// How links are written into the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// `label (url)`
    Plain,
    /// Slack mrkdwn `<url|label>`
    Slack,
}

impl Markup {
    /// Free text as it must appear in this markup.
    /// Slack treats `&`, `<` and `>` as control characters.
    fn text(self, text: &str) -> String {
        match self {
            Markup::Plain => text.to_string(),
            Markup::Slack => text
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;"),
        }
    }

    fn link(self, label: &str, url: Option<String>) -> String {
        match (self, url) {
            (_, None) => self.text(label),
            (Markup::Plain, Some(url)) => format!("{} ({})", label, url),
            (Markup::Slack, Some(url)) => format!("<{}|{}>", self.text(&url), self.text(label)),
        }
    }
}

impl Links {
    pub fn new(web_base: impl Into<String>, organization: Option<String>) -> Self {
        Self {
            web_base: web_base.into().trim_end_matches('/').to_string(),
            organization,
        }
    }

    pub fn host_url(&self, id: &HostId) -> Option<String> {
        let org = self.organization.as_deref()?;
        Some(format!("{}/orgs/{}/hosts/{}", self.web_base, org, id))
    }

    /// Role dashboard for a `service:role` label, split at the first colon.
    /// Labels that don't split into two non-empty parts get no link.
    pub fn role_url(&self, label: &str) -> Option<String> {
        let org = self.organization.as_deref()?;
        let (service, role) = label.split_once(ROLE_SEPARATOR)?;
        if service.is_empty() || role.is_empty() {
            return None;
        }
        Some(format!("{}/orgs/{}/services/{}/{}", self.web_base, org, service, role))
    }
}

/// One titled, colour-coded block of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    /// Slack attachment colour name
    pub color: &'static str,
    pub lines: Vec<String>,
}

impl Section {
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }
}

pub fn render_sections(diff: &SnapshotDiff, links: &Links, markup: Markup) -> Vec<Section> {
    let mut sections = Vec::new();

    if !diff.created.is_empty() {
        sections.push(Section {
            title: format!("New hosts ({})", diff.created.len()),
            color: "good",
            lines: diff.created.iter().map(|h| host_line(h, links, markup)).collect(),
        });
    }
    if !diff.retired.is_empty() {
        sections.push(Section {
            title: format!("Retired hosts ({})", diff.retired.len()),
            color: "danger",
            lines: diff.retired.iter().map(|h| host_line(h, links, markup)).collect(),
        });
    }
    if !diff.changed.is_empty() {
        sections.push(Section {
            title: format!("Changed hosts ({})", diff.changed.len()),
            color: "warning",
            lines: diff
                .changed
                .iter()
                .flat_map(|c| change_lines(c, links, markup))
                .collect(),
        });
    }

    sections
}

/// Plain-text report, one section after another
pub fn render_text(diff: &SnapshotDiff, links: &Links) -> String {
    render_sections(diff, links, Markup::Plain)
        .iter()
        .map(|section| {
            let body: Vec<String> = section.lines.iter().map(|l| format!("  {}", l)).collect();
            format!("{}:\n{}", section.title, body.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "N created, N retired, N changed"
pub fn summary(diff: &SnapshotDiff) -> String {
    format!(
        "{} created, {} retired, {} changed",
        diff.created.len(),
        diff.retired.len(),
        diff.changed.len()
    )
}

fn host_link(host: &HostRecord, links: &Links, markup: Markup) -> String {
    markup.link(host.label(), links.host_url(&host.id))
}

fn role_link(label: &str, links: &Links, markup: Markup) -> String {
    markup.link(label, links.role_url(label))
}

fn host_line(host: &HostRecord, links: &Links, markup: Markup) -> String {
    let mut line = format!(
        "{} [{}]",
        host_link(host, links, markup),
        markup.text(&host.state.status)
    );
    if !host.state.roles.is_empty() {
        let roles: Vec<String> = host
            .state
            .roles
            .iter()
            .map(|r| role_link(r, links, markup))
            .collect();
        line.push(' ');
        line.push_str(&roles.join(", "));
    }
    line
}

fn change_lines(change: &ChangedHost, links: &Links, markup: Markup) -> Vec<String> {
    let mut lines = vec![host_link(&change.host, links, markup)];

    if let Some(previous) = &change.previous_status {
        lines.push(format!(
            "    status: {} -> {}",
            markup.text(previous),
            markup.text(&change.host.state.status)
        ));
    }
    if let Some(previous) = &change.previous_roles {
        let edits = role_edits(previous, &change.host.state.roles);
        let mut parts: Vec<String> = edits
            .added
            .iter()
            .map(|r| format!("+{}", role_link(r, links, markup)))
            .collect();
        parts.extend(edits.deleted.iter().map(|r| format!("-{}", role_link(r, links, markup))));
        lines.push(format!("    roles: {}", parts.join(" ")));
    }

    lines
}
