//! Ref listing.
//!
//! Reads branches and tags with `git for-each-ref` and turns them into
//! [`RefItem`] records. [`planning`] then decides which of them are stale.

pub mod planning;

#[cfg(test)]
mod tests;

use crate::deletion::DeleteScope;
use crate::error::Result;
use crate::git::run_git;
use std::fmt;
use std::path::Path;
use tracing::warn;

pub use planning::{CleanupPlan, build_cleanup_plan, cutoff_timestamp, select_candidates};

/// The namespace a ref lives in. Kinds never share names with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    LocalBranch,
    RemoteBranch,
    LocalTag,
    RemoteTag,
}

impl RefKind {
    pub const ALL: [RefKind; 4] = [
        RefKind::LocalBranch,
        RefKind::RemoteBranch,
        RefKind::LocalTag,
        RefKind::RemoteTag,
    ];

    pub fn scope(self) -> DeleteScope {
        match self {
            RefKind::LocalBranch | RefKind::LocalTag => DeleteScope::Local,
            RefKind::RemoteBranch | RefKind::RemoteTag => DeleteScope::Remote,
        }
    }

    pub fn is_tag(self) -> bool {
        matches!(self, RefKind::LocalTag | RefKind::RemoteTag)
    }

    /// Fully qualified ref for `name`, as seen by the repository that owns it.
    pub fn full_refname(self, name: &str) -> String {
        if self.is_tag() {
            format!("refs/tags/{}", name)
        } else {
            format!("refs/heads/{}", name)
        }
    }

    /// Plural label for headings.
    pub fn label(self) -> &'static str {
        match self {
            RefKind::LocalBranch => "Local branches",
            RefKind::RemoteBranch => "Remote branches",
            RefKind::LocalTag => "Local tags",
            RefKind::RemoteTag => "Remote tags",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::LocalBranch => write!(f, "local-branch"),
            RefKind::RemoteBranch => write!(f, "remote-branch"),
            RefKind::LocalTag => write!(f, "local-tag"),
            RefKind::RemoteTag => write!(f, "remote-tag"),
        }
    }
}

/// One branch or tag with the metadata shown in previews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefItem {
    /// Short name (`feature/x`, `v1.0`), without any remote prefix.
    pub name: String,
    /// Commit date for branches, creation date for tags.
    pub timestamp_unix: i64,
    pub timestamp_display: String,
    pub author: String,
    pub subject: String,
}

/// Unit separator between fields; cannot appear in ref names or one-line subjects.
const FIELD_SEPARATOR: char = '\u{1f}';

fn branch_format() -> String {
    [
        "%(refname)",
        "%(committerdate:unix)",
        "%(committerdate:iso)",
        "%(authorname)",
        "%(subject)",
    ]
    .join("%1f")
}

/// Annotated tags carry a tagger instead of an author.
fn tag_format() -> String {
    [
        "%(refname)",
        "%(creatordate:unix)",
        "%(creatordate:iso)",
        "%(if)%(authorname)%(then)%(authorname)%(else)%(taggername)%(end)",
        "%(subject)",
    ]
    .join("%1f")
}

/// List refs of `kind`.
///
/// Remote branches come from the remote-tracking refs of `remote`, so they are
/// as fresh as the last fetch. Remote tags have no tracking refs; the local
/// tag list stands in for them.
pub fn list_refs(repo_root: &Path, kind: RefKind, remote: &str) -> Result<Vec<RefItem>> {
    let (format, namespace, prefix) = match kind {
        RefKind::LocalBranch => (branch_format(), "refs/heads".to_string(), "refs/heads/".to_string()),
        RefKind::RemoteBranch => (
            branch_format(),
            format!("refs/remotes/{}", remote),
            format!("refs/remotes/{}/", remote),
        ),
        RefKind::LocalTag | RefKind::RemoteTag => {
            (tag_format(), "refs/tags".to_string(), "refs/tags/".to_string())
        }
    };

    let format_arg = format!("--format={}", format);
    let output = run_git(repo_root, &["for-each-ref", &format_arg, &namespace])?;

    Ok(output
        .lines()
        .into_iter()
        .filter_map(|line| parse_ref_line(line, &prefix))
        .filter(|item| !(kind == RefKind::RemoteBranch && item.name == "HEAD"))
        .collect())
}

/// Parse one `for-each-ref` line. Lines outside `prefix` or with an
/// unreadable timestamp are skipped.
pub(crate) fn parse_ref_line(line: &str, prefix: &str) -> Option<RefItem> {
    let mut fields = line.splitn(5, FIELD_SEPARATOR);
    let refname = fields.next()?;
    let unix = fields.next()?;
    let display = fields.next().unwrap_or_default();
    let author = fields.next().unwrap_or_default();
    let subject = fields.next().unwrap_or_default();

    let name = refname.strip_prefix(prefix)?;
    if name.is_empty() {
        return None;
    }

    let timestamp_unix = match unix.trim().parse::<i64>() {
        Ok(ts) => ts,
        Err(_) => {
            warn!(refname, timestamp = unix, "skipping ref with unreadable date");
            return None;
        }
    };

    Some(RefItem {
        name: name.to_string(),
        timestamp_unix,
        timestamp_display: display.trim().to_string(),
        author: author.trim().to_string(),
        subject: subject.trim().to_string(),
    })
}
