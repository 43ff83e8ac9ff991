//! Failure classification.
//!
//! Maps raw deletion error text to a short, stable key so that hundreds of
//! failures with the same root cause can be reported as one group. The
//! classification is used for display only and never changes an outcome.

use std::fmt;

/// Longest unclassified message kept as a key, in characters.
const MAX_KEY_CHARS: usize = 100;

/// Placeholder substituted for ref names inside normalized command lines.
const REF_PLACEHOLDER: &str = "<ref>";

/// Root causes recognized from git/server output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnownCause {
    ProtectedRef,
    HookRejected,
    NetworkFailure,
    PermissionDenied,
    RefNotFound,
}

impl KnownCause {
    pub fn key(self) -> &'static str {
        match self {
            KnownCause::ProtectedRef => "protected-ref-web-ui-required",
            KnownCause::HookRejected => "hook-rejected",
            KnownCause::NetworkFailure => "network-failure",
            KnownCause::PermissionDenied => "permission-denied",
            KnownCause::RefNotFound => "ref-not-found",
        }
    }

    /// What the user can do about it.
    pub fn hint(self) -> &'static str {
        match self {
            KnownCause::ProtectedRef => {
                "protected refs can only be deleted through the hosting service's web interface"
            }
            KnownCause::HookRejected => {
                "a server-side hook refused the push; check the repository's push rules"
            }
            KnownCause::NetworkFailure => {
                "check connectivity to the remote and retry; raise timeoutMs for slow servers"
            }
            KnownCause::PermissionDenied => {
                "confirm your credentials are allowed to delete refs on this remote"
            }
            KnownCause::RefNotFound => {
                "the ref is already gone; run `git fetch --prune` to refresh remote-tracking refs"
            }
        }
    }
}

/// Ordered rule table: first cause with a matching needle wins.
/// Needles are lowercase and matched against the lowercased message.
const RULES: &[(KnownCause, &[&str])] = &[
    (
        KnownCause::ProtectedRef,
        &[
            "can only delete protected",
            "cannot delete protected",
            "protected branch",
            "protected tag",
            "protected ref",
            "gh006:",
        ],
    ),
    (
        KnownCause::HookRejected,
        &["pre-receive hook declined", "hook declined", "pre-receive hook"],
    ),
    (
        KnownCause::NetworkFailure,
        &[
            "could not resolve host",
            "connection timed out",
            "connection refused",
            "connection reset",
            "network is unreachable",
            "timed out",
            "the remote end hung up",
            "early eof",
        ],
    ),
    (
        KnownCause::PermissionDenied,
        &[
            "permission denied",
            "permission to",
            "access denied",
            "authentication failed",
            "returned error: 403",
            "not allowed",
        ],
    ),
    (
        KnownCause::RefNotFound,
        &[
            "remote ref does not exist",
            "not found",
            "does not exist",
            "no such ref",
        ],
    ),
];

/// Grouping key for a failure message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureCategory {
    /// One of the recognized root causes.
    Known(KnownCause),
    /// A generic command failure, normalized to its first line with ref
    /// names replaced.
    CommandFailed(String),
    /// Anything else: the (possibly truncated) message itself.
    Unclassified(String),
}

impl FailureCategory {
    pub fn key(&self) -> &str {
        match self {
            FailureCategory::Known(cause) => cause.key(),
            FailureCategory::CommandFailed(key) | FailureCategory::Unclassified(key) => key,
        }
    }

    pub fn known(&self) -> Option<KnownCause> {
        match self {
            FailureCategory::Known(cause) => Some(*cause),
            _ => None,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        self.known().map(KnownCause::hint)
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classify a raw failure message.
pub fn classify(raw: &str) -> FailureCategory {
    let diagnostic = diagnostic_text(raw).to_lowercase();

    for (cause, needles) in RULES {
        if needles.iter().any(|needle| diagnostic.contains(needle)) {
            return FailureCategory::Known(*cause);
        }
    }

    if raw.to_lowercase().contains("command failed") {
        let first_line = raw.lines().next().unwrap_or_default();
        return FailureCategory::CommandFailed(normalize_command_line(first_line));
    }

    FailureCategory::Unclassified(truncate_chars(raw, MAX_KEY_CHARS))
}

/// The part of a raw message the rule table looks at. The command line is
/// left out: it carries ref names, and a name like `fix/gh006-login` or
/// `not-found-page` must not decide the category.
fn diagnostic_text(raw: &str) -> &str {
    if let Some(rest) = raw.strip_prefix("Command failed:") {
        return rest.split_once('\n').map(|(_, output)| output).unwrap_or_default();
    }
    if raw.starts_with("Command timed out") {
        return raw.split_once(": ").map(|(head, _)| head).unwrap_or(raw);
    }
    raw
}

/// Replace the ref names in a `Command failed: git ...` line so that the
/// same command failing for different refs yields the same key.
///
/// Ref names are the arguments after the last option plus anything under
/// `refs/`. Consecutive placeholders collapse into one.
fn normalize_command_line(line: &str) -> String {
    let (prefix, command) = match line.find(':') {
        Some(idx) => line.split_at(idx + 1),
        None => ("", line),
    };

    let Ok(words) = shell_words::split(command) else {
        return line.trim().to_string();
    };

    let last_option = words.iter().rposition(|word| word.starts_with('-'));
    let mut normalized: Vec<&str> = Vec::with_capacity(words.len());
    for (index, word) in words.iter().enumerate() {
        let is_ref = word.starts_with("refs/") || last_option.is_some_and(|opt| index > opt);
        let word = if is_ref { REF_PLACEHOLDER } else { word.as_str() };
        if word == REF_PLACEHOLDER && normalized.last() == Some(&REF_PLACEHOLDER) {
            continue;
        }
        normalized.push(word);
    }

    format!("{} {}", prefix.trim(), normalized.join(" "))
        .trim()
        .to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
