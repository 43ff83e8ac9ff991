//! Tests for ref listing and planning.

use super::*;
use crate::config::{CleanConfig, CleanTarget};
use crate::protection::ProtectionConfig;
use crate::test_support::{
    OLD_DATE, create_branch_at, create_tag_at, create_test_repo, create_test_repo_with_remote, git,
};
use chrono::{TimeZone, Utc};

fn item(name: &str, timestamp_unix: i64) -> RefItem {
    RefItem {
        name: name.to_string(),
        timestamp_unix,
        timestamp_display: String::new(),
        author: "someone".to_string(),
        subject: "subject".to_string(),
    }
}

fn names(items: &[RefItem]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

// ============================================================================
// RefKind
// ============================================================================

#[test]
fn test_ref_kind_scope_and_refname() {
    assert_eq!(RefKind::LocalBranch.scope(), DeleteScope::Local);
    assert_eq!(RefKind::LocalTag.scope(), DeleteScope::Local);
    assert_eq!(RefKind::RemoteBranch.scope(), DeleteScope::Remote);
    assert_eq!(RefKind::RemoteTag.scope(), DeleteScope::Remote);

    assert_eq!(RefKind::RemoteBranch.full_refname("a/b"), "refs/heads/a/b");
    assert_eq!(RefKind::RemoteTag.full_refname("v1"), "refs/tags/v1");
    assert_eq!(RefKind::LocalTag.to_string(), "local-tag");
}

// ============================================================================
// parse_ref_line
// ============================================================================

#[test]
fn test_parse_ref_line() {
    let line = "refs/heads/feature/x\u{1f}978307200\u{1f}2001-01-01 00:00:00 +0000\u{1f}Test User\u{1f}work: a | b";
    let parsed = parse_ref_line(line, "refs/heads/").unwrap();

    assert_eq!(parsed.name, "feature/x");
    assert_eq!(parsed.timestamp_unix, 978307200);
    assert_eq!(parsed.timestamp_display, "2001-01-01 00:00:00 +0000");
    assert_eq!(parsed.author, "Test User");
    assert_eq!(parsed.subject, "work: a | b");
}

#[test]
fn test_parse_ref_line_rejects_bad_input() {
    assert_eq!(parse_ref_line("refs/heads/x\u{1f}not-a-number", "refs/heads/"), None);
    assert_eq!(parse_ref_line("refs/tags/x\u{1f}1", "refs/heads/"), None);
    assert_eq!(parse_ref_line("refs/heads/\u{1f}1", "refs/heads/"), None);
    assert_eq!(parse_ref_line("", "refs/heads/"), None);
}

#[test]
fn test_parse_ref_line_tolerates_missing_trailing_fields() {
    let parsed = parse_ref_line("refs/tags/v1\u{1f}5", "refs/tags/").unwrap();
    assert_eq!(parsed.name, "v1");
    assert_eq!(parsed.author, "");
}

// ============================================================================
// list_refs
// ============================================================================

#[test]
fn test_list_local_branches() {
    let repo = create_test_repo();
    create_branch_at(repo.path(), "old/feature", OLD_DATE);

    let items = list_refs(repo.path(), RefKind::LocalBranch, "origin").unwrap();
    let old = items.iter().find(|item| item.name == "old/feature").unwrap();

    assert!(items.iter().any(|item| item.name == "main"));
    assert_eq!(old.timestamp_unix, 978307200);
    assert_eq!(old.author, "Test User");
    assert_eq!(old.subject, "work on old/feature");
}

#[test]
fn test_list_tags_uses_tagger() {
    let repo = create_test_repo();
    create_tag_at(repo.path(), "v0.1", OLD_DATE);
    git(repo.path(), &["tag", "lightweight"]);

    let items = list_refs(repo.path(), RefKind::LocalTag, "origin").unwrap();
    let annotated = items.iter().find(|item| item.name == "v0.1").unwrap();

    assert_eq!(annotated.timestamp_unix, 978307200);
    assert_eq!(annotated.author, "Test User");
    assert_eq!(annotated.subject, "tag v0.1");
    assert!(items.iter().any(|item| item.name == "lightweight"));
}

#[test]
fn test_list_remote_branches_strips_prefix_and_skips_head() {
    let (work, _remote) = create_test_repo_with_remote();
    create_branch_at(work.path(), "stale", OLD_DATE);
    git(work.path(), &["push", "origin", "stale"]);
    git(work.path(), &["fetch", "origin"]);
    git(
        work.path(),
        &["symbolic-ref", "refs/remotes/origin/HEAD", "refs/remotes/origin/main"],
    );

    let items = list_refs(work.path(), RefKind::RemoteBranch, "origin").unwrap();

    assert_eq!(names(&items), vec!["main", "stale"]);
}

#[test]
fn test_list_refs_outside_repository_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(list_refs(dir.path(), RefKind::LocalBranch, "origin").is_err());
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_cutoff_timestamp() {
    let now = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
    let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp();
    assert_eq!(cutoff_timestamp(30, now), expected);
    assert_eq!(cutoff_timestamp(0, now), now.timestamp());
}

#[test]
fn test_select_candidates_filters_and_sorts() {
    let protection = ProtectionConfig {
        protected_patterns: vec!["main".to_string(), "release-*".to_string()],
        force_delete_patterns: vec!["release-0.*".to_string()],
    };
    let items = vec![
        item("recent", 1_000),
        item("b-old", 300),
        item("main", 10),
        item("release-1.0", 20),
        item("release-0.9", 400),
        item("a-old", 100),
        item("at-cutoff", 500),
    ];

    let candidates = select_candidates(items, 500, &protection);

    assert_eq!(names(&candidates), vec!["a-old", "b-old", "release-0.9"]);
}

#[test]
fn test_select_candidates_is_stable_for_equal_timestamps() {
    let items = vec![item("z", 1), item("a", 1), item("m", 1)];
    let candidates = select_candidates(items, 2, &ProtectionConfig::default());
    assert_eq!(names(&candidates), vec!["z", "a", "m"]);
}

#[test]
fn test_plan_excludes_current_and_protected_branches() {
    let repo = create_test_repo();
    create_branch_at(repo.path(), "old-1", OLD_DATE);
    create_branch_at(repo.path(), "develop", OLD_DATE);
    create_branch_at(repo.path(), "current-old", OLD_DATE);
    git(repo.path(), &["checkout", "-q", "current-old"]);

    let config = CleanConfig::default();
    let plan = build_cleanup_plan(repo.path(), &config, Utc::now()).unwrap();

    assert_eq!(names(&plan.local_branches), vec!["old-1"]);
    assert!(plan.remote_branches.is_empty());
}

#[test]
fn test_plan_recent_refs_are_kept() {
    let repo = create_test_repo();
    create_branch_at(repo.path(), "fresh", "2090-01-01T00:00:00+00:00");

    let plan = build_cleanup_plan(repo.path(), &CleanConfig::default(), Utc::now()).unwrap();

    assert!(plan.is_empty());
}

#[test]
fn test_plan_skips_remote_kinds_without_remote() {
    let repo = create_test_repo();
    create_tag_at(repo.path(), "v0.1", OLD_DATE);

    let plan = build_cleanup_plan(repo.path(), &CleanConfig::default(), Utc::now()).unwrap();

    assert_eq!(names(&plan.local_tags), vec!["v0.1"]);
    assert!(plan.remote_tags.is_empty());
    assert_eq!(plan.total(), 1);
}

#[test]
fn test_plan_with_remote_covers_every_kind() {
    let (work, _remote) = create_test_repo_with_remote();
    create_branch_at(work.path(), "stale", OLD_DATE);
    create_tag_at(work.path(), "v0.1", OLD_DATE);
    git(work.path(), &["push", "origin", "stale", "v0.1"]);

    let plan = build_cleanup_plan(work.path(), &CleanConfig::default(), Utc::now()).unwrap();

    assert_eq!(names(&plan.local_branches), vec!["stale"]);
    assert_eq!(names(&plan.remote_branches), vec!["stale"]);
    assert_eq!(names(&plan.local_tags), vec!["v0.1"]);
    assert_eq!(names(&plan.remote_tags), vec!["v0.1"]);
    assert_eq!(plan.total(), 4);
}

#[test]
fn test_plan_honors_targets_and_tag_protection() {
    let (work, _remote) = create_test_repo_with_remote();
    create_branch_at(work.path(), "stale", OLD_DATE);
    create_tag_at(work.path(), "v0.1", OLD_DATE);
    create_tag_at(work.path(), "keep-me", OLD_DATE);

    let mut config = CleanConfig::default();
    config.clean_targets = vec![CleanTarget::Tags];
    config.protected_tags = vec!["keep-*".to_string()];

    let plan = build_cleanup_plan(work.path(), &config, Utc::now()).unwrap();

    assert!(plan.local_branches.is_empty());
    assert!(plan.remote_branches.is_empty());
    assert_eq!(names(&plan.local_tags), vec!["v0.1"]);
    assert_eq!(names(plan.candidates(RefKind::RemoteTag)), vec!["v0.1"]);
}
