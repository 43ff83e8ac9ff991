use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Date far enough in the past to be older than any cutoff the tests use.
pub(crate) const OLD_DATE: &str = "2001-01-01T00:00:00+00:00";

pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init"]);
    // Ensure the repo uses a deterministic default branch name across environments.
    // This sets HEAD to an unborn `main` branch before the first commit.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);

    std::fs::write(path.join("README.md"), "# Test\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    temp_dir
}

/// Test repo plus a bare repository registered as its `origin` remote.
///
/// Returns `(work, remote)`; both temp dirs must stay alive for the test.
pub(crate) fn create_test_repo_with_remote() -> (TempDir, TempDir) {
    let work = create_test_repo();
    let remote = TempDir::new().unwrap();

    git(remote.path(), &["init", "--bare"]);
    let remote_str = remote.path().to_string_lossy().to_string();
    git(work.path(), &["remote", "add", "origin", &remote_str]);
    git(work.path(), &["push", "origin", "main"]);

    (work, remote)
}

/// Create a branch whose tip commit carries the given author/committer date.
pub(crate) fn create_branch_at(repo: &Path, name: &str, date: &str) {
    git(repo, &["checkout", "-q", "-b", name, "main"]);
    let file = format!("{}.txt", name.replace('/', "_"));
    std::fs::write(repo.join(&file), format!("{}\n", name)).unwrap();
    git(repo, &["add", &file]);
    git_dated(repo, &["commit", "-q", "-m", &format!("work on {}", name)], date);
    git(repo, &["checkout", "-q", "main"]);
}

/// Create an annotated tag on `main` with the given tagger date.
pub(crate) fn create_tag_at(repo: &Path, name: &str, date: &str) {
    git_dated(repo, &["tag", "-a", name, "-m", &format!("tag {}", name)], date);
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) {
    run(repo_dir, args, None);
}

fn git_dated(repo_dir: &Path, args: &[&str], date: &str) {
    run(repo_dir, args, Some(date));
}

fn run(repo_dir: &Path, args: &[&str], date: Option<&str>) {
    let mut command = Command::new("git");
    command.current_dir(repo_dir).args(args);
    if let Some(date) = date {
        command
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date);
    }

    let output = command
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}

/// True if `refname` (e.g. `refs/heads/foo`) exists in the repository.
pub(crate) fn ref_exists(repo_dir: &Path, refname: &str) -> bool {
    Command::new("git")
        .current_dir(repo_dir)
        .args(["show-ref", "--verify", "--quiet", refname])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
