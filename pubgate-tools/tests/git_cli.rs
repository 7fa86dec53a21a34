//! `GitCli` against real repositories on disk (bare remote + clone).

use std::path::Path;
use std::process::Command;

use pubgate_core::{CommitSettings, Secret};
use pubgate_tools::{GitCli, GitClient};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Fixture")
        .env("GIT_AUTHOR_EMAIL", "fixture@example.test")
        .env("GIT_COMMITTER_NAME", "Fixture")
        .env("GIT_COMMITTER_EMAIL", "fixture@example.test")
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Bare remote with one commit containing `README.md`.
fn seeded_remote(root: &Path) -> std::path::PathBuf {
    let remote = root.join("remote.git");
    let seed = root.join("seed");
    std::fs::create_dir_all(&seed).expect("mkdir seed");
    git(root, &["init", "--bare", "remote.git"]);
    git(&seed, &["init"]);
    std::fs::write(seed.join("README.md"), "fixture\n").expect("write readme");
    git(&seed, &["add", "README.md"]);
    git(&seed, &["-c", "commit.gpgsign=false", "commit", "-m", "seed"]);
    git(&seed, &["push", remote.to_str().expect("utf8"), "HEAD:refs/heads/main"]);
    git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    remote
}

fn settings() -> CommitSettings {
    CommitSettings {
        author_name: "Release Bot".to_string(),
        author_email: "bot@example.test".to_string(),
        remote_username: "release-bot".to_string(),
        remote_token: Secret::new("unused-for-file-remotes"),
    }
}

#[tokio::test]
async fn clone_stage_commit_and_push_roundtrip() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let tmp = TempDir::new().expect("tmp");
    let remote = seeded_remote(tmp.path());
    let work = tmp.path().join("work");
    let cancel = CancellationToken::new();
    let client = GitCli::default();

    client
        .clone_repo(remote.to_str().expect("utf8"), &work, &cancel)
        .await
        .expect("clone");
    assert!(work.join("README.md").exists());
    assert!(!client.is_dirty(&work, &cancel).await.expect("status"));

    let hash = work.join("hash.txt");
    std::fs::write(&hash, "deadbeef").expect("write hash");
    // Untracked files alone do not make the checkout dirty.
    assert!(!client.is_dirty(&work, &cancel).await.expect("status"));

    assert!(client.add_if_untracked(&work, &hash, &cancel).await.expect("add"));
    assert!(!client.add_if_untracked(&work, &hash, &cancel).await.expect("add again"));
    assert!(client.is_dirty(&work, &cancel).await.expect("status"));

    client
        .commit(&work, "Updates hash for new version", &settings(), &cancel)
        .await
        .expect("commit");
    client.push(&work, &settings(), &cancel).await.expect("push");

    let log = git(&remote, &["log", "-1", "--format=%an <%ae>|%s"]);
    assert_eq!(log.trim(), "Release Bot <bot@example.test>|Updates hash for new version");
    let stored = git(&remote, &["show", "main:hash.txt"]);
    assert_eq!(stored, "deadbeef");
}

#[tokio::test]
async fn commit_includes_modified_tracked_files() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let tmp = TempDir::new().expect("tmp");
    let remote = seeded_remote(tmp.path());
    let work = tmp.path().join("work");
    let cancel = CancellationToken::new();
    let client = GitCli::default();

    client
        .clone_repo(remote.to_str().expect("utf8"), &work, &cancel)
        .await
        .expect("clone");
    std::fs::write(work.join("README.md"), "changed\n").expect("edit");
    assert!(client.is_dirty(&work, &cancel).await.expect("status"));

    client
        .commit(&work, "edit", &settings(), &cancel)
        .await
        .expect("commit");
    assert!(!client.is_dirty(&work, &cancel).await.expect("status"));
}

#[tokio::test]
async fn clone_of_missing_remote_fails() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let tmp = TempDir::new().expect("tmp");
    let err = GitCli::default()
        .clone_repo(
            tmp.path().join("missing.git").to_str().expect("utf8"),
            &tmp.path().join("work"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("clone"), "got: {err}");
}
