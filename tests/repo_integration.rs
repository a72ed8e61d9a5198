//! Integration tests for repository operations.
//!
//! These tests use real repositories created in tempfile directories to
//! verify lookup, commit, stage, branch, reset and merge end to end.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use gitbridge::core::types::{Oid, ResetMode};
use gitbridge::git::{GitError, MergeClass, MergeOutcome, Repo, RepoOptions};
use gitbridge::transport::{Author, Credentials};

/// Test fixture: a repository with one commit of `a.txt` on master.
struct TestRepo {
    dir: TempDir,
    repo: Repo,
    initial: Oid,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let creds = Credentials::new("tester", "pw")
            .with_author(Author::new("Test User", "test@example.com"));
        let repo = Repo::init(dir.path(), RepoOptions::default().with_credentials(creds))
            .expect("failed to init repo");

        fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        repo.add("a.txt").unwrap();
        let initial = repo.commit("init").unwrap();

        Self { dir, repo, initial }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn read(&self, file: &str) -> String {
        fs::read_to_string(self.path().join(file)).unwrap()
    }

    /// Write, stage and commit a file on the checked-out branch.
    fn commit_file(&self, file: &str, content: &str, message: &str) -> Oid {
        fs::write(self.path().join(file), content).unwrap();
        self.repo.add(file).unwrap();
        self.repo.commit(message).unwrap()
    }

    /// Commit a file onto `branch` without touching HEAD, index or worktree.
    fn commit_on_branch(&self, branch: &str, file: &str, content: &str) -> Oid {
        let raw = git2::Repository::open(self.path()).unwrap();
        let refname = format!("refs/heads/{branch}");
        let parent = raw
            .find_reference(&refname)
            .unwrap()
            .peel_to_commit()
            .unwrap();

        let blob = raw.blob(content.as_bytes()).unwrap();
        let mut builder = raw.treebuilder(Some(&parent.tree().unwrap())).unwrap();
        builder.insert(file, blob, 0o100644).unwrap();
        let tree = raw.find_tree(builder.write().unwrap()).unwrap();

        let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
        let id = raw
            .commit(Some(&refname), &sig, &sig, "on branch", &tree, &[&parent])
            .unwrap();
        Oid::from_git2(id)
    }

    fn raw(&self) -> git2::Repository {
        git2::Repository::open(self.path()).unwrap()
    }
}

// =============================================================================
// Lookup and Commit
// =============================================================================

#[test]
fn head_is_forty_lowercase_hex() {
    let repo = TestRepo::new();
    let head = repo.repo.lookup("HEAD").unwrap();

    assert_eq!(head.as_str().len(), 40);
    assert!(head
        .as_str()
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    assert_eq!(head, repo.initial);
}

#[test]
fn literal_id_and_reference_resolve_alike() {
    let repo = TestRepo::new();
    assert_eq!(repo.repo.lookup(repo.initial.as_str()).unwrap(), repo.initial);
    assert_eq!(repo.repo.lookup("refs/heads/master").unwrap(), repo.initial);
}

#[test]
fn lookup_unknown_reference_fails() {
    let repo = TestRepo::new();
    let err = repo.repo.lookup("refs/heads/nope").unwrap_err();
    assert!(matches!(err, GitError::RefLookup { .. }));
    assert!(err.to_string().starts_with("git reference lookup error:"));
}

#[test]
fn commit_moves_head_and_records_parent() {
    let repo = TestRepo::new();
    let second = repo.commit_file("b.txt", "b\n", "second");

    assert_eq!(repo.repo.lookup("HEAD").unwrap(), second);
    let raw = repo.raw();
    let commit = raw.find_commit(second.to_git2().unwrap()).unwrap();
    assert_eq!(commit.parent_id(0).unwrap(), repo.initial.to_git2().unwrap());
    assert_eq!(commit.message(), Some("second"));
}

#[test]
fn commit_falls_back_to_repository_signature() {
    let dir = TempDir::new().unwrap();
    let repo = Repo::init(dir.path(), RepoOptions::default()).unwrap();
    {
        let mut config = git2::Repository::open(dir.path()).unwrap().config().unwrap();
        config.set_str("user.name", "Config User").unwrap();
        config.set_str("user.email", "config@example.com").unwrap();
    }

    fs::write(dir.path().join("a.txt"), "a\n").unwrap();
    repo.add("a.txt").unwrap();
    let id = repo.commit("init").unwrap();

    let raw = git2::Repository::open(dir.path()).unwrap();
    let commit = raw.find_commit(id.to_git2().unwrap()).unwrap();
    assert_eq!(commit.author().name(), Some("Config User"));
}

// =============================================================================
// Staging
// =============================================================================

#[test]
fn add_returns_staged_path_for_change() {
    let repo = TestRepo::new();
    fs::write(repo.path().join("a.txt"), "changed\n").unwrap();
    assert_eq!(repo.repo.add("a.txt").unwrap(), vec!["a.txt".to_string()]);
}

#[test]
fn add_unchanged_path_stages_nothing() {
    let repo = TestRepo::new();
    assert!(repo.repo.add("a.txt").unwrap().is_empty());
}

#[test]
fn add_stages_deletion() {
    let repo = TestRepo::new();
    repo.commit_file("b.txt", "b\n", "add b");
    fs::remove_file(repo.path().join("b.txt")).unwrap();

    assert_eq!(repo.repo.add("b.txt").unwrap(), vec!["b.txt".to_string()]);
    let id = repo.repo.commit("remove b").unwrap();

    let raw = repo.raw();
    let tree = raw.find_commit(id.to_git2().unwrap()).unwrap().tree().unwrap();
    assert!(tree.get_name("b.txt").is_none());
    assert!(tree.get_name("a.txt").is_some());
}

// =============================================================================
// Branches and Remotes
// =============================================================================

#[test]
fn branch_created_once_and_never_moved() {
    let repo = TestRepo::new();
    assert!(repo.repo.branch("feature", "HEAD").unwrap());

    let later = repo.commit_file("b.txt", "b\n", "second");
    assert!(!repo.repo.branch("feature", later.as_str()).unwrap());
    assert_eq!(repo.repo.lookup("refs/heads/feature").unwrap(), repo.initial);
}

#[test]
fn branch_with_unknown_base_fails() {
    let repo = TestRepo::new();
    assert!(matches!(
        repo.repo.branch("feature", "refs/heads/missing"),
        Err(GitError::RefLookup { .. })
    ));
}

#[test]
fn branch_with_invalid_name_fails() {
    let repo = TestRepo::new();
    assert!(repo.repo.branch("bad..name", "HEAD").is_err());
}

#[test]
fn remote_add_then_lookup() {
    let repo = TestRepo::new();
    assert!(matches!(
        repo.repo.remote("origin", None),
        Err(GitError::Remote { .. })
    ));

    repo.repo.remote("origin", Some("https://example.com/repo.git")).unwrap();
    let found = repo.repo.remote("origin", None).unwrap();
    assert_eq!(found.url(), Some("https://example.com/repo.git"));
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn hard_reset_restores_tree() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "two\n", "second");
    assert_eq!(repo.read("a.txt"), "two\n");

    repo.repo.reset(repo.initial.as_str(), ResetMode::Hard).unwrap();

    assert_eq!(repo.read("a.txt"), "one\n");
    assert_eq!(repo.repo.lookup("HEAD").unwrap(), repo.initial);
}

#[test]
fn soft_reset_keeps_worktree() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "two\n", "second");

    repo.repo.reset(repo.initial.as_str(), ResetMode::Soft).unwrap();

    assert_eq!(repo.read("a.txt"), "two\n");
    assert_eq!(repo.repo.lookup("HEAD").unwrap(), repo.initial);
}

#[test]
fn reset_to_unknown_commit_fails() {
    let repo = TestRepo::new();
    assert!(repo.repo.reset("refs/heads/missing", ResetMode::Hard).is_err());
    assert_eq!(repo.repo.lookup("HEAD").unwrap(), repo.initial);
}

// =============================================================================
// Merge
// =============================================================================

#[test]
fn merging_current_tip_is_already_merged() {
    let repo = TestRepo::new();
    assert_eq!(repo.repo.merge("HEAD").unwrap(), MergeOutcome::AlreadyMerged);
}

#[test]
fn merging_ancestor_is_already_merged() {
    let repo = TestRepo::new();
    repo.commit_file("b.txt", "b\n", "second");
    assert_eq!(
        repo.repo.merge(repo.initial.as_str()).unwrap(),
        MergeOutcome::AlreadyMerged
    );
}

#[test]
fn descendant_is_fast_forward_and_nothing_moves() {
    let repo = TestRepo::new();
    repo.repo.branch("feature", "HEAD").unwrap();
    let ahead = repo.commit_on_branch("feature", "b.txt", "b\n");

    assert_eq!(
        repo.repo.classify_merge("refs/heads/feature").unwrap(),
        MergeClass::FastForward
    );
    assert_eq!(
        repo.repo.merge("refs/heads/feature").unwrap(),
        MergeOutcome::FastForward(ahead)
    );
    assert_eq!(repo.repo.lookup("refs/heads/master").unwrap(), repo.initial);
    assert!(!repo.path().join("b.txt").exists());
}

#[test]
fn diverged_history_merges_and_commits_with_two_parents() {
    let repo = TestRepo::new();
    repo.repo.branch("feature", "HEAD").unwrap();
    let theirs = repo.commit_on_branch("feature", "b.txt", "b\n");
    let ours = repo.commit_file("c.txt", "c\n", "ours");

    assert_eq!(repo.repo.merge("refs/heads/feature").unwrap(), MergeOutcome::Merged);
    assert_eq!(repo.read("b.txt"), "b\n");
    assert_eq!(repo.raw().state(), git2::RepositoryState::Merge);

    let merge = repo.repo.commit("merge feature").unwrap();
    let raw = repo.raw();
    let commit = raw.find_commit(merge.to_git2().unwrap()).unwrap();
    let parents: Vec<_> = commit.parent_ids().map(Oid::from_git2).collect();
    assert_eq!(parents, vec![ours, theirs]);
    assert_eq!(raw.state(), git2::RepositoryState::Clean);
}

#[test]
fn conflicting_merge_reports_conflict_and_hard_reset_clears_it() {
    let repo = TestRepo::new();
    repo.repo.branch("feature", "HEAD").unwrap();
    repo.commit_on_branch("feature", "a.txt", "theirs\n");
    let ours = repo.commit_file("a.txt", "ours\n", "ours");

    let err = repo.repo.merge("refs/heads/feature").unwrap_err();
    assert!(matches!(err, GitError::MergeConflict));
    assert!(repo.raw().index().unwrap().has_conflicts());

    repo.repo.reset("HEAD", ResetMode::Hard).unwrap();
    assert!(!repo.raw().index().unwrap().has_conflicts());
    assert_eq!(repo.read("a.txt"), "ours\n");
    assert_eq!(repo.repo.lookup("HEAD").unwrap(), ours);
}

#[test]
fn unrelated_history_has_no_merge_base() {
    let repo = TestRepo::new();
    let raw = repo.raw();
    let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
    let tree = raw.find_tree(raw.treebuilder(None).unwrap().write().unwrap()).unwrap();
    let orphan = raw
        .commit(Some("refs/heads/orphan"), &sig, &sig, "orphan", &tree, &[])
        .unwrap();

    assert!(matches!(
        repo.repo.merge(&orphan.to_string()),
        Err(GitError::MergeBase { .. })
    ));
}

#[test]
fn primary_branch_is_configurable() {
    let dir = TempDir::new().unwrap();
    let creds = Credentials::new("tester", "pw")
        .with_author(Author::new("Test User", "test@example.com"));
    let options = RepoOptions::default()
        .with_credentials(creds)
        .with_primary_branch(gitbridge::core::types::BranchName::new("main").unwrap());
    let repo = Repo::init(dir.path(), options).unwrap();

    fs::write(dir.path().join("a.txt"), "a\n").unwrap();
    repo.add("a.txt").unwrap();
    let id = repo.commit("init").unwrap();

    assert_eq!(repo.lookup("refs/heads/main").unwrap(), id);
    assert_eq!(repo.merge("HEAD").unwrap(), MergeOutcome::AlreadyMerged);
}
