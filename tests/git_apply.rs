//! Round trip against a real git repository: diff, extract one hunk,
//! stage it with `git apply --cached`, and unstage it again.

use std::fs;
use std::path::Path;
use std::process::Command;

use diffhunk::prelude::*;
use git2::{Repository, Signature};
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn init_repo(dir: &Path) -> Repository {
    let repo = Repository::init(dir).expect("init repo");
    {
        let mut config = repo.config().expect("config");
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    repo
}

fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().expect("index");
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .expect("add");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let sig = Signature::now("Test User", "test@example.com").expect("sig");
    let parent = repo
        .head()
        .ok()
        .and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("commit");
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn extracted_hunk_stages_and_unstages() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }

    let dir = TempDir::new().expect("tempdir");
    let repo = init_repo(dir.path());

    let file = dir.path().join("alpha.txt");
    fs::write(&file, "one\ntwo\nthree\nfour\nfive\n").unwrap();
    commit_all(&repo, "initial");

    // two separated edits produce two hunks with -U1
    fs::write(&file, "ONE\ntwo\nthree\nfour\nFIVE\n").unwrap();
    let diff_text = run_git(dir.path(), &["diff", "-U1", "--", "alpha.txt"]);
    assert!(!diff_text.is_empty());

    let doc = TextDocument::new(&diff_text);
    let mut view = DiffView::new();
    while view.idle_scan(&doc) {}
    let hunks: Vec<usize> = view
        .index()
        .iter()
        .filter(|(_, r)| r.hunk().is_some())
        .map(|(_, r)| r.line())
        .collect();
    assert_eq!(hunks.len(), 2);

    // stage only the first hunk
    let patch = view.extract_patch(&doc, hunks[0]).unwrap();
    let applier = GitApplier::new(dir.path());
    applier.apply(&patch, ApplyMode::Stage).expect("stage");

    let staged = run_git(dir.path(), &["diff", "--cached", "--", "alpha.txt"]);
    assert!(staged.contains("+ONE"));
    assert!(!staged.contains("+FIVE"));

    // reverse it and the index is clean again
    applier.apply(&patch, ApplyMode::Unstage).expect("unstage");
    let staged = run_git(dir.path(), &["diff", "--cached", "--", "alpha.txt"]);
    assert!(staged.is_empty());
}

#[test]
fn rejected_patch_reports_git_error() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }

    let dir = TempDir::new().expect("tempdir");
    init_repo(dir.path());

    let bogus = "diff --git a/missing.txt b/missing.txt\n\
                 --- a/missing.txt\n\
                 +++ b/missing.txt\n\
                 @@ -1,1 +1,1 @@\n\
                 -not there\n\
                 +still not there\n";
    let err = GitApplier::new(dir.path())
        .apply(bogus, ApplyMode::Stage)
        .unwrap_err();
    match err {
        ApplyError::GitError(message) => assert!(!message.is_empty()),
        other => panic!("unexpected error: {other}"),
    }
}
