//! Throwaway repositories for tests.

use std::fs;
use std::path::Path;

use git2::Repository;

pub fn create_test_repo() -> (tempfile::TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test").unwrap();
    config.set_str("user.email", "test@test.com").unwrap();

    (dir, repo)
}

/// Write `files`, stage them, and commit as `name <email>`.
pub fn commit_as(
    repo: &Repository,
    name: &str,
    email: &str,
    files: &[(&str, &str)],
    message: &str,
) -> git2::Oid {
    let sig = git2::Signature::new(name, email, &git2::Time::new(1_700_000_000, 0)).unwrap();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_oid = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_oid).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

pub fn make_commit(repo: &Repository, files: &[(&str, &str)], message: &str) -> git2::Oid {
    commit_as(repo, "Test", "test@test.com", files, message)
}
