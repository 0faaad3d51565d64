// tests/git_repository_test.rs
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository as Git2Repo, ResetType};
use tempfile::TempDir;
use update_changelog::cli::{run_update_workflow, UpdateWorkflowArgs};
use update_changelog::config::Config;
use update_changelog::domain::ReleaseVersion;
use update_changelog::git::{Git2Repository, Repository};
use update_changelog::report::ReportGenerator;
use update_changelog::Result;

fn init_repo(dir: &TempDir) -> Git2Repo {
    let repo = Git2Repo::init(dir.path()).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Release Bot").unwrap();
        config.set_str("user.email", "release@example.com").unwrap();
    }
    repo
}

fn commit_file(repo: &Git2Repo, path: &str, content: &str, message: &str) -> Oid {
    let full = repo.workdir().unwrap().join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&full, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = repo.signature().unwrap();
    let parents: Vec<git2::Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
        .unwrap()
}

/// History used by most tests:
///
/// ```text
/// 7.1.0 ── main: releasenotes/notes/feature-x.yaml
///       └─ origin/7.1.x: releasenotes/notes/fix-y.yaml + src/fix.go
/// ```
fn release_history(dir: &TempDir) -> Git2Repo {
    let repo = init_repo(dir);

    let base = commit_file(
        &repo,
        "CHANGELOG.rst",
        "=============\nRelease Notes\n=============\n\n7.0.0\n=====\n",
        "initial",
    );
    let base_object = repo.find_object(base, None).unwrap();
    repo.tag_lightweight("7.1.0", &base_object, false).unwrap();

    commit_file(&repo, "releasenotes/notes/fix-y.yaml", "fixes: [y]\n", "fix y");
    let fix = commit_file(&repo, "src/fix.go", "package fix\n", "fix code");
    repo.reference("refs/remotes/origin/7.1.x", fix, true, "maintenance line")
        .unwrap();

    repo.reset(&base_object, ResetType::Hard, None).unwrap();
    commit_file(
        &repo,
        "releasenotes/notes/feature-x.yaml",
        "features: [x]\n",
        "feature x",
    );

    drop(base_object);
    repo
}

#[test]
fn test_list_tags() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Git2Repository::from_git2(release_history(&dir));

    assert_eq!(repo.list_tags().unwrap(), vec!["7.1.0".to_string()]);
}

#[test]
fn test_workdir_is_repository_root() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(&dir);
    let repo = Git2Repository::open(dir.path()).unwrap();

    assert_eq!(
        repo.workdir().unwrap().canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn test_changed_paths_in_symmetric_range() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Git2Repository::from_git2(release_history(&dir));

    let mut paths = repo.changed_paths("7.1.0", "remotes/origin/7.1.x").unwrap();
    paths.sort();

    assert_eq!(
        paths,
        vec![
            "releasenotes/notes/fix-y.yaml".to_string(),
            "src/fix.go".to_string(),
        ]
    );
}

/// Commit a single top-level file on top of `parents` without moving HEAD
fn detached_commit(repo: &Git2Repo, parents: &[Oid], file: &str, message: &str) -> Oid {
    let parents: Vec<git2::Commit> = parents
        .iter()
        .map(|oid| repo.find_commit(*oid).unwrap())
        .collect();
    let base_tree = parents.first().map(|parent| parent.tree().unwrap());
    let mut builder = repo.treebuilder(base_tree.as_ref()).unwrap();
    let blob = repo.blob(message.as_bytes()).unwrap();
    builder.insert(file, blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();

    let signature = repo.signature().unwrap();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(None, &signature, &signature, message, &tree, &parent_refs)
        .unwrap()
}

/// Criss-cross history with two merge bases between `left` and `right`:
///
/// ```text
/// root ─ x1 ─ m1(x1,y1) ─ x2   (left)
///     └─ y1 ─ m2(y1,x1) ─ y2   (right)
/// ```
#[test]
fn test_changed_paths_hides_every_merge_base() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(&dir);

    let root = detached_commit(&repo, &[], "root.txt", "root");
    let x1 = detached_commit(&repo, &[root], "x1.txt", "x1");
    let y1 = detached_commit(&repo, &[root], "y1.txt", "y1");
    let m1 = detached_commit(&repo, &[x1, y1], "m1.txt", "m1");
    let m2 = detached_commit(&repo, &[y1, x1], "m2.txt", "m2");
    let x2 = detached_commit(&repo, &[m1], "x2.txt", "x2");
    let y2 = detached_commit(&repo, &[m2], "y2.txt", "y2");
    repo.reference("refs/heads/left", x2, true, "left").unwrap();
    repo.reference("refs/heads/right", y2, true, "right").unwrap();
    assert_eq!(repo.merge_bases(x2, y2).unwrap().len(), 2);

    let repo = Git2Repository::from_git2(repo);
    let mut paths = repo.changed_paths("left", "right").unwrap();
    paths.sort();

    assert_eq!(paths, vec!["x2.txt".to_string(), "y2.txt".to_string()]);
}

#[test]
fn test_changed_paths_unknown_revision() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Git2Repository::from_git2(release_history(&dir));

    let err = repo
        .changed_paths("6.9.0", "remotes/origin/6.9.x")
        .unwrap_err();
    assert!(err.to_string().contains("6.9.0"));
}

#[test]
fn test_remove_then_reset_restores_files() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Git2Repository::from_git2(release_history(&dir));
    let fragment = "releasenotes/notes/feature-x.yaml".to_string();
    let on_disk = dir.path().join(&fragment);

    repo.remove_paths(&[fragment.clone()]).unwrap();
    assert!(!on_disk.exists());
    let index = Git2Repo::open(dir.path()).unwrap().index().unwrap();
    assert!(index.get_path(Path::new(&fragment), 0).is_none());

    repo.reset_hard().unwrap();
    assert!(on_disk.exists());
    let index = Git2Repo::open(dir.path()).unwrap().index().unwrap();
    assert!(index.get_path(Path::new(&fragment), 0).is_some());
}

#[test]
fn test_remove_untracked_path_fails_without_changes() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Git2Repository::from_git2(release_history(&dir));
    let tracked = "releasenotes/notes/feature-x.yaml".to_string();

    let err = repo
        .remove_paths(&[tracked.clone(), "releasenotes/notes/fix-y.yaml".to_string()])
        .unwrap_err();

    assert!(err.to_string().contains("did not match any files"));
    assert!(dir.path().join(&tracked).exists());
}

#[test]
fn test_stage_and_commit() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Git2Repository::from_git2(release_history(&dir));
    let before = Git2Repo::open(dir.path())
        .unwrap()
        .head()
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .id();

    fs::write(dir.path().join("CHANGELOG.rst"), "7.2.0\n=====\n").unwrap();
    repo.stage_path(Path::new("CHANGELOG.rst")).unwrap();
    let id = repo.commit("Update CHANGELOG for 7.2.0").unwrap();

    let check = Git2Repo::open(dir.path()).unwrap();
    let head = check.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.id().to_string(), id);
    assert_eq!(head.message(), Some("Update CHANGELOG for 7.2.0"));
    assert_eq!(head.parent_id(0).unwrap(), before);

    let entry = head
        .tree()
        .unwrap()
        .get_path(Path::new("CHANGELOG.rst"))
        .unwrap();
    let blob = check.find_blob(entry.id()).unwrap();
    assert_eq!(blob.content(), b"7.2.0\n=====\n");
}

#[test]
fn test_fetch_brings_remote_branches_and_tags() {
    let upstream_dir = tempfile::tempdir().unwrap();
    let upstream = init_repo(&upstream_dir);
    let released = commit_file(&upstream, "README", "hello\n", "initial");
    let released_commit = upstream.find_commit(released).unwrap();
    upstream.branch("7.1.x", &released_commit, false).unwrap();
    upstream
        .tag_lightweight("7.2.0", released_commit.as_object(), false)
        .unwrap();

    let local_dir = tempfile::tempdir().unwrap();
    let local = init_repo(&local_dir);
    local
        .remote("origin", upstream_dir.path().to_str().unwrap())
        .unwrap();

    let repo = Git2Repository::from_git2(local);
    repo.fetch("origin").unwrap();

    assert!(repo.list_tags().unwrap().contains(&"7.2.0".to_string()));
    let check = Git2Repo::open(local_dir.path()).unwrap();
    let remote_branch = check.find_reference("refs/remotes/origin/7.1.x").unwrap();
    assert_eq!(remote_branch.target(), Some(released));
}

#[test]
fn test_fetch_unknown_remote_fails() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Git2Repository::from_git2(release_history(&dir));

    let err = repo.fetch("nowhere").unwrap_err();
    assert!(err.to_string().contains("nowhere"));
}

const OLD_CHANGELOG: &str = "=============\n\
                             Release Notes\n\
                             =============\n\
                             \n\
                             7.1.0\n\
                             =====\n\
                             \n\
                             - Fixed y.\n";

const REPORT: &str = "=============\n\
                      Release Notes\n\
                      =============\n\
                      \n\
                      7.2.0\n\
                      =====\n\
                      \n\
                      - Added x.\n\n";

/// Report generator that notes whether the stale fragment was on disk
struct CheckingGenerator {
    fragment: PathBuf,
    fragment_present: Cell<Option<bool>>,
}

impl ReportGenerator for CheckingGenerator {
    fn generate(&self, _earliest: &ReleaseVersion, _version: &ReleaseVersion) -> Result<String> {
        self.fragment_present.set(Some(self.fragment.exists()));
        Ok(REPORT.to_string())
    }

    fn describe(&self, earliest: &ReleaseVersion, version: &ReleaseVersion) -> String {
        format!("checking-report {}..{}", earliest, version)
    }
}

/// Upstream with a 7.1.x maintenance branch whose fix fragment was also
/// forward-ported to the main line, tagged 7.2.0
fn upstream_release(dir: &TempDir) {
    let repo = init_repo(dir);

    let base = commit_file(&repo, "CHANGELOG.rst", OLD_CHANGELOG, "release 7.1.0");
    let base_object = repo.find_object(base, None).unwrap();
    repo.tag_lightweight("7.1.0", &base_object, false).unwrap();

    let fix = commit_file(&repo, "releasenotes/notes/fix-y.yaml", "fixes: [y]\n", "fix y");
    repo.branch("7.1.x", &repo.find_commit(fix).unwrap(), false)
        .unwrap();

    repo.reset(&base_object, ResetType::Hard, None).unwrap();
    commit_file(&repo, "releasenotes/notes/fix-y.yaml", "fixes: [y]\n", "forward-port fix y");
    let head = commit_file(
        &repo,
        "releasenotes/notes/feature-x.yaml",
        "features: [x]\n",
        "feature x",
    );
    repo.tag_lightweight("7.2.0", &repo.find_object(head, None).unwrap(), false)
        .unwrap();
}

#[test]
fn test_update_workflow_commits_changelog_in_real_repository() {
    let upstream_dir = tempfile::tempdir().unwrap();
    upstream_release(&upstream_dir);

    let local_dir = tempfile::tempdir().unwrap();
    let local = Git2Repo::clone(upstream_dir.path().to_str().unwrap(), local_dir.path()).unwrap();
    {
        let mut config = local.config().unwrap();
        config.set_str("user.name", "Release Bot").unwrap();
        config.set_str("user.email", "release@example.com").unwrap();
    }
    let before = local.head().unwrap().peel_to_commit().unwrap().id();

    let fragment = "releasenotes/notes/fix-y.yaml";
    let generator = CheckingGenerator {
        fragment: local_dir.path().join(fragment),
        fragment_present: Cell::new(None),
    };
    let args = UpdateWorkflowArgs {
        new_version: "7.2.0".to_string(),
        dry_run: false,
        keep_fragment_removal: false,
    };

    let repo = Git2Repository::from_git2(local);
    let result = run_update_workflow(&args, &Config::default(), &repo, &generator).unwrap();

    assert_eq!(result.removed_fragments, vec![fragment.to_string()]);
    assert!(result.removals_reset);
    assert_eq!(generator.fragment_present.get(), Some(false));
    assert!(local_dir.path().join(fragment).exists());

    let check = Git2Repo::open(local_dir.path()).unwrap();
    let head = check.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(result.commit, Some(head.id().to_string()));
    assert_eq!(head.message(), Some("Update CHANGELOG for 7.2.0"));
    assert_eq!(head.parent_id(0).unwrap(), before);

    let tree = head.tree().unwrap();
    let entry = tree.get_path(Path::new("CHANGELOG.rst")).unwrap();
    let blob = check.find_blob(entry.id()).unwrap();
    let expected = format!("{}7.1.0\n=====\n\n- Fixed y.\n", REPORT);
    assert_eq!(blob.content(), expected.as_bytes());
    assert!(tree.get_path(Path::new(fragment)).is_ok());
    assert!(check.statuses(None).unwrap().is_empty());
}
