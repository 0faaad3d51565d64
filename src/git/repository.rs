use crate::error::{Result, UpdateChangelogError};
use git2::{Oid, Repository as Git2Repo};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn resolve_commit(&self, spec: &str) -> Result<Oid> {
        let commit = self
            .repo
            .revparse_single(spec)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| {
                UpdateChangelogError::Git(git2::Error::from_str(&format!(
                    "cannot resolve revision '{}': {}",
                    spec,
                    e.message()
                )))
            })?;

        Ok(commit.id())
    }

    /// Paths a single non-merge commit changed relative to its parent
    fn commit_paths(&self, oid: Oid) -> Result<Vec<String>> {
        let commit = self.repo.find_commit(oid)?;
        if commit.parent_count() > 1 {
            return Ok(Vec::new());
        }

        let tree = commit.tree()?;
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        Ok(diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| path.to_string_lossy().into_owned())
            .collect())
    }
}

impl super::Repository for Git2Repository {
    fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                UpdateChangelogError::Git(git2::Error::from_str(
                    "repository has no working tree (bare repository)",
                ))
            })
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn fetch(&self, remote_name: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            UpdateChangelogError::Git(git2::Error::from_str(&format!(
                "cannot find remote '{}': {}",
                remote_name,
                e.message()
            )))
        })?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }

                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
            }

            git2::Cred::default()
        });

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let refspec_heads = format!("+refs/heads/*:refs/remotes/{}/*", remote_name);
        let refspecs = [refspec_heads.as_str(), "+refs/tags/*:refs/tags/*"];

        tracing::debug!(remote = remote_name, "fetching heads and tags");
        remote
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .map_err(|e| {
                UpdateChangelogError::Git(git2::Error::from_str(&format!(
                    "fetch from '{}' failed: {}",
                    remote_name,
                    e.message()
                )))
            })?;

        Ok(())
    }

    fn changed_paths(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let from_oid = self.resolve_commit(from)?;
        let to_oid = self.resolve_commit(to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TIME)?;
        revwalk.push(from_oid)?;
        revwalk.push(to_oid)?;

        match self.repo.merge_bases(from_oid, to_oid) {
            Ok(bases) => {
                for base in bases.iter() {
                    revwalk.hide(*base)?;
                }
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for oid in revwalk {
            for path in self.commit_paths(oid?)? {
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        }

        tracing::debug!(from, to, count = paths.len(), "collected changed paths");
        Ok(paths)
    }

    fn remove_paths(&self, paths: &[String]) -> Result<()> {
        let workdir = self.workdir()?;
        let mut index = self.repo.index()?;

        if let Some(untracked) = paths
            .iter()
            .find(|path| index.get_path(Path::new(path.as_str()), 0).is_none())
        {
            return Err(UpdateChangelogError::Git(git2::Error::from_str(&format!(
                "pathspec '{}' did not match any files",
                untracked
            ))));
        }

        for path in paths {
            let on_disk = workdir.join(path);
            if on_disk.exists() {
                fs::remove_file(&on_disk)?;
            }
            index.remove_path(Path::new(path.as_str()))?;
        }

        index.write()?;
        Ok(())
    }

    fn reset_hard(&self) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo
            .reset(head.as_object(), git2::ResetType::Hard, None)?;
        Ok(())
    }

    fn stage_path(&self, path: &Path) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_path(path)?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let signature = self.repo.signature()?;
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        Ok(oid.to_string())
    }
}
