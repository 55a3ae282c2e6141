use crate::domain::{sort_newest_first, Commit, TagRef};
use crate::error::{GhSemverError, Result};
use crate::source::{RepoSlug, VersionSource};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use git2::{ErrorCode, Oid, Repository};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Version source backed by the local checkout.
///
/// `git2::Repository` is `Send` but not `Sync`, so access goes through a mutex.
pub struct LocalSource {
    repo: Mutex<Repository>,
    remote: String,
}

impl LocalSource {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P, remote: impl Into<String>) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self::from_git2(repo, remote))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository, remote: impl Into<String>) -> Self {
        LocalSource {
            repo: Mutex::new(repo),
            remote: remote.into(),
        }
    }

    fn repo(&self) -> Result<MutexGuard<'_, Repository>> {
        self.repo
            .lock()
            .map_err(|_| GhSemverError::repository("local repository lock poisoned"))
    }

    /// Parse `owner/repo` from the configured remote's URL
    pub fn repository_slug(&self) -> Result<Option<RepoSlug>> {
        let repo = self.repo()?;
        let remote = match repo.find_remote(&self.remote) {
            Ok(remote) => remote,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let slug = remote.url().and_then(RepoSlug::from_remote_url);
        debug!(remote = %self.remote, slug = ?slug, "parsed repository from remote");
        Ok(slug)
    }
}

/// `Ok(None)` for git2 "not found"-style errors, otherwise propagate
fn absent_if_missing<T>(result: std::result::Result<T, git2::Error>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolve a branch to its head commit: local branch first, then remote-tracking.
fn resolve_branch(repo: &Repository, remote: &str, branch: &str) -> Result<Option<Oid>> {
    let candidates = [
        format!("refs/heads/{}", branch),
        format!("refs/remotes/{}/{}", remote, branch),
    ];
    for name in &candidates {
        if let Some(reference) = absent_if_missing(repo.find_reference(name))? {
            let commit = reference.peel_to_commit()?;
            return Ok(Some(commit.id()));
        }
    }
    Ok(None)
}

fn peel_tag(repo: &Repository, tag: &str) -> Result<Option<Oid>> {
    let Some(reference) = absent_if_missing(repo.find_reference(&format!("refs/tags/{}", tag)))?
    else {
        return Ok(None);
    };
    // Tags on trees or blobs are not version tags
    Ok(reference.peel_to_commit().ok().map(|commit| commit.id()))
}

fn format_time(time: git2::Time) -> String {
    FixedOffset::east_opt(time.offset_minutes() * 60)
        .and_then(|offset| {
            DateTime::from_timestamp(time.seconds(), 0).map(|utc| utc.with_timezone(&offset))
        })
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

#[async_trait]
impl VersionSource for LocalSource {
    fn name(&self) -> &str {
        "local git"
    }

    async fn current_commit(&self) -> Result<Option<String>> {
        let repo = self.repo()?;
        let Some(head) = absent_if_missing(repo.head())? else {
            return Ok(None);
        };
        let id = head.peel_to_commit()?.id().to_string();
        Ok(Some(id))
    }

    async fn current_branch(&self, _head_sha: Option<&str>) -> Result<Option<String>> {
        let repo = self.repo()?;
        let Some(head) = absent_if_missing(repo.head())? else {
            return Ok(None);
        };
        if !head.is_branch() {
            debug!("detached HEAD");
            return Ok(None);
        }
        Ok(head.shorthand().map(str::to_string))
    }

    async fn default_branch(&self) -> Result<Option<String>> {
        let repo = self.repo()?;
        let name = format!("refs/remotes/{}/HEAD", self.remote);
        let Some(reference) = absent_if_missing(repo.find_reference(&name))? else {
            return Ok(None);
        };
        let prefix = format!("refs/remotes/{}/", self.remote);
        Ok(reference
            .symbolic_target()
            .and_then(|target| target.strip_prefix(prefix.as_str()))
            .map(str::to_string))
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        let repo = self.repo()?;
        Ok(resolve_branch(&repo, &self.remote, branch)?.map(|oid| oid.to_string()))
    }

    async fn tags(&self, branch: Option<&str>) -> Result<Vec<TagRef>> {
        let repo = self.repo()?;

        let branch_oid = match branch {
            Some(branch) => Some(resolve_branch(&repo, &self.remote, branch)?.ok_or_else(
                || GhSemverError::repository(format!("branch '{}' not found locally", branch)),
            )?),
            None => None,
        };

        let names = repo.tag_names(None)?;
        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let Some(oid) = peel_tag(&repo, name)? else {
                continue;
            };
            if let Some(tip) = branch_oid {
                let reachable = tip == oid || repo.graph_descendant_of(tip, oid)?;
                if !reachable {
                    continue;
                }
            }
            tags.push(TagRef::new(name, oid.to_string()));
        }

        sort_newest_first(&mut tags);
        Ok(tags)
    }

    async fn tag_commit(&self, tag: &str) -> Result<Option<String>> {
        let repo = self.repo()?;
        Ok(peel_tag(&repo, tag)?.map(|oid| oid.to_string()))
    }

    async fn commits_between(&self, base: Option<&str>, head: &str) -> Result<Vec<Commit>> {
        let repo = self.repo()?;
        let head_oid = Oid::from_str(head)?;

        let mut revwalk = repo.revwalk()?;
        revwalk.push(head_oid)?;
        if let Some(base) = base {
            revwalk.hide(Oid::from_str(base)?)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            commits.push(Commit::new(
                commit.id().to_string(),
                commit.message().unwrap_or_default(),
                format_time(commit.author().when()),
            ));
        }
        Ok(commits)
    }

    async fn has_commit(&self, sha: &str) -> Result<bool> {
        let Ok(oid) = Oid::from_str(sha) else {
            return Ok(false);
        };
        let repo = self.repo()?;
        let exists = repo.find_commit(oid).is_ok();
        Ok(exists)
    }
}
