//! Data sources for version resolution
//!
//! Every lookup the resolver performs goes through the [VersionSource] trait,
//! which has two production variants:
//!
//! - [local::LocalSource]: the checkout on disk, read with `git2`
//! - [github::GitHubSource]: the GitHub REST API, read with `reqwest`
//!
//! plus [mock::MockSource], an in-memory test double.
//!
//! The resolver always asks the local source first and only consults the
//! remote one when the local answer is missing or unusable. Each answer is
//! awaited through [settle], which logs it under the source's name.
//!
//! # Absence vs failure
//!
//! Methods return `Ok(None)` / an empty `Vec` when the data simply is not
//! there, and `Err` when the source itself could not be queried. The
//! combinator treats both the same way (try the other source) but only the
//! latter is logged as a failure.

pub mod github;
pub mod local;
pub mod mock;

pub use github::{GitHubSource, RepoSlug};
pub use local::LocalSource;
pub use mock::MockSource;

use crate::domain::{Commit, TagRef};
use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use tracing::debug;

/// Read-only capability set shared by the local and remote sources.
///
/// Capabilities a variant cannot provide report absence rather than an error.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Short label used in diagnostics ("local git", "GitHub API", ...)
    fn name(&self) -> &str;

    /// Commit checked out right now, if the source has a working copy
    async fn current_commit(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Name of the branch being built.
    ///
    /// `head_sha` is the current commit when known; sources without a working
    /// copy use it to find a branch whose head it is.
    async fn current_branch(&self, head_sha: Option<&str>) -> Result<Option<String>>;

    /// The repository's default (main) branch
    async fn default_branch(&self) -> Result<Option<String>>;

    /// Head commit of a named branch
    async fn branch_head(&self, branch: &str) -> Result<Option<String>>;

    /// Tags, newest first, optionally restricted to those reachable from `branch`
    async fn tags(&self, branch: Option<&str>) -> Result<Vec<TagRef>>;

    /// Commit a tag points at
    async fn tag_commit(&self, tag: &str) -> Result<Option<String>>;

    /// Commits in `(base, head]`, or every commit reachable from `head` when
    /// `base` is `None`
    async fn commits_between(&self, base: Option<&str>, head: &str) -> Result<Vec<Commit>>;

    /// Whether the source holds the given commit
    async fn has_commit(&self, _sha: &str) -> Result<bool> {
        Ok(false)
    }
}

/// A missing source answers every lookup with "not found".
#[async_trait]
impl<S: VersionSource> VersionSource for Option<S> {
    fn name(&self) -> &str {
        self.as_ref().map(|s| s.name()).unwrap_or("unavailable")
    }

    async fn current_commit(&self) -> Result<Option<String>> {
        match self {
            Some(source) => source.current_commit().await,
            None => Ok(None),
        }
    }

    async fn current_branch(&self, head_sha: Option<&str>) -> Result<Option<String>> {
        match self {
            Some(source) => source.current_branch(head_sha).await,
            None => Ok(None),
        }
    }

    async fn default_branch(&self) -> Result<Option<String>> {
        match self {
            Some(source) => source.default_branch().await,
            None => Ok(None),
        }
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        match self {
            Some(source) => source.branch_head(branch).await,
            None => Ok(None),
        }
    }

    async fn tags(&self, branch: Option<&str>) -> Result<Vec<TagRef>> {
        match self {
            Some(source) => source.tags(branch).await,
            None => Ok(Vec::new()),
        }
    }

    async fn tag_commit(&self, tag: &str) -> Result<Option<String>> {
        match self {
            Some(source) => source.tag_commit(tag).await,
            None => Ok(None),
        }
    }

    async fn commits_between(&self, base: Option<&str>, head: &str) -> Result<Vec<Commit>> {
        match self {
            Some(source) => source.commits_between(base, head).await,
            None => Ok(Vec::new()),
        }
    }

    async fn has_commit(&self, sha: &str) -> Result<bool> {
        match self {
            Some(source) => source.has_commit(sha).await,
            None => Ok(false),
        }
    }
}

/// Lookup results that can be empty.
///
/// `Option::None` and an empty `Vec` both count as "nothing usable".
pub trait Lookup {
    type Value;

    fn into_value(self) -> Option<Self::Value>;
}

impl<T> Lookup for Option<T> {
    type Value = T;

    fn into_value(self) -> Option<T> {
        self
    }
}

impl<T> Lookup for Vec<T> {
    type Value = Vec<T>;

    fn into_value(self) -> Option<Vec<T>> {
        (!self.is_empty()).then_some(self)
    }
}

/// Await one source's answer, turning failure into absence.
///
/// `source` is the label logged with the outcome, normally
/// [VersionSource::name].
pub async fn settle<T, F>(lookup: &str, source: &str, query: F) -> Option<T::Value>
where
    T: Lookup,
    F: Future<Output = Result<T>>,
{
    match query.await {
        Ok(found) => {
            let value = found.into_value();
            if value.is_some() {
                debug!(lookup, source, "lookup satisfied");
            } else {
                debug!(lookup, source, "nothing found");
            }
            value
        }
        Err(e) => {
            debug!(lookup, source, error = %e, "source unavailable");
            None
        }
    }
}
