//! Semantic version resolution from conventional commits.
//!
//! `ghsemver` reads branches, tags and commit history from the local checkout
//! and falls back to the GitHub REST API whenever the checkout cannot answer
//! (for example a shallow CI clone). It answers two queries:
//!
//! - [current_version]: the latest version tag reachable from the branch
//! - [next_version]: the version the next release of the branch should carry
//!
//! Both return an empty string when there is nothing to report.

pub mod analyzer;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod source;
pub mod ui;

pub use config::{load_config, Config, VersionQuery};
pub use error::{GhSemverError, Result};
pub use resolver::VersionResolver;

use source::{GitHubSource, LocalSource, RepoSlug};
use std::path::Path;
use tracing::{debug, info};

/// Resolver over the checkout at `path` and its GitHub repository.
///
/// Returns `Ok(None)` when the GitHub repository cannot be identified, neither
/// from `config.github.repository` nor from the configured remote.
pub fn open_resolver(
    path: &Path,
    config: &Config,
    query: &VersionQuery,
) -> Result<Option<VersionResolver<Option<LocalSource>, GitHubSource>>> {
    let local = match LocalSource::open(path, config.git.remote.as_str()) {
        Ok(local) => Some(local),
        Err(e) => {
            debug!(error = %e, "no local repository, using GitHub API only");
            None
        }
    };

    let slug = match &config.github.repository {
        Some(repository) => Some(repository.parse::<RepoSlug>()?),
        None => local
            .as_ref()
            .and_then(|local| local.repository_slug().ok().flatten()),
    };
    let Some(slug) = slug else {
        info!("could not determine the GitHub repository");
        return Ok(None);
    };
    debug!(repository = %slug, "resolved repository");

    let remote = GitHubSource::new(slug, &config.github)?;
    let query = query.merged_with(&config.versioning);
    Ok(Some(VersionResolver::new(local, remote, query)))
}

/// Current version of the checkout at `path`, or an empty string
pub async fn current_version_in(
    path: &Path,
    config: &Config,
    query: &VersionQuery,
) -> Result<String> {
    let Some(resolver) = open_resolver(path, config, query)? else {
        return Ok(String::new());
    };
    Ok(resolver.current_version().await.unwrap_or_default())
}

/// Next version of the checkout at `path`, or an empty string
pub async fn next_version_in(path: &Path, config: &Config, query: &VersionQuery) -> Result<String> {
    let Some(resolver) = open_resolver(path, config, query)? else {
        return Ok(String::new());
    };
    Ok(resolver
        .next_version()
        .await
        .map(|version| version.to_string())
        .unwrap_or_default())
}

/// Current version of the repository in the working directory
pub async fn current_version(config: &Config, query: &VersionQuery) -> Result<String> {
    current_version_in(Path::new("."), config, query).await
}

/// Next version of the repository in the working directory
pub async fn next_version(config: &Config, query: &VersionQuery) -> Result<String> {
    next_version_in(Path::new("."), config, query).await
}
