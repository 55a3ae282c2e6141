//! GitHub REST API source.
//!
//! Used when the local checkout cannot answer, typically in shallow CI clones
//! with no tags fetched. Every request is a read-only `GET` against
//! `/repos/{owner}/{repo}/...`; listings are paginated up to
//! [GitHubConfig::max_pages].

use crate::config::GitHubConfig;
use crate::domain::{sort_newest_first, Commit, TagRef};
use crate::error::{GhSemverError, Result};
use crate::source::VersionSource;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

const USER_AGENT_VALUE: &str = concat!("ghsemver/", env!("CARGO_PKG_VERSION"));
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// `owner/repo` identifying a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

fn remote_url_regex() -> Option<&'static Regex> {
    static REMOTE: OnceLock<Option<Regex>> = OnceLock::new();
    REMOTE
        .get_or_init(|| Regex::new(r"github\.com[:/]([^/]+)/(.+?)(?:\.git)?/?$").ok())
        .as_ref()
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoSlug {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Extract the slug from an SSH (`git@github.com:o/r.git`) or HTTPS
    /// (`https://github.com/o/r.git`) remote URL. Non-GitHub URLs yield `None`.
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let captures = remote_url_regex()?.captures(url.trim())?;
        let owner = captures.get(1)?.as_str();
        let repo = captures.get(2)?.as_str();
        if repo.contains('/') {
            return None;
        }
        Some(RepoSlug::new(owner, repo))
    }
}

impl FromStr for RepoSlug {
    type Err = GhSemverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(RepoSlug::new(owner, repo))
            }
            _ => Err(GhSemverError::config(format!(
                "Repository must be 'owner/repo', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct NamedBranch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
    commit: ShaRef,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Body of both `git/ref/...` and `git/tags/...`
#[derive(Debug, Deserialize)]
struct ObjectPointer {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    #[serde(default)]
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
    commit: CommitDetail,
}

impl From<CommitEntry> for Commit {
    fn from(entry: CommitEntry) -> Self {
        let date = entry
            .commit
            .author
            .and_then(|author| author.date)
            .unwrap_or_default();
        Commit::new(entry.sha, entry.commit.message, date)
    }
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    commits: Vec<CommitEntry>,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: ShaRef,
}

/// Version source backed by the GitHub REST API
pub struct GitHubSource {
    client: Client,
    api_url: String,
    slug: RepoSlug,
    token: Option<String>,
    per_page: u32,
    max_pages: u32,
}

impl GitHubSource {
    /// Build a client for `slug`. The token is read from the environment
    /// variable named by `config.token_env`; without one requests are anonymous.
    pub fn new(slug: RepoSlug, config: &GitHubConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty());
        let client = Client::builder().user_agent(USER_AGENT_VALUE).build()?;

        Ok(GitHubSource {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            slug,
            token,
            per_page: config.per_page.clamp(1, 100),
            max_pages: config.max_pages.max(1),
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_base_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `GET /repos/{owner}/{repo}{path}`; 404 maps to `Ok(None)`
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!(
            "{}/repos/{}/{}{}",
            self.api_url, self.slug.owner, self.slug.repo, path
        );

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!(url = %url, "GitHub request");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GhSemverError::api(status.as_u16(), message));
        }

        Ok(Some(response.json().await?))
    }

    /// Collect a paginated listing, stopping at the first short page
    async fn paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();

        for page in 1..=self.max_pages {
            let mut params = query.to_vec();
            params.push(("per_page", self.per_page.to_string()));
            params.push(("page", page.to_string()));

            let Some(batch) = self.get_json::<Vec<T>>(path, &params).await? else {
                break;
            };
            let full = batch.len() >= self.per_page as usize;
            items.extend(batch);
            if !full {
                break;
            }
        }

        Ok(items)
    }

    async fn branch_commit_shas(&self, branch: &str) -> Result<HashSet<String>> {
        let commits: Vec<ShaRef> = self
            .paginated("/commits", &[("sha", branch.to_string())])
            .await?;
        Ok(commits.into_iter().map(|c| c.sha).collect())
    }
}

#[async_trait]
impl VersionSource for GitHubSource {
    fn name(&self) -> &str {
        "GitHub API"
    }

    async fn current_branch(&self, head_sha: Option<&str>) -> Result<Option<String>> {
        let Some(sha) = head_sha else {
            return Ok(None);
        };
        let branches: Option<Vec<NamedBranch>> = self
            .get_json(&format!("/commits/{}/branches-where-head", sha), &[])
            .await?;
        Ok(branches.and_then(|b| b.into_iter().next()).map(|b| b.name))
    }

    async fn default_branch(&self) -> Result<Option<String>> {
        let repository: Option<RepositoryResponse> = self.get_json("", &[]).await?;
        Ok(repository.map(|r| r.default_branch))
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        let response: Option<BranchResponse> = self
            .get_json(&format!("/branches/{}", branch), &[])
            .await?;
        Ok(response.map(|b| b.commit.sha))
    }

    async fn tags(&self, branch: Option<&str>) -> Result<Vec<TagRef>> {
        let reachable = match branch {
            Some(branch) => Some(self.branch_commit_shas(branch).await?),
            None => None,
        };

        let entries: Vec<TagEntry> = self.paginated("/tags", &[]).await?;
        let mut tags: Vec<TagRef> = entries
            .into_iter()
            .filter(|entry| {
                reachable
                    .as_ref()
                    .map_or(true, |shas| shas.contains(&entry.commit.sha))
            })
            .map(|entry| TagRef::new(entry.name, entry.commit.sha))
            .collect();

        sort_newest_first(&mut tags);
        Ok(tags)
    }

    async fn tag_commit(&self, tag: &str) -> Result<Option<String>> {
        let Some(reference) = self
            .get_json::<ObjectPointer>(&format!("/git/ref/tags/{}", tag), &[])
            .await?
        else {
            return Ok(None);
        };

        if reference.object.kind != "tag" {
            return Ok(Some(reference.object.sha));
        }

        // Annotated tag: the ref points at the tag object, not the commit
        let annotated: Option<ObjectPointer> = self
            .get_json(&format!("/git/tags/{}", reference.object.sha), &[])
            .await?;
        Ok(annotated.map(|tag| tag.object.sha))
    }

    async fn commits_between(&self, base: Option<&str>, head: &str) -> Result<Vec<Commit>> {
        let entries: Vec<CommitEntry> = match base {
            None => {
                self.paginated("/commits", &[("sha", head.to_string())])
                    .await?
            }
            Some(base) => {
                let comparison: Option<CompareResponse> = self
                    .get_json(&format!("/compare/{}...{}", base, head), &[])
                    .await?;
                // Compare lists oldest first
                comparison
                    .map(|c| c.commits.into_iter().rev().collect())
                    .unwrap_or_default()
            }
        };

        Ok(entries.into_iter().map(Commit::from).collect())
    }
}
