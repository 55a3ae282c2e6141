use crate::domain::{sort_newest_first, Commit, TagRef};
use crate::error::{GhSemverError, Result};
use crate::source::VersionSource;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

struct MockCommit {
    commit: Commit,
    parent: Option<String>,
}

/// In-memory source for testing resolution without git or network access.
///
/// History is a set of commits linked to a single parent, so each branch is a
/// simple chain. Every trait call is recorded and can be inspected with
/// [MockSource::calls].
pub struct MockSource {
    label: String,
    commits: HashMap<String, MockCommit>,
    tags: Vec<TagRef>,
    branch_heads: HashMap<String, String>,
    current_branch: Option<String>,
    current_commit: Option<String>,
    default_branch: Option<String>,
    offline: bool,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a new empty mock source
    pub fn new(label: impl Into<String>) -> Self {
        MockSource {
            label: label.into(),
            commits: HashMap::new(),
            tags: Vec::new(),
            branch_heads: HashMap::new(),
            current_branch: None,
            current_commit: None,
            default_branch: None,
            offline: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a commit with an explicit parent
    pub fn add_commit(&mut self, sha: &str, message: &str, parent: Option<&str>) {
        self.commits.insert(
            sha.to_string(),
            MockCommit {
                commit: Commit::new(sha, message, ""),
                parent: parent.map(str::to_string),
            },
        );
    }

    /// Append a commit on top of `branch` and advance the branch head
    pub fn push_commit(&mut self, branch: &str, sha: &str, message: &str) {
        let parent = self.branch_heads.get(branch).cloned();
        self.add_commit(sha, message, parent.as_deref());
        self.set_branch_head(branch, sha);
    }

    /// Start `branch` at the current head of `from`
    pub fn fork_branch(&mut self, branch: &str, from: &str) {
        if let Some(head) = self.branch_heads.get(from).cloned() {
            self.set_branch_head(branch, &head);
        }
    }

    /// Add a tag pointing to a commit
    pub fn add_tag(&mut self, name: &str, sha: &str) {
        self.tags.retain(|tag| tag.name != name);
        self.tags.push(TagRef::new(name, sha));
    }

    /// Set a branch head
    pub fn set_branch_head(&mut self, branch: &str, sha: &str) {
        self.branch_heads.insert(branch.to_string(), sha.to_string());
    }

    /// Check out `branch`: it becomes the current branch and its head the
    /// current commit
    pub fn checkout(&mut self, branch: &str) {
        self.current_branch = Some(branch.to_string());
        self.current_commit = self.branch_heads.get(branch).cloned();
    }

    /// Detach at `sha`
    pub fn checkout_detached(&mut self, sha: &str) {
        self.current_branch = None;
        self.current_commit = Some(sha.to_string());
    }

    pub fn set_default_branch(&mut self, branch: &str) {
        self.default_branch = Some(branch.to_string());
    }

    /// Make every call fail as if the source were unreachable
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Names of the trait methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: &str) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.to_string());
        }
        if self.offline {
            return Err(GhSemverError::repository(format!("{} is offline", self.label)));
        }
        Ok(())
    }

    /// `sha` and its ancestors, newest first
    fn history(&self, sha: &str) -> Vec<&Commit> {
        let mut chain = Vec::new();
        let mut next = Some(sha);
        while let Some(current) = next {
            let Some(entry) = self.commits.get(current) else {
                break;
            };
            chain.push(&entry.commit);
            next = entry.parent.as_deref();
        }
        chain
    }
}

#[async_trait]
impl VersionSource for MockSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn current_commit(&self) -> Result<Option<String>> {
        self.record("current_commit")?;
        Ok(self.current_commit.clone())
    }

    async fn current_branch(&self, head_sha: Option<&str>) -> Result<Option<String>> {
        self.record("current_branch")?;
        if let Some(branch) = &self.current_branch {
            return Ok(Some(branch.clone()));
        }
        let Some(sha) = head_sha else {
            return Ok(None);
        };
        let mut heads: Vec<&String> = self
            .branch_heads
            .iter()
            .filter(|(_, head)| head.as_str() == sha)
            .map(|(branch, _)| branch)
            .collect();
        heads.sort();
        Ok(heads.first().map(|branch| branch.to_string()))
    }

    async fn default_branch(&self) -> Result<Option<String>> {
        self.record("default_branch")?;
        Ok(self.default_branch.clone())
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        self.record("branch_head")?;
        Ok(self.branch_heads.get(branch).cloned())
    }

    async fn tags(&self, branch: Option<&str>) -> Result<Vec<TagRef>> {
        self.record("tags")?;
        let reachable: Option<HashSet<&str>> = match branch {
            Some(branch) => {
                let head = self.branch_heads.get(branch).ok_or_else(|| {
                    GhSemverError::repository(format!("Branch not found: {}", branch))
                })?;
                Some(
                    self.history(head)
                        .into_iter()
                        .map(|c| c.sha.as_str())
                        .collect(),
                )
            }
            None => None,
        };

        let mut tags: Vec<TagRef> = self
            .tags
            .iter()
            .filter(|tag| {
                reachable
                    .as_ref()
                    .map_or(true, |shas| shas.contains(tag.sha.as_str()))
            })
            .cloned()
            .collect();
        sort_newest_first(&mut tags);
        Ok(tags)
    }

    async fn tag_commit(&self, tag: &str) -> Result<Option<String>> {
        self.record("tag_commit")?;
        Ok(self
            .tags
            .iter()
            .find(|t| t.name == tag)
            .map(|t| t.sha.clone()))
    }

    async fn commits_between(&self, base: Option<&str>, head: &str) -> Result<Vec<Commit>> {
        self.record("commits_between")?;
        Ok(self
            .history(head)
            .into_iter()
            .take_while(|commit| Some(commit.sha.as_str()) != base)
            .cloned()
            .collect())
    }

    async fn has_commit(&self, sha: &str) -> Result<bool> {
        self.record("has_commit")?;
        Ok(self.commits.contains_key(sha))
    }
}
