use crate::analyzer::analyze_commits;
use crate::config::VersionQuery;
use crate::domain::{
    next_version, normalize_tag, reconcile, BranchContext, Reconciliation, SemanticVersion,
    TagRef,
};
use crate::resolver::Sources;
use crate::source::VersionSource;
use tracing::{debug, info};

/// Answers the "current version" and "next version" queries.
///
/// Stages run strictly in order (branch, tag, commit range, classification,
/// arithmetic, reconciliation) and any stage coming up empty ends the query
/// with `None`.
///
/// The base of the next version is the latest stable tag reachable from the
/// main branch, then the latest stable tag reachable from the current branch,
/// then `0.0.0`. Prereleases are numbered against the tags reachable from the
/// current branch.
pub struct VersionResolver<L, R> {
    sources: Sources<L, R>,
    query: VersionQuery,
}

impl<L: VersionSource, R: VersionSource> VersionResolver<L, R> {
    /// `query` should already be merged with configured defaults
    pub fn new(local: L, remote: R, query: VersionQuery) -> Self {
        VersionResolver {
            sources: Sources::new(local, remote),
            query,
        }
    }

    pub fn sources(&self) -> &Sources<L, R> {
        &self.sources
    }

    /// Current and main branch for this invocation
    pub async fn branch_context(&self) -> Option<BranchContext> {
        let Some(branch) = self.sources.current_branch(self.query.branch.as_deref()).await else {
            info!("could not determine the current branch");
            return None;
        };
        let Some(main_branch) = self
            .sources
            .main_branch(self.query.main_branch.as_deref())
            .await
        else {
            info!("could not determine the main branch");
            return None;
        };

        let context = BranchContext::new(branch, main_branch);
        info!(
            branch = %context.name,
            main_branch = %context.main_branch,
            is_main = context.is_main,
            "resolved branches"
        );
        Some(context)
    }

    /// Latest version tag reachable from the current branch, without the `v`.
    ///
    /// Only stable tags count on the main branch.
    pub async fn current_version(&self) -> Option<String> {
        let context = self.branch_context().await?;
        let tag = self
            .sources
            .latest_tag(&context.name, context.is_main)
            .await?;
        info!(tag = %tag.name, "current version tag");
        Some(normalize_tag(&tag.name).to_string())
    }

    /// Version the next release of the current branch should carry, or `None`
    /// when no qualifying commits exist.
    pub async fn next_version(&self) -> Option<SemanticVersion> {
        let context = self.branch_context().await?;

        let base_tag = self.base_tag(&context).await;
        let base_version = base_tag
            .as_ref()
            .and_then(|tag| SemanticVersion::parse(normalize_tag(&tag.name)).ok());
        let base_sha = match &base_tag {
            Some(tag) => Some(self.commit_of(tag).await),
            None => None,
        };
        let base_label = base_version
            .as_ref()
            .map_or_else(|| "none".to_string(), |v| v.to_string());
        info!(base = %base_label, "base version");

        let Some(head) = self.sources.head_commit(&context.name).await else {
            info!("could not determine the head commit");
            return None;
        };

        let commits = self.sources.commits_between(base_sha.as_deref(), &head).await;
        for commit in &commits {
            let short = commit.sha.get(..7).unwrap_or(commit.sha.as_str());
            debug!(sha = short, subject = commit.subject(), release = %commit.release_type(), "commit");
        }
        let release = analyze_commits(&commits);
        info!(commits = commits.len(), release = %release, "analyzed commits");

        let suffix = context.prerelease_suffix(self.query.prerelease_suffix.as_deref());
        let candidate = next_version(
            base_version.as_ref(),
            release,
            context.is_main,
            suffix.as_deref(),
        )?;

        if context.is_main {
            return Some(candidate);
        }

        let tags = self.sources.reachable_tags(&context.name).await;
        let outcome = reconcile(&candidate, &tags);

        let has_new_release = match &outcome {
            Reconciliation::Fresh(_) => true,
            Reconciliation::Existing { latest, .. } => self.has_release_since(latest, &head).await,
        };
        let resolved = outcome.resolve(has_new_release);
        if resolved.is_none() {
            info!("no qualifying commits since the last prerelease");
        }
        resolved
    }

    async fn base_tag(&self, context: &BranchContext) -> Option<TagRef> {
        if let Some(tag) = self.sources.latest_tag(&context.main_branch, true).await {
            return Some(tag);
        }
        if context.is_main {
            return None;
        }
        self.sources.latest_tag(&context.name, true).await
    }

    /// Commit behind a listed tag, re-resolved so annotated tags are peeled
    async fn commit_of(&self, tag: &TagRef) -> String {
        self.sources
            .tag_commit(&tag.name)
            .await
            .unwrap_or_else(|| tag.sha.clone())
    }

    /// Whether qualifying commits landed between `tag` and `head`
    async fn has_release_since(&self, tag: &TagRef, head: &str) -> bool {
        let commits = self.sources.commits_between(Some(&tag.sha), head).await;
        let release = analyze_commits(&commits);
        debug!(
            tag = %tag.name,
            commits = commits.len(),
            release = %release,
            "commits since prerelease"
        );
        release.is_release()
    }
}
