use crate::resolver::Sources;
use crate::source::VersionSource;
use tracing::debug;

impl<L: VersionSource, R: VersionSource> Sources<L, R> {
    /// Branch being built: `explicit` if given, else the checked-out branch,
    /// else the remote branch whose head is the checked-out commit.
    pub async fn current_branch(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(branch) = explicit {
            debug!(branch, "using branch override");
            return Some(branch.to_string());
        }

        self.first_some("current branch", self.local.current_branch(None), async {
            let head = self.local.current_commit().await.ok().flatten();
            self.remote.current_branch(head.as_deref()).await
        })
        .await
    }

    /// Main branch: `explicit` if given, else the repository's default branch.
    pub async fn main_branch(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(branch) = explicit {
            debug!(branch, "using main branch override");
            return Some(branch.to_string());
        }

        self.first_some(
            "main branch",
            self.local.default_branch(),
            self.remote.default_branch(),
        )
        .await
    }

    /// Commit to version: the local checkout, else the remote head of `branch`.
    pub async fn head_commit(&self, branch: &str) -> Option<String> {
        self.first_some(
            "head commit",
            self.local.current_commit(),
            self.remote.branch_head(branch),
        )
        .await
    }
}
