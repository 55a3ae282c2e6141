use crate::domain::{classify, Commit, ReleaseType};

/// Analyze a commit range and determine the release type.
///
/// Order of `commits` does not matter.
pub fn analyze_commits(commits: &[Commit]) -> ReleaseType {
    ReleaseType::aggregate(commits.iter().map(Commit::release_type))
}

/// Analyze raw commit messages and determine the release type
pub fn analyze_messages<S: AsRef<str>>(messages: &[S]) -> ReleaseType {
    ReleaseType::aggregate(messages.iter().map(|m| classify(m.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits(messages: &[&str]) -> Vec<Commit> {
        messages
            .iter()
            .enumerate()
            .map(|(i, m)| Commit::new(format!("{:040x}", i), *m, ""))
            .collect()
    }

    #[test]
    fn test_analyze_major() {
        let commits = commits(&["feat: new feature", "fix(api)!: breaking change"]);
        assert_eq!(analyze_commits(&commits), ReleaseType::Major);
    }

    #[test]
    fn test_analyze_minor() {
        let commits = commits(&["feat: new feature", "fix: bug fix"]);
        assert_eq!(analyze_commits(&commits), ReleaseType::Minor);
    }

    #[test]
    fn test_analyze_patch() {
        let commits = commits(&["fix: bug fix", "refactor: code cleanup"]);
        assert_eq!(analyze_commits(&commits), ReleaseType::Patch);
    }

    #[test]
    fn test_analyze_ignore_docs_and_chore() {
        let messages = [
            "docs: update readme",
            "chore: update deps",
            "style: format code",
            "test: add tests",
        ];
        assert_eq!(analyze_messages(&messages), ReleaseType::None);
    }

    #[test]
    fn test_analyze_empty_range() {
        assert_eq!(analyze_commits(&[]), ReleaseType::None);
    }

    #[test]
    fn test_analyze_breaking_change_via_footer() {
        let messages = ["fix: rename API field\n\nBREAKING CHANGE: field changed from X to Y"];
        assert_eq!(analyze_messages(&messages), ReleaseType::Major);
    }

    #[test]
    fn test_analyze_real_release_cycle() {
        let messages = [
            "feat(api): add user list endpoint",
            "feat(auth): add role-based access",
            "fix(ui): modal alignment",
            "docs: update api docs",
        ];
        assert_eq!(analyze_messages(&messages), ReleaseType::Minor);
    }

    #[test]
    fn test_analyze_non_conventional_commits() {
        let messages = ["Updated stuff", "Fixed things", "Merge branch 'main'"];
        assert_eq!(analyze_messages(&messages), ReleaseType::None);
    }

    #[test]
    fn test_analyze_many_commits() {
        let messages = [
            "chore: bump deps",
            "docs: add faq",
            "test: add e2e tests",
            "perf: cache results",
            "feat: new search feature",
        ];
        assert_eq!(analyze_messages(&messages), ReleaseType::Minor);
    }
}
