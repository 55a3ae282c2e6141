/// The branch being versioned, relative to the main branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    pub main_branch: String,
    pub is_main: bool,
}

impl BranchContext {
    /// Create a new branch context
    pub fn new(name: impl Into<String>, main_branch: impl Into<String>) -> Self {
        let name = name.into();
        let main_branch = main_branch.into();
        let is_main = name == main_branch;

        BranchContext {
            name,
            main_branch,
            is_main,
        }
    }

    /// Prerelease identifier for this branch.
    ///
    /// An explicit suffix wins over the branch name. Characters outside
    /// `[0-9A-Za-z-]` become `-`, and an all-digit result loses its leading
    /// zeros so it stays a valid semver identifier. Returns `None` on the main
    /// branch or when nothing usable remains.
    pub fn prerelease_suffix(&self, explicit: Option<&str>) -> Option<String> {
        if self.is_main {
            return None;
        }

        let raw = explicit.unwrap_or(&self.name);
        let sanitized: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let sanitized = sanitized.trim_matches('-');

        if sanitized.is_empty() {
            return None;
        }
        if sanitized.bytes().all(|b| b.is_ascii_digit()) {
            let trimmed = sanitized.trim_start_matches('0');
            return Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string());
        }
        Some(sanitized.to_string())
    }
}
