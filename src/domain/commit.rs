use crate::domain::ReleaseType;
use regex::Regex;
use std::sync::OnceLock;

const BREAKING_FOOTERS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

/// A commit as reported by either source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full commit hash
    pub sha: String,
    /// Full message: subject plus optional body
    pub message: String,
    /// Author timestamp (RFC 3339), empty when the source did not report one
    pub date: String,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>, date: impl Into<String>) -> Self {
        Commit {
            sha: sha.into(),
            message: message.into(),
            date: date.into(),
        }
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Classify this commit's message
    pub fn release_type(&self) -> ReleaseType {
        classify(&self.message)
    }
}

/// Parsed representation of a conventional commit header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    /// Type keyword, lowercased
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

fn header_regex() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| Regex::new(r"^(\w+)(?:\((.+?)\))?(!)?:\s*(.*)$").ok())
        .as_ref()
}

impl ParsedCommit {
    /// Parse a commit message according to conventional commits
    ///
    /// Supports formats:
    /// - type(scope)!: description
    /// - type(scope): description
    /// - type!: description
    /// - type: description
    ///
    /// Returns `None` when the subject has no conventional header.
    pub fn parse(message: &str) -> Option<Self> {
        let subject = message.lines().next().unwrap_or("");
        let captures = header_regex()?.captures(subject)?;

        let r#type = captures.get(1)?.as_str().to_lowercase();
        let scope = captures.get(2).map(|m| m.as_str().to_string());
        let description = captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Some(ParsedCommit {
            r#type,
            scope,
            description,
            is_breaking_change: has_breaking_marker(message),
        })
    }

    /// Release signal carried by the type keyword alone
    pub fn type_release(&self) -> ReleaseType {
        match self.r#type.as_str() {
            "feat" | "feature" => ReleaseType::Minor,
            "fix" | "perf" => ReleaseType::Patch,
            _ => ReleaseType::None,
        }
    }
}

/// Detect `type!:` in the subject or a breaking-change footer line.
pub fn has_breaking_marker(message: &str) -> bool {
    let mut lines = message.lines();
    let subject = lines.next().unwrap_or("");

    let bang_before_colon = subject
        .find(':')
        .map(|idx| subject[..idx].ends_with('!'))
        .unwrap_or(false);
    if bang_before_colon {
        return true;
    }

    std::iter::once(subject).chain(lines).any(|line| {
        let line = line.trim_start();
        BREAKING_FOOTERS
            .iter()
            .any(|footer| line.starts_with(footer))
    })
}

/// Map one commit message to a release signal.
///
/// Breaking markers yield `Major` regardless of the type keyword; unknown or
/// missing headers yield `None`.
pub fn classify(message: &str) -> ReleaseType {
    if has_breaking_marker(message) {
        return ReleaseType::Major;
    }

    ParsedCommit::parse(message)
        .map(|parsed| parsed.type_release())
        .unwrap_or(ReleaseType::None)
}
