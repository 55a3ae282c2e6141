//! Analysis engine for determining release types from commits

pub mod release_analyzer;

pub use release_analyzer::{analyze_commits, analyze_messages};
