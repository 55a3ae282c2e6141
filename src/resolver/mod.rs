//! Lookups that combine the local and remote sources, and the pipeline that
//! turns their answers into a version.
//!
//! Each lookup (branch, tag, commit range) is an `impl` block on [Sources] in
//! its own module; [VersionResolver] sequences them.

pub mod branch;
pub mod pipeline;
pub mod range;
pub mod tag;

pub use pipeline::VersionResolver;

use crate::error::Result;
use crate::source::{settle, Lookup, VersionSource};
use std::future::Future;

/// The local/remote source pair every lookup consults, local first
pub struct Sources<L, R> {
    pub local: L,
    pub remote: R,
}

impl<L, R> Sources<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Sources { local, remote }
    }
}

impl<L: VersionSource, R: VersionSource> Sources<L, R> {
    /// Ask the local source, then the remote one if the local answer is unusable.
    ///
    /// `remote` is only polled when `local` produced nothing, so the two never
    /// run concurrently.
    pub async fn first_some<T, FL, FR>(
        &self,
        lookup: &str,
        local: FL,
        remote: FR,
    ) -> Option<T::Value>
    where
        T: Lookup,
        FL: Future<Output = Result<T>>,
        FR: Future<Output = Result<T>>,
    {
        if let Some(value) = settle(lookup, self.local.name(), local).await {
            return Some(value);
        }
        settle(lookup, self.remote.name(), remote).await
    }
}
