//! Core trait definitions for question bank sources.
//!
//! Implemented by the `examkit-sources` crate for files, HTTP endpoints,
//! and in-memory banks.

use async_trait::async_trait;

use crate::model::QuestionBank;

/// Something that can deliver a whole question bank in one read.
///
/// Implementations should return a `crate::error::SourceError` (converted
/// into `anyhow::Error`) so callers can classify failures by downcasting.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable source name (e.g. a file path or URL).
    fn name(&self) -> &str;

    /// Fetch the complete bank.
    async fn fetch(&self) -> anyhow::Result<QuestionBank>;
}
