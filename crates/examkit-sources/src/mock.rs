//! In-memory source, for tests and for banks built in code.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use examkit_core::error::SourceError;
use examkit_core::model::QuestionBank;
use examkit_core::traits::QuestionSource;

/// Serves a fixed bank, or always fails with a network error.
pub struct StaticSource {
    name: String,
    bank: Option<QuestionBank>,
    failure: String,
    call_count: AtomicU32,
}

impl StaticSource {
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            name: format!("static:{}", bank.id),
            bank: Some(bank),
            failure: String::new(),
            call_count: AtomicU32::new(0),
        }
    }

    /// A source whose every fetch fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            name: "static:failing".to_string(),
            bank: None,
            failure: message.to_string(),
            call_count: AtomicU32::new(0),
        }
    }

    /// Number of fetches made against this source.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> anyhow::Result<QuestionBank> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.bank {
            Some(bank) => Ok(bank.clone()),
            None => Err(SourceError::Network(self.failure.clone()).into()),
        }
    }
}
