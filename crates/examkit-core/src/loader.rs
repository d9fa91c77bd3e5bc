//! Question bank loading with an explicit failure signal.
//!
//! A failed load never reaches the engine as an error it must understand:
//! the caller receives an empty bank together with the error, and the
//! session refuses to start on an empty question set.

use std::sync::Arc;

use crate::error::SourceError;
use crate::model::QuestionBank;
use crate::traits::QuestionSource;

/// Result of a single bulk read.
#[derive(Debug)]
pub struct LoadOutcome {
    /// The delivered bank, or an empty one if loading failed.
    pub bank: QuestionBank,
    /// Set when the source failed.
    pub error: Option<anyhow::Error>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The typed source error, if the failure carried one.
    pub fn source_error(&self) -> Option<&SourceError> {
        self.error.as_ref().and_then(|e| e.downcast_ref::<SourceError>())
    }

    /// Convert back into a plain `Result`.
    pub fn into_result(self) -> anyhow::Result<QuestionBank> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.bank),
        }
    }
}

/// Wraps a [`QuestionSource`] and normalises failures into [`LoadOutcome`].
///
/// There are no retries here; a caller wanting one can call `load` again.
#[derive(Clone)]
pub struct QuestionBankLoader {
    source: Arc<dyn QuestionSource>,
}

impl QuestionBankLoader {
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn load(&self) -> LoadOutcome {
        match self.source.fetch().await {
            Ok(bank) => {
                tracing::debug!(
                    source = self.source.name(),
                    bank = %bank.id,
                    questions = bank.len(),
                    "question bank loaded"
                );
                LoadOutcome { bank, error: None }
            }
            Err(e) => {
                tracing::warn!("failed to load questions from {}: {e:#}", self.source.name());
                LoadOutcome {
                    bank: QuestionBank::empty(self.source.name()),
                    error: Some(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExamError, Operation};
    use crate::model::{LocalizedText, Question};
    use crate::session::Session;
    use async_trait::async_trait;

    struct Fixed(Option<QuestionBank>);

    #[async_trait]
    impl QuestionSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self) -> anyhow::Result<QuestionBank> {
            match &self.0 {
                Some(bank) => Ok(bank.clone()),
                None => Err(SourceError::Network("connection refused".into()).into()),
            }
        }
    }

    #[tokio::test]
    async fn successful_load() {
        let mut bank = QuestionBank::empty("ok");
        bank.questions
            .push(Question::boolean(1, LocalizedText::new("a", "b"), true));
        let loader = QuestionBankLoader::new(Arc::new(Fixed(Some(bank))));

        let outcome = loader.load().await;
        assert!(outcome.is_ok());
        assert_eq!(outcome.bank.len(), 1);
        assert_eq!(outcome.into_result().unwrap().id, "ok");
    }

    #[tokio::test]
    async fn failure_yields_empty_bank_and_error() {
        let loader = QuestionBankLoader::new(Arc::new(Fixed(None)));
        let outcome = loader.load().await;

        assert!(!outcome.is_ok());
        assert!(outcome.bank.is_empty());
        assert!(matches!(outcome.source_error(), Some(SourceError::Network(_))));
    }

    #[tokio::test]
    async fn session_refuses_failed_load() {
        let loader = QuestionBankLoader::new(Arc::new(Fixed(None)));
        let outcome = loader.load().await;

        let mut session = Session::new();
        let err = session.start(outcome.bank.questions, 60).unwrap_err();
        assert!(matches!(
            err,
            ExamError::InvalidTransition {
                operation: Operation::Start,
                ..
            }
        ));
    }
}
