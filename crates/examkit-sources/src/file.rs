//! Local file question source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use examkit_core::bank::{format_for_path, parse_bank_content, read_error};
use examkit_core::error::SourceError;
use examkit_core::model::QuestionBank;
use examkit_core::traits::QuestionSource;

/// Reads a JSON or TOML bank from disk, choosing the format by extension.
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(path = %self.name))]
    async fn fetch(&self) -> anyhow::Result<QuestionBank> {
        let format = format_for_path(&self.path)?;
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| read_error(&self.path, e))?;
        parse_bank_content(&self.path, format, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examkit_core::bank::parse_bank;

    const BANK: &str = r#"[
        { "id": 1, "type": "true_false", "question_en": "CSS is Turing complete.", "correct_answer": false },
        { "id": 2, "type": "multiple_choice", "question_en": "Pick", "options_en": ["a", "b"], "correct_answer": 0 }
    ]"#;

    #[tokio::test]
    async fn reads_json_bank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontend_exam.json");
        std::fs::write(&path, BANK).unwrap();

        let source = FileSource::new(&path);
        let bank = source.fetch().await.unwrap();
        assert_eq!(bank.id, "frontend_exam");
        assert_eq!(bank.len(), 2);
        assert!(source.name().ends_with("frontend_exam.json"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let source = FileSource::new("/no/such/bank.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn matches_synchronous_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontend_exam.json");
        std::fs::write(&path, BANK).unwrap();
        let fetched = FileSource::new(&path).fetch().await.unwrap();
        let parsed = parse_bank(&path).unwrap();
        assert_eq!(fetched.id, parsed.id);
        assert_eq!(fetched.questions, parsed.questions);

        let broken = dir.path().join("dupes.json");
        std::fs::write(
            &broken,
            r#"[{ "id": 5, "type": "true_false", "correct_answer": true },
                { "id": 5, "type": "true_false", "correct_answer": false }]"#,
        )
        .unwrap();
        let async_err = FileSource::new(&broken).fetch().await.unwrap_err();
        let sync_err = parse_bank(&broken).unwrap_err();
        assert_eq!(format!("{async_err:#}"), format!("{sync_err:#}"));
        assert!(matches!(
            async_err.downcast_ref::<SourceError>(),
            Some(SourceError::InvalidQuestion { id: 5, .. })
        ));
    }

    #[tokio::test]
    async fn unknown_extension_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.yaml");
        std::fs::write(&path, "- id: 1").unwrap();

        let err = FileSource::new(&path).fetch().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Malformed(_))
        ));
    }
}
