//! Question bank parser.
//!
//! Loads banks from JSON and TOML files and directories, enforces the basic
//! question shape, and reports softer content issues as warnings.
//!
//! JSON files use the flat record layout the study site ships: a bare array
//! of `{ id, type, question_en, question_ar, options_en, options_ar,
//! correct_answer, explanation_en, explanation_ar }` objects, or the same
//! records under a `questions` key next to a `bank` header. TOML files carry
//! a `[bank]` header and `[[questions]]` tables with identical keys.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::SourceError;
use crate::model::{Answer, Locale, LocalizedText, Question, QuestionBank, QuestionKind};

/// On-disk formats a bank can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Json,
    Toml,
}

impl BankFormat {
    /// Guess the format from a path or URL extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(BankFormat::Json),
            "toml" => Some(BankFormat::Toml),
            _ => None,
        }
    }
}

/// Intermediate structure for a bank file with a header.
#[derive(Debug, Deserialize)]
struct BankFile {
    #[serde(default)]
    bank: Option<BankHeader>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct BankHeader {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title_en: Option<String>,
    #[serde(default)]
    title_ar: Option<String>,
    #[serde(default)]
    duration_secs: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: u32,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    question_en: String,
    #[serde(default)]
    question_ar: String,
    #[serde(default)]
    options_en: Option<Vec<String>>,
    #[serde(default)]
    options_ar: Option<Vec<String>>,
    correct_answer: Answer,
    #[serde(default)]
    explanation_en: String,
    #[serde(default)]
    explanation_ar: String,
}

fn parse_kind(id: u32, kind: &str) -> Result<QuestionKind, SourceError> {
    match kind {
        "true_false" | "boolean" | "boolean_choice" => Ok(QuestionKind::BooleanChoice),
        "multiple_choice" => Ok(QuestionKind::MultipleChoice),
        other => Err(SourceError::InvalidQuestion {
            id,
            reason: format!("unknown question type '{other}'"),
        }),
    }
}

impl RawQuestion {
    fn into_question(self) -> Result<Question, SourceError> {
        let id = self.id;
        let invalid = |reason: String| SourceError::InvalidQuestion { id, reason };
        let kind = parse_kind(id, &self.kind)?;

        let options = match kind {
            QuestionKind::BooleanChoice => {
                let has_options = self.options_en.as_ref().is_some_and(|o| !o.is_empty())
                    || self.options_ar.as_ref().is_some_and(|o| !o.is_empty());
                if has_options {
                    return Err(invalid("true/false questions cannot have options".into()));
                }
                if !matches!(self.correct_answer, Answer::Boolean(_)) {
                    return Err(invalid(format!(
                        "correct_answer must be true or false, got {}",
                        raw_answer(self.correct_answer)
                    )));
                }
                Vec::new()
            }
            QuestionKind::MultipleChoice => {
                let en = self.options_en.unwrap_or_default();
                // A bank without Arabic options falls back to the English text.
                let ar = self.options_ar.unwrap_or_else(|| en.clone());
                if en.len() != ar.len() {
                    return Err(invalid(format!(
                        "options_en has {} entries but options_ar has {}",
                        en.len(),
                        ar.len()
                    )));
                }
                if en.len() < 2 {
                    return Err(invalid(format!(
                        "multiple-choice questions need at least 2 options, got {}",
                        en.len()
                    )));
                }
                match self.correct_answer {
                    Answer::Choice(i) if i < en.len() => {}
                    other => {
                        return Err(invalid(format!(
                            "correct_answer must be an option index below {}, got {}",
                            en.len(),
                            raw_answer(other)
                        )))
                    }
                }
                en.into_iter()
                    .zip(ar)
                    .map(|(en, ar)| LocalizedText { en, ar })
                    .collect()
            }
        };

        Ok(Question {
            id,
            kind,
            prompt: LocalizedText::new(self.question_en, self.question_ar),
            options,
            correct_answer: self.correct_answer,
            explanation: LocalizedText::new(self.explanation_en, self.explanation_ar),
        })
    }
}

/// An answer as it is written in a bank file.
fn raw_answer(answer: Answer) -> String {
    match answer {
        Answer::Boolean(b) => b.to_string(),
        Answer::Choice(i) => i.to_string(),
    }
}

fn build_bank(file: BankFile, fallback_id: &str) -> Result<QuestionBank, SourceError> {
    let header = file.bank.unwrap_or(BankHeader {
        id: None,
        title_en: None,
        title_ar: None,
        duration_secs: None,
    });

    let id = header.id.unwrap_or_else(|| fallback_id.to_string());
    let title_en = header.title_en.unwrap_or_else(|| id.clone());
    let title_ar = header.title_ar.unwrap_or_else(|| title_en.clone());

    let questions = file
        .questions
        .into_iter()
        .map(RawQuestion::into_question)
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::with_capacity(questions.len());
    if let Some(q) = questions.iter().find(|q| !seen.insert(q.id)) {
        return Err(SourceError::InvalidQuestion {
            id: q.id,
            reason: "duplicate question id".into(),
        });
    }

    Ok(QuestionBank {
        id,
        title: LocalizedText::new(title_en, title_ar),
        duration_secs: header.duration_secs,
        questions,
    })
}

/// Parse a single bank file, picking the format from its extension.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let format = format_for_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    parse_bank_content(path, format, &content)
}

/// The bank format for `path`, or `Malformed` for an unknown extension.
pub fn format_for_path(path: &Path) -> Result<BankFormat, SourceError> {
    BankFormat::from_path(path).ok_or_else(|| {
        SourceError::Malformed(format!(
            "unsupported question bank extension: {}",
            path.display()
        ))
    })
}

/// Map a failed read of `path` to `NotFound` or `Read`.
pub fn read_error(path: &Path, e: std::io::Error) -> SourceError {
    if e.kind() == std::io::ErrorKind::NotFound {
        SourceError::NotFound(path.display().to_string())
    } else {
        SourceError::Read {
            location: path.display().to_string(),
            message: e.to_string(),
        }
    }
}

/// Parse content already read from `path`. A bank without a header is named
/// after the file stem.
pub fn parse_bank_content(path: &Path, format: BankFormat, content: &str) -> Result<QuestionBank> {
    parse_bank_str(content, format, &file_stem(path))
        .with_context(|| format!("failed to parse question bank: {}", path.display()))
}

/// Parse bank content in a known format (useful for testing and HTTP bodies).
///
/// `fallback_id` names the bank when the content has no header.
pub fn parse_bank_str(content: &str, format: BankFormat, fallback_id: &str) -> Result<QuestionBank> {
    let file = match format {
        BankFormat::Toml => toml::from_str::<BankFile>(content)
            .map_err(|e| SourceError::Malformed(e.to_string()))?,
        BankFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(content)
                .map_err(|e| SourceError::Malformed(e.to_string()))?;
            if value.is_array() {
                BankFile {
                    bank: None,
                    questions: serde_json::from_value(value)
                        .map_err(|e| SourceError::Malformed(e.to_string()))?,
                }
            } else {
                serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))?
            }
        }
    };

    Ok(build_bank(file, fallback_id)?)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bank")
        .to_string()
}

/// Recursively load all `.json` and `.toml` banks from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if BankFormat::from_path(&path).is_some() {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Check a parsed bank for content issues that do not block an exam.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "bank has no questions and cannot be started".into(),
        });
    }

    if bank.duration_secs == Some(0) {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "duration_secs is 0; the default time limit will be used".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in &bank.questions {
        for locale in [Locale::En, Locale::Ar] {
            if q.prompt.get(locale).trim().is_empty() {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: format!("prompt is empty for locale '{locale}'"),
                });
            }
        }
    }

    for q in &bank.questions {
        if q.explanation.is_blank() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "no explanation provided".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SITE_JSON: &str = r#"[
  {
    "id": 1,
    "type": "true_false",
    "question_en": "React components must return a single root element.",
    "question_ar": "يجب أن تعيد مكونات React عنصرًا جذريًا واحدًا.",
    "correct_answer": true,
    "explanation_en": "Fragments count as a single root.",
    "explanation_ar": "تعتبر الأجزاء جذرًا واحدًا."
  },
  {
    "id": 2,
    "type": "multiple_choice",
    "question_en": "Which hook runs side effects?",
    "question_ar": "أي خطاف يشغل التأثيرات الجانبية؟",
    "options_en": ["useState", "useEffect", "useRef"],
    "options_ar": ["useState", "useEffect", "useRef"],
    "correct_answer": 1,
    "explanation_en": "useEffect runs after render.",
    "explanation_ar": "يعمل useEffect بعد العرض."
  }
]"#;

    const VALID_TOML: &str = r#"
[bank]
id = "backend"
title_en = "Backend Exam"
title_ar = "امتحان الخلفية"
duration_secs = 1800

[[questions]]
id = 1
type = "true_false"
question_en = "HTTP is stateless."
question_ar = "بروتوكول HTTP عديم الحالة."
correct_answer = true
explanation_en = "Each request stands alone."
explanation_ar = "كل طلب مستقل."

[[questions]]
id = 2
type = "multiple_choice"
question_en = "Which status means Not Found?"
question_ar = "أي رمز يعني غير موجود؟"
options_en = ["200", "404", "500"]
options_ar = ["200", "404", "500"]
correct_answer = 1
explanation_en = "404 Not Found."
explanation_ar = "404 غير موجود."
"#;

    fn json(content: &str) -> Result<QuestionBank> {
        parse_bank_str(content, BankFormat::Json, "frontend_exam")
    }

    fn invalid_reason(content: &str) -> String {
        let err = json(content).unwrap_err();
        match err.downcast_ref::<SourceError>() {
            Some(SourceError::InvalidQuestion { reason, .. }) => reason.clone(),
            other => panic!("expected InvalidQuestion, got {other:?}"),
        }
    }

    #[test]
    fn parse_site_json_array() {
        let bank = json(SITE_JSON).unwrap();
        assert_eq!(bank.id, "frontend_exam");
        assert_eq!(bank.title.en, "frontend_exam");
        assert_eq!(bank.duration_secs, None);
        assert_eq!(bank.len(), 2);

        let q1 = &bank.questions[0];
        assert_eq!(q1.kind, QuestionKind::BooleanChoice);
        assert!(q1.options.is_empty());
        assert_eq!(q1.correct_answer, Answer::Boolean(true));

        let q2 = &bank.questions[1];
        assert_eq!(q2.kind, QuestionKind::MultipleChoice);
        assert_eq!(q2.options.len(), 3);
        assert_eq!(q2.options[1].en, "useEffect");
        assert_eq!(q2.correct_answer, Answer::Choice(1));
    }

    #[test]
    fn parse_wrapped_json() {
        let content = r#"{
            "bank": { "id": "mini", "title_en": "Mini", "duration_secs": 90 },
            "questions": [
                { "id": 5, "type": "true_false", "question_en": "Yes?", "correct_answer": false }
            ]
        }"#;
        let bank = json(content).unwrap();
        assert_eq!(bank.id, "mini");
        assert_eq!(bank.title.ar, "Mini");
        assert_eq!(bank.duration_secs, Some(90));
        assert_eq!(bank.questions[0].id, 5);
    }

    #[test]
    fn parse_valid_toml() {
        let bank = parse_bank_str(VALID_TOML, BankFormat::Toml, "ignored").unwrap();
        assert_eq!(bank.id, "backend");
        assert_eq!(bank.title.get(Locale::En), "Backend Exam");
        assert_eq!(bank.duration_secs, Some(1800));
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.questions[1].correct_answer, Answer::Choice(1));
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let reason = invalid_reason(
            r#"[{ "id": 3, "type": "multiple_choice", "options_en": ["a", "b"], "correct_answer": 2 }]"#,
        );
        assert!(reason.contains("option index below 2"));
    }

    #[test]
    fn rejects_single_option() {
        let reason = invalid_reason(
            r#"[{ "id": 3, "type": "multiple_choice", "options_en": ["only"], "correct_answer": 0 }]"#,
        );
        assert!(reason.contains("at least 2 options"));
    }

    #[test]
    fn rejects_boolean_with_index_answer() {
        let reason = invalid_reason(r#"[{ "id": 4, "type": "true_false", "correct_answer": 1 }]"#);
        assert!(reason.contains("true or false"));
    }

    #[test]
    fn rejects_boolean_with_options() {
        let reason = invalid_reason(
            r#"[{ "id": 4, "type": "true_false", "options_en": ["yes", "no"], "correct_answer": true }]"#,
        );
        assert!(reason.contains("cannot have options"));
    }

    #[test]
    fn rejects_mismatched_option_locales() {
        let reason = invalid_reason(
            r#"[{ "id": 6, "type": "multiple_choice", "options_en": ["a", "b"], "options_ar": ["أ"], "correct_answer": 0 }]"#,
        );
        assert!(reason.contains("options_ar has 1"));
    }

    #[test]
    fn rejects_unknown_type() {
        let reason = invalid_reason(r#"[{ "id": 9, "type": "essay", "correct_answer": true }]"#);
        assert!(reason.contains("essay"));
    }

    #[test]
    fn arabic_options_fall_back_to_english() {
        let bank = json(
            r#"[{ "id": 7, "type": "multiple_choice", "options_en": ["x", "y"], "correct_answer": 0 }]"#,
        )
        .unwrap();
        assert_eq!(bank.questions[0].options[1].ar, "y");
    }

    #[test]
    fn parse_malformed_content() {
        let err = json("{ not json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Malformed(_))
        ));

        let err = parse_bank_str("this is not [valid toml }{", BankFormat::Toml, "x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = parse_bank(&PathBuf::from("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            BankFormat::from_path(Path::new("a/b.JSON")),
            Some(BankFormat::Json)
        );
        assert_eq!(
            BankFormat::from_path(Path::new("exam.toml")),
            Some(BankFormat::Toml)
        );
        assert_eq!(BankFormat::from_path(Path::new("notes.md")), None);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = json(
            r#"[
            { "id": 1, "type": "true_false", "question_en": "A", "correct_answer": true },
            { "id": 2, "type": "true_false", "question_en": "B", "correct_answer": true },
            { "id": 1, "type": "true_false", "question_en": "C", "correct_answer": false }
        ]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::InvalidQuestion { id: 1, reason }) if reason == "duplicate question id"
        ));
    }

    #[test]
    fn shape_errors_quote_the_raw_value() {
        let reason = invalid_reason(
            r#"[{ "id": 3, "type": "multiple_choice", "options_en": ["a", "b"], "correct_answer": 2 }]"#,
        );
        assert!(reason.ends_with("got 2"), "{reason}");
        let reason = invalid_reason(r#"[{ "id": 4, "type": "true_false", "correct_answer": 0 }]"#);
        assert!(reason.ends_with("got 0"), "{reason}");
    }

    #[test]
    fn validate_flags_missing_text() {
        let content = r#"[
            { "id": 1, "type": "true_false", "question_en": "A", "question_ar": "أ", "correct_answer": true, "explanation_en": "e" },
            { "id": 2, "type": "true_false", "question_en": "B", "correct_answer": false, "explanation_en": "e" }
        ]"#;
        let bank = json(content).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("empty for locale 'ar'")));
        assert!(!warnings.iter().any(|w| w.message.contains("explanation")));
    }

    #[test]
    fn validate_flags_duplicates_in_built_banks() {
        let mut bank = QuestionBank::empty("built");
        for _ in 0..2 {
            bank.questions.push(
                Question::boolean(1, LocalizedText::new("A", "أ"), true)
                    .with_explanation(LocalizedText::new("e", "ش")),
            );
        }
        let warnings = validate_bank(&bank);
        assert!(warnings
            .iter()
            .any(|w| w.message == "duplicate question ID: 1"));
    }

    #[test]
    fn read_errors_map_to_source_errors() {
        let path = Path::new("banks/x.json");
        let missing = read_error(path, std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(missing, SourceError::NotFound(p) if p == "banks/x.json"));
        let denied = read_error(
            path,
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(denied, SourceError::Read { .. }));
        assert!(matches!(
            format_for_path(Path::new("x.yaml")),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn validate_clean_bank() {
        let bank = json(SITE_JSON).unwrap();
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn validate_empty_bank() {
        let bank = json("[]").unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frontend.json"), SITE_JSON).unwrap();
        let nested = dir.path().join("backend");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("backend.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.json"), "[{").unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        let ids: Vec<&str> = banks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["backend", "frontend"]);
    }
}
