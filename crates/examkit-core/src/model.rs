//! Core data model types for examkit.
//!
//! These are the immutable records a session is built from: questions,
//! their bilingual text, submitted answers, and the banks that group them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display locales supported by question banks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Ar => write!(f, "ar"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "ar" | "arabic" => Ok(Locale::Ar),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}

/// A pair of English and Arabic variants of the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub ar: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }

    /// The variant for `locale`.
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Ar => &self.ar,
        }
    }

    /// True when both variants are blank.
    pub fn is_blank(&self) -> bool {
        self.en.trim().is_empty() && self.ar.trim().is_empty()
    }
}

/// The two supported question shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    BooleanChoice,
    MultipleChoice,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::BooleanChoice => write!(f, "true/false"),
            QuestionKind::MultipleChoice => write!(f, "multiple-choice"),
        }
    }
}

/// A submitted or correct answer: a boolean, or a zero-based option index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Boolean(bool),
    Choice(usize),
}

impl Answer {
    /// The question kind this answer shape belongs to.
    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::Boolean(_) => QuestionKind::BooleanChoice,
            Answer::Choice(_) => QuestionKind::MultipleChoice,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Boolean(b) => write!(f, "{b}"),
            Answer::Choice(i) => write!(f, "option {}", i + 1),
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Answer::Boolean(value)
    }
}

impl From<usize> for Answer {
    fn from(value: usize) -> Self {
        Answer::Choice(value)
    }
}

/// A single exam question.
///
/// Instances produced by [`crate::bank`] always satisfy the shape invariant:
/// multiple-choice questions carry at least two options and a correct index
/// inside them, true/false questions carry no options and a boolean answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within its bank.
    pub id: u32,
    pub kind: QuestionKind,
    pub prompt: LocalizedText,
    /// Empty for true/false questions.
    #[serde(default)]
    pub options: Vec<LocalizedText>,
    pub correct_answer: Answer,
    #[serde(default)]
    pub explanation: LocalizedText,
}

impl Question {
    /// Build a true/false question.
    pub fn boolean(id: u32, prompt: LocalizedText, correct: bool) -> Self {
        Self {
            id,
            kind: QuestionKind::BooleanChoice,
            prompt,
            options: Vec::new(),
            correct_answer: Answer::Boolean(correct),
            explanation: LocalizedText::default(),
        }
    }

    /// Build a multiple-choice question.
    pub fn multiple_choice(
        id: u32,
        prompt: LocalizedText,
        options: Vec<LocalizedText>,
        correct: usize,
    ) -> Self {
        Self {
            id,
            kind: QuestionKind::MultipleChoice,
            prompt,
            options,
            correct_answer: Answer::Choice(correct),
            explanation: LocalizedText::default(),
        }
    }

    /// True when `answer` has this question's shape and, for a
    /// multiple-choice question, names one of its options.
    pub fn accepts(&self, answer: Answer) -> bool {
        match (self.kind, answer) {
            (QuestionKind::BooleanChoice, Answer::Boolean(_)) => true,
            (QuestionKind::MultipleChoice, Answer::Choice(i)) => i < self.options.len(),
            _ => false,
        }
    }

    pub fn with_explanation(mut self, explanation: LocalizedText) -> Self {
        self.explanation = explanation;
        self
    }
}

/// The outcome of committing an answer to one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredRecord {
    pub question_id: u32,
    pub submitted: Answer,
    pub is_correct: bool,
}

/// An ordered collection of questions making up one exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    pub title: LocalizedText,
    /// Suggested time limit; callers fall back to their own default.
    #[serde(default)]
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// A bank with no questions, used when a source could not deliver one.
    pub fn empty(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: LocalizedText::new(id.clone(), id.clone()),
            id,
            duration_secs: None,
            questions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_display_and_parse() {
        assert_eq!(Locale::En.to_string(), "en");
        assert_eq!(Locale::Ar.to_string(), "ar");
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("arabic".parse::<Locale>().unwrap(), Locale::Ar);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn localized_text_picks_variant() {
        let text = LocalizedText::new("Hello", "مرحبا");
        assert_eq!(text.get(Locale::En), "Hello");
        assert_eq!(text.get(Locale::Ar), "مرحبا");
        assert!(!text.is_blank());
        assert!(LocalizedText::new(" ", "").is_blank());
    }

    #[test]
    fn answer_deserializes_from_bool_or_index() {
        let b: Answer = serde_json::from_str("true").unwrap();
        let i: Answer = serde_json::from_str("2").unwrap();
        assert_eq!(b, Answer::Boolean(true));
        assert_eq!(i, Answer::Choice(2));
        assert_eq!(b.kind(), QuestionKind::BooleanChoice);
        assert_eq!(i.kind(), QuestionKind::MultipleChoice);
    }

    #[test]
    fn choice_display_is_one_based() {
        assert_eq!(Answer::Choice(0).to_string(), "option 1");
        assert_eq!(Answer::Boolean(false).to_string(), "false");
    }

    #[test]
    fn accepts_matching_shape_only() {
        let tf = Question::boolean(1, LocalizedText::new("?", "?"), true);
        let mc = Question::multiple_choice(
            2,
            LocalizedText::new("?", "?"),
            vec![LocalizedText::new("a", "a"), LocalizedText::new("b", "b")],
            0,
        );
        assert!(tf.accepts(Answer::Boolean(false)));
        assert!(!tf.accepts(Answer::Choice(0)));
        assert!(mc.accepts(Answer::Choice(1)));
        assert!(!mc.accepts(Answer::Choice(2)));
        assert!(!mc.accepts(Answer::Boolean(true)));
    }

    #[test]
    fn empty_bank_uses_id_as_title() {
        let bank = QuestionBank::empty("frontend");
        assert!(bank.is_empty());
        assert_eq!(bank.title.en, "frontend");
    }
}
