//! Exam scoring and qualitative bands.
//!
//! The percentage is always taken against the full question count, so
//! questions left unanswered when the clock runs out count against the score.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AnsweredRecord, Question};

/// Qualitative band derived from a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Excellent,
    Good,
    Pass,
    NeedsImprovement,
}

impl Band {
    /// Thresholds are inclusive lower bounds, checked highest first.
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 90 {
            Band::Excellent
        } else if percentage >= 80 {
            Band::Good
        } else if percentage >= 60 {
            Band::Pass
        } else {
            Band::NeedsImprovement
        }
    }

    pub fn is_passing(&self) -> bool {
        !matches!(self, Band::NeedsImprovement)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Excellent => write!(f, "Excellent"),
            Band::Good => write!(f, "Good"),
            Band::Pass => write!(f, "Pass"),
            Band::NeedsImprovement => write!(f, "Needs Improvement"),
        }
    }
}

/// How a single question ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    NotAttempted,
}

/// Per-question result, in question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: u32,
    pub outcome: Outcome,
}

/// Aggregate statistics for a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_questions: usize,
    pub attempted_count: usize,
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub unattempted_count: usize,
    /// Rounded to the nearest integer, halves up.
    pub percentage: u32,
    pub band: Band,
    pub outcomes: Vec<QuestionOutcome>,
}

impl Summary {
    pub fn passed(&self) -> bool {
        self.band.is_passing()
    }
}

/// Score a set of answers against the questions they were given for.
///
/// `answers` is positional, as a session records it: `answers[i]` is the
/// record for `questions[i]`, and questions past the end were not attempted.
pub fn score(questions: &[Question], answers: &[AnsweredRecord]) -> Summary {
    let correct_count = answers.iter().filter(|a| a.is_correct).count();
    let attempted_count = answers.len();
    let total_questions = questions.len();

    let percentage = rounded_percentage(correct_count, total_questions);

    let outcomes = questions
        .iter()
        .enumerate()
        .map(|(i, q)| QuestionOutcome {
            question_id: q.id,
            outcome: match answers.get(i) {
                Some(r) if r.is_correct => Outcome::Correct,
                Some(_) => Outcome::Incorrect,
                None => Outcome::NotAttempted,
            },
        })
        .collect();

    Summary {
        total_questions,
        attempted_count,
        correct_count,
        incorrect_count: attempted_count - correct_count,
        unattempted_count: total_questions.saturating_sub(attempted_count),
        percentage,
        band: Band::from_percentage(percentage),
        outcomes,
    }
}

/// `round(100 * correct / total)` in integer arithmetic.
fn rounded_percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct as u64;
    let total = total as u64;
    ((200 * correct + total) / (2 * total)) as u32
}
