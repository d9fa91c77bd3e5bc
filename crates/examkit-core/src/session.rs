//! The exam session state machine.
//!
//! A [`Session`] moves `Idle → Running → Finished` and back to `Idle` on
//! [`Session::reset`]. Every mutation goes through one of the named
//! operations; presentation code reads [`SessionSnapshot`]s and never
//! touches the aggregate directly.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ExamError, Operation};
use crate::evaluator::evaluate;
use crate::model::{Answer, AnsweredRecord, Question};
use crate::scoring::{score, Summary};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::Finished => write!(f, "finished"),
        }
    }
}

/// Why a session reached `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Every question was answered.
    Completed,
    /// The countdown reached zero.
    TimeExpired,
}

/// A single timed exam attempt.
#[derive(Debug, Clone, Default)]
pub struct Session {
    id: Option<Uuid>,
    status: SessionStatus,
    questions: Vec<Question>,
    current_index: usize,
    /// Positional: `answers[i]` belongs to `questions[i]`.
    answers: Vec<AnsweredRecord>,
    duration_secs: u32,
    remaining_secs: u32,
    pending: Option<Answer>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    finish_reason: Option<FinishReason>,
    summary: Option<Summary>,
}

impl Session {
    /// A fresh session in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an exam over `questions` with a countdown of `duration_secs`.
    ///
    /// Allowed from `Idle` and from `Finished` (which is reset first). The
    /// question list is taken by value, so later changes to the caller's
    /// bank cannot reach a running session. On error the session is left
    /// exactly as it was.
    pub fn start(&mut self, questions: Vec<Question>, duration_secs: u32) -> Result<(), ExamError> {
        if self.status == SessionStatus::Running {
            return Err(ExamError::invalid(
                Operation::Start,
                "an exam is already running",
            ));
        }
        if questions.is_empty() {
            return Err(ExamError::invalid(
                Operation::Start,
                "the exam has no questions",
            ));
        }
        if duration_secs == 0 {
            return Err(ExamError::invalid(
                Operation::Start,
                "the time limit must be at least one second",
            ));
        }
        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(q) = questions.iter().find(|q| !seen.insert(q.id)) {
            return Err(ExamError::invalid(
                Operation::Start,
                format!("question id {} appears more than once", q.id),
            ));
        }

        let id = Uuid::new_v4();
        tracing::info!(
            session = %id,
            questions = questions.len(),
            duration_secs,
            "exam started"
        );

        *self = Session {
            id: Some(id),
            status: SessionStatus::Running,
            questions,
            duration_secs,
            remaining_secs: duration_secs,
            started_at: Some(Utc::now()),
            ..Session::default()
        };
        Ok(())
    }

    /// Remember `answer` as the pending choice for the current question.
    ///
    /// Calling again before [`advance`](Self::advance) replaces the value.
    pub fn select_answer(&mut self, answer: Answer) -> Result<(), ExamError> {
        self.require_running(Operation::SelectAnswer)?;
        tracing::debug!(index = self.current_index, %answer, "answer selected");
        self.pending = Some(answer);
        Ok(())
    }

    /// Commit the pending selection and move on.
    ///
    /// The selection is evaluated against the current question and recorded;
    /// on the last question the session finishes, otherwise the index moves
    /// forward. A question revisited with [`go_to_previous`](Self::go_to_previous)
    /// keeps its original record: the new selection is checked for shape and
    /// then discarded, and the existing record is returned.
    pub fn advance(&mut self) -> Result<AnsweredRecord, ExamError> {
        self.require_running(Operation::Advance)?;

        let question = &self.questions[self.current_index];
        let Some(pending) = self.pending else {
            return Err(ExamError::NoSelection {
                question_id: question.id,
            });
        };

        let evaluated = evaluate(question, pending).inspect_err(|e| {
            tracing::error!(
                session = self.id.map(tracing::field::display),
                "rejected answer: {e}"
            );
        })?;

        let record = match self.answers.get(self.current_index) {
            Some(existing) => *existing,
            None => {
                self.answers.push(evaluated);
                evaluated
            }
        };
        self.pending = None;

        tracing::debug!(
            question = record.question_id,
            correct = record.is_correct,
            "answer recorded"
        );

        if self.current_index + 1 == self.questions.len() {
            self.finish(FinishReason::Completed);
        } else {
            self.current_index += 1;
        }
        Ok(record)
    }

    /// Step back one question, dropping any pending selection.
    pub fn go_to_previous(&mut self) -> Result<(), ExamError> {
        self.require_running(Operation::GoToPrevious)?;
        if self.current_index == 0 {
            return Err(ExamError::invalid(
                Operation::GoToPrevious,
                "already at the first question",
            ));
        }
        self.current_index -= 1;
        self.pending = None;
        Ok(())
    }

    /// Count one second off the clock, finishing the exam when it hits zero.
    ///
    /// Returns the seconds left after the tick.
    pub fn tick(&mut self) -> Result<u32, ExamError> {
        self.require_running(Operation::Tick)?;
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.finish(FinishReason::TimeExpired);
        }
        Ok(self.remaining_secs)
    }

    /// Discard everything and return to `Idle`. Always succeeds.
    pub fn reset(&mut self) {
        if let Some(id) = self.id {
            tracing::debug!(session = %id, status = %self.status, "session reset");
        }
        *self = Session::default();
    }

    fn finish(&mut self, reason: FinishReason) {
        let summary = score(&self.questions, &self.answers);
        tracing::info!(
            session = self.id.map(tracing::field::display),
            ?reason,
            percentage = summary.percentage,
            band = %summary.band,
            "exam finished"
        );
        self.status = SessionStatus::Finished;
        self.pending = None;
        self.finished_at = Some(Utc::now());
        self.finish_reason = Some(reason);
        self.summary = Some(summary);
    }

    fn require_running(&self, operation: Operation) -> Result<(), ExamError> {
        if self.status == SessionStatus::Running {
            Ok(())
        } else {
            Err(ExamError::invalid(
                operation,
                format!("the session is {}", self.status),
            ))
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question on screen; `None` unless running.
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_running() {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    pub fn answers(&self) -> &[AnsweredRecord] {
        &self.answers
    }

    pub fn pending_selection(&self) -> Option<Answer> {
        self.pending
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.duration_secs - self.remaining_secs
    }

    /// `(current_index + 1) / question_count`, or 0 while idle.
    pub fn progress(&self) -> f64 {
        if self.status == SessionStatus::Idle || self.questions.is_empty() {
            0.0
        } else {
            (self.current_index + 1) as f64 / self.questions.len() as f64
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// The score, available once the session is `Finished`.
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// An owned, read-only view for presentation.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            status: self.status,
            current_index: self.current_index,
            question_count: self.questions.len(),
            current_question: self.current_question().cloned(),
            current_answer: if self.is_running() {
                self.answers.get(self.current_index).copied()
            } else {
                None
            },
            pending_selection: self.pending,
            answered_count: self.answers.len(),
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining_secs,
            elapsed_secs: self.elapsed_secs(),
            progress: self.progress(),
            finish_reason: self.finish_reason,
            summary: self.summary.clone(),
        }
    }
}

/// What a presentation layer may observe about a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Option<Uuid>,
    pub status: SessionStatus,
    pub current_index: usize,
    pub question_count: usize,
    pub current_question: Option<Question>,
    /// Already-recorded answer for the current question, when revisiting.
    pub current_answer: Option<AnsweredRecord>,
    pub pending_selection: Option<Answer>,
    pub answered_count: usize,
    pub duration_secs: u32,
    pub remaining_secs: u32,
    pub elapsed_secs: u32,
    pub progress: f64,
    pub finish_reason: Option<FinishReason>,
    pub summary: Option<Summary>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Session::default().snapshot()
    }
}
