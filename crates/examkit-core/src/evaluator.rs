//! Answer evaluation.

use crate::error::ExamError;
use crate::model::{Answer, AnsweredRecord, Question};

/// Check `submitted` against the question's correct answer.
///
/// Pure and deterministic. A submitted value of the wrong shape (an index
/// for a true/false question, a boolean or out-of-range index for a
/// multiple-choice question) is rejected with `TypeMismatch` rather than
/// scored as incorrect.
pub fn evaluate(question: &Question, submitted: Answer) -> Result<AnsweredRecord, ExamError> {
    if !question.accepts(submitted) {
        return Err(ExamError::TypeMismatch {
            question_id: question.id,
            expected: question.kind,
            submitted,
        });
    }

    Ok(AnsweredRecord {
        question_id: question.id,
        submitted,
        is_correct: submitted == question.correct_answer,
    })
}
