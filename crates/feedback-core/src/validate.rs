//! Input validation and integrity checks.
//!
//! The store's commands trust their input. Callers run [`validate_new_form`]
//! and [`validate_answers`] first and report failures to whoever is making
//! the change. [`audit`] lists dangling references, which are tolerated and
//! only reported.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::model::{
    Answer, Answers, FeedbackForm, NewFeedbackForm, Question, QuestionKind, TargetType,
    YES_NO_CHOICES,
};
use crate::state::{FeedbackStore, Target};

/// Check a form before it is created or updated.
///
/// Returns the first problem found.
pub fn validate_new_form(form: &NewFeedbackForm) -> Result<(), ValidationError> {
    if form.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if form.questions.is_empty() {
        return Err(ValidationError::NoQuestions);
    }
    if form.target_type != TargetType::General
        && form.target_id.as_deref().map_or(true, |id| id.trim().is_empty())
    {
        return Err(ValidationError::MissingTarget(form.target_type.to_string()));
    }

    let mut seen = HashSet::new();
    for question in &form.questions {
        if !seen.insert(question.id.as_str()) {
            return Err(ValidationError::DuplicateQuestionId(question.id.clone()));
        }
        if question.question.trim().is_empty() {
            return Err(ValidationError::EmptyQuestionText(question.id.clone()));
        }
        match &question.kind {
            QuestionKind::Rating { scale } => scale.check()?,
            QuestionKind::MultipleChoice { options } => {
                if options.iter().all(|o| o.trim().is_empty()) {
                    return Err(ValidationError::NoOptions(question.id.clone()));
                }
            }
            QuestionKind::Text | QuestionKind::YesNo => {}
        }
    }

    Ok(())
}

/// Check an existing form being edited, using the same rules as creation.
pub fn validate_form(form: &FeedbackForm) -> Result<(), ValidationError> {
    validate_new_form(&NewFeedbackForm {
        title: form.title.clone(),
        description: form.description.clone(),
        target_type: form.target_type,
        target_id: form.target_id.clone(),
        questions: form.questions.clone(),
    })
}

/// Check a submission against `form`.
///
/// Every required question needs a non-blank answer, and every non-blank
/// answer must fit its question: an integer on the scale for ratings, one of
/// the options for multiple choice, `Yes`/`No` for yes/no, text for text.
/// Blank answers to optional questions count as unanswered.
pub fn validate_answers(form: &FeedbackForm, answers: &Answers) -> Result<(), ValidationError> {
    let missing = form
        .questions
        .iter()
        .filter(|q| q.required)
        .find(|q| answers.get(&q.id).map_or(true, |a| a.is_blank()));
    if let Some(q) = missing {
        return Err(ValidationError::MissingRequiredAnswer(q.id.clone()));
    }

    for (question_id, answer) in answers {
        let question = form
            .question(question_id)
            .ok_or_else(|| ValidationError::UnknownQuestion(question_id.clone()))?;
        if answer.is_blank() {
            continue;
        }
        check_answer(question, answer)?;
    }

    Ok(())
}

fn check_answer(question: &Question, answer: &Answer) -> Result<(), ValidationError> {
    match (&question.kind, answer) {
        (QuestionKind::Rating { scale }, Answer::Number(n)) => {
            if scale.contains(*n) {
                Ok(())
            } else {
                Err(ValidationError::OutOfScale {
                    question: question.id.clone(),
                    value: *n,
                    min: scale.min,
                    max: scale.max,
                })
            }
        }
        (QuestionKind::MultipleChoice { options }, Answer::Text(value)) => {
            if options.iter().any(|o| o == value) {
                Ok(())
            } else {
                Err(ValidationError::UnknownOption {
                    question: question.id.clone(),
                    value: value.clone(),
                })
            }
        }
        (QuestionKind::YesNo, Answer::Text(value)) => {
            if YES_NO_CHOICES.contains(&value.as_str()) {
                Ok(())
            } else {
                Err(ValidationError::UnknownOption {
                    question: question.id.clone(),
                    value: value.clone(),
                })
            }
        }
        (QuestionKind::Text, Answer::Text(_)) => Ok(()),
        _ => Err(ValidationError::WrongAnswerType {
            question: question.id.clone(),
            expected: question.question_type(),
            value: answer.to_string(),
        }),
    }
}

/// A dangling reference found by [`audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
    /// A form targets a course or instructor that no longer exists.
    UnknownTarget {
        form_id: String,
        target_type: TargetType,
        target_id: Option<String>,
    },
    /// A response references a form that no longer exists.
    OrphanedResponse { response_id: String, form_id: String },
}

impl std::fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityWarning::UnknownTarget {
                form_id,
                target_type,
                target_id,
            } => write!(
                f,
                "form {form_id} targets unknown {target_type} {}",
                target_id.as_deref().unwrap_or("<none>")
            ),
            IntegrityWarning::OrphanedResponse {
                response_id,
                form_id,
            } => write!(f, "response {response_id} references deleted form {form_id}"),
        }
    }
}

/// List every dangling reference in the store. Never fails.
pub fn audit(store: &FeedbackStore) -> Vec<IntegrityWarning> {
    let mut warnings = Vec::new();

    for form in store.feedback_forms() {
        if store.resolve_target(form) == Target::Unknown {
            warnings.push(IntegrityWarning::UnknownTarget {
                form_id: form.id.clone(),
                target_type: form.target_type,
                target_id: form.target_id.clone(),
            });
        }
    }

    for response in store.orphaned_responses() {
        warnings.push(IntegrityWarning::OrphanedResponse {
            response_id: response.id.clone(),
            form_id: response.form_id.clone(),
        });
    }

    warnings
}
