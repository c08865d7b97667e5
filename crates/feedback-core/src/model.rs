//! Core data model types.
//!
//! These are the entities the state store owns and persists: courses,
//! instructors, feedback forms with their questions, and submitted responses.
//! Field names serialize in camelCase to match the persisted collection layout.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A course that forms can target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    /// Instructor display name. Not a reference into the instructor
    /// collection; the two may drift apart.
    pub instructor: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Course fields supplied by the administrator; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub name: String,
    pub instructor: String,
    pub department: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An instructor that forms can target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Instructor fields supplied by the administrator; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstructor {
    pub name: String,
    pub department: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Widest scale [`RatingScale::check`] accepts.
pub const MAX_SCALE_POINTS: usize = 100;

/// A numeric rating scale, e.g. 1..=5 with one label per point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: i64,
    pub max: i64,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl RatingScale {
    /// Create a scale. `labels` must be empty or hold exactly one label per point.
    pub fn new(min: i64, max: i64, labels: Vec<String>) -> Result<Self, ValidationError> {
        let scale = Self { min, max, labels };
        scale.check()?;
        Ok(scale)
    }

    /// Check the invariants `new` enforces, for scales that came from storage.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.min >= self.max {
            return Err(ValidationError::InvalidScale(format!(
                "min ({}) must be below max ({})",
                self.min, self.max
            )));
        }
        let points = self
            .point_count()
            .filter(|&n| n <= MAX_SCALE_POINTS)
            .ok_or_else(|| {
                ValidationError::InvalidScale(format!(
                    "{}..={} has more than {MAX_SCALE_POINTS} points",
                    self.min, self.max
                ))
            })?;
        if !self.labels.is_empty() && self.labels.len() != points {
            return Err(ValidationError::InvalidScale(format!(
                "expected {points} labels, got {}",
                self.labels.len()
            )));
        }
        Ok(())
    }

    /// Number of rating values, or `None` if the range is empty or too wide to
    /// count.
    pub fn point_count(&self) -> Option<usize> {
        let span = self.max.checked_sub(self.min)?.checked_add(1)?;
        usize::try_from(span).ok().filter(|&n| n > 0)
    }

    /// All valid rating values, lowest first.
    pub fn points(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        self.points().contains(&value)
    }

    /// The label for a rating value, if one is defined.
    pub fn label_for(&self, value: i64) -> Option<&str> {
        if !self.contains(value) {
            return None;
        }
        let offset = usize::try_from(value.checked_sub(self.min)?).ok()?;
        self.labels.get(offset).map(String::as_str)
    }
}

/// The discriminant of a question, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Rating,
    MultipleChoice,
    Text,
    YesNo,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Rating => write!(f, "rating"),
            QuestionType::MultipleChoice => write!(f, "multiple_choice"),
            QuestionType::Text => write!(f, "text"),
            QuestionType::YesNo => write!(f, "yes_no"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "rating" => Ok(QuestionType::Rating),
            "multiple_choice" | "choice" => Ok(QuestionType::MultipleChoice),
            "text" => Ok(QuestionType::Text),
            "yes_no" | "yesno" => Ok(QuestionType::YesNo),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// The only answers a yes/no question accepts.
pub const YES_NO_CHOICES: [&str; 2] = ["Yes", "No"];

/// Type-specific payload of a question, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Rating { scale: RatingScale },
    MultipleChoice { options: Vec<String> },
    Text,
    YesNo,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Rating { .. } => QuestionType::Rating,
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::Text => QuestionType::Text,
            QuestionKind::YesNo => QuestionType::YesNo,
        }
    }
}

/// A single question within a feedback form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// The prompt shown to the respondent.
    pub question: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    fn with_kind(question: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: crate::id::generate_id(),
            question: question.into(),
            required: true,
            kind,
        }
    }

    /// A required rating question on the given scale.
    pub fn rating(question: impl Into<String>, scale: RatingScale) -> Self {
        Self::with_kind(question, QuestionKind::Rating { scale })
    }

    /// A required multiple choice question. At least one option is needed.
    pub fn multiple_choice(
        question: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let question = question.into();
        if options.iter().all(|o| o.trim().is_empty()) {
            return Err(ValidationError::NoOptions(question));
        }
        Ok(Self::with_kind(
            question,
            QuestionKind::MultipleChoice { options },
        ))
    }

    /// A required free-text question.
    pub fn text(question: impl Into<String>) -> Self {
        Self::with_kind(question, QuestionKind::Text)
    }

    /// A required yes/no question.
    pub fn yes_no(question: impl Into<String>) -> Self {
        Self::with_kind(question, QuestionKind::YesNo)
    }

    /// Mark this question as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// The rating scale, for rating questions.
    pub fn scale(&self) -> Option<&RatingScale> {
        match &self.kind {
            QuestionKind::Rating { scale } => Some(scale),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// What a feedback form is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Course,
    Instructor,
    General,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Course => write!(f, "course"),
            TargetType::Instructor => write!(f, "instructor"),
            TargetType::General => write!(f, "general"),
        }
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "course" => Ok(TargetType::Course),
            "instructor" => Ok(TargetType::Instructor),
            "general" => Ok(TargetType::General),
            other => Err(format!("unknown target type: {other}")),
        }
    }
}

/// A feedback form: an ordered set of questions about a course, an
/// instructor, or nothing in particular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackForm {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub target_type: TargetType,
    /// Course or instructor id. May dangle if the target was deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl FeedbackForm {
    /// Look up a question by id.
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

/// Form fields supplied by the administrator. The store assigns the id,
/// creation timestamp, and active flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedbackForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_type: TargetType,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A single answer value: an integer for rating questions, a string for
/// every other question type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Number(i64),
    Text(String),
}

impl Answer {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Answer::Number(n) => Some(*n),
            Answer::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            Answer::Number(_) => None,
        }
    }

    /// An empty or whitespace-only text answer.
    pub fn is_blank(&self) -> bool {
        matches!(self, Answer::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Number(n) => write!(f, "{n}"),
            Answer::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Answer {
    fn from(n: i64) -> Self {
        Answer::Number(n)
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Text(s.to_string())
    }
}

impl From<String> for Answer {
    fn from(s: String) -> Self {
        Answer::Text(s)
    }
}

/// Answers keyed by question id. Optional questions may be absent.
pub type Answers = BTreeMap<String, Answer>;

/// One submission against a form. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: String,
    /// The form answered. May dangle if the form was deleted.
    pub form_id: String,
    #[serde(default)]
    pub answers: Answers,
    pub student_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl FeedbackResponse {
    pub fn answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }
}

/// Submission fields supplied by the respondent. The store assigns the id and
/// submission timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedbackResponse {
    pub form_id: String,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default = "anonymous")]
    pub student_id: String,
}

fn anonymous() -> String {
    "anonymous".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::MultipleChoice.to_string(), "multiple_choice");
        assert_eq!("yes_no".parse::<QuestionType>().unwrap(), QuestionType::YesNo);
        assert_eq!("Yes-No".parse::<QuestionType>().unwrap(), QuestionType::YesNo);
        assert_eq!("rating".parse::<QuestionType>().unwrap(), QuestionType::Rating);
        assert!("slider".parse::<QuestionType>().is_err());
    }

    #[test]
    fn target_type_display_and_parse() {
        assert_eq!(TargetType::Instructor.to_string(), "instructor");
        assert_eq!("Course".parse::<TargetType>().unwrap(), TargetType::Course);
        assert!("department".parse::<TargetType>().is_err());
    }

    #[test]
    fn rating_scale_validation() {
        assert!(RatingScale::new(1, 5, vec![]).is_ok());
        assert!(RatingScale::new(5, 5, vec![]).is_err());
        assert!(RatingScale::new(1, 3, vec!["a".into(), "b".into()]).is_err());

        let scale =
            RatingScale::new(1, 3, vec!["low".into(), "mid".into(), "high".into()]).unwrap();
        assert_eq!(scale.label_for(2), Some("mid"));
        assert_eq!(scale.label_for(4), None);
        assert!(scale.contains(3));
        assert!(!scale.contains(0));
    }

    #[test]
    fn extreme_scales_are_rejected_without_overflow() {
        assert!(RatingScale::new(i64::MIN, i64::MAX, vec![]).is_err());
        assert!(RatingScale::new(-1, i64::MAX, vec![]).is_err());
        assert!(RatingScale::new(1, 101, vec![]).is_err());
        assert!(RatingScale::new(0, 99, vec![]).is_ok());

        let wide = RatingScale {
            min: i64::MIN,
            max: i64::MAX,
            labels: vec![],
        };
        assert_eq!(wide.point_count(), None);
        assert_eq!(wide.label_for(i64::MAX), None);
        assert_eq!(five_point().point_count(), Some(5));
    }

    fn five_point() -> RatingScale {
        RatingScale::new(1, 5, vec![]).unwrap()
    }

    #[test]
    fn multiple_choice_requires_options() {
        assert!(Question::multiple_choice("Pick one", vec![]).is_err());
        assert!(Question::multiple_choice("Pick one", vec!["  ".into()]).is_err());
        let q = Question::multiple_choice("Pick one", vec!["A".into(), "B".into()]).unwrap();
        assert_eq!(q.question_type(), QuestionType::MultipleChoice);
        assert!(q.required);
    }

    #[test]
    fn question_wire_format_is_tagged() {
        let q = Question {
            id: "q1".into(),
            question: "How was it?".into(),
            required: true,
            kind: QuestionKind::Rating {
                scale: RatingScale::new(1, 5, vec![]).unwrap(),
            },
        };
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "rating");
        assert_eq!(value["scale"]["max"], 5);

        let text: Question = serde_json::from_value(json!({
            "id": "q2",
            "type": "text",
            "question": "Comments?",
            "required": false
        }))
        .unwrap();
        assert_eq!(text.kind, QuestionKind::Text);
        assert!(!text.required);
    }

    #[test]
    fn form_uses_camel_case_keys() {
        let form: FeedbackForm = serde_json::from_value(json!({
            "id": "f1",
            "title": "Course Evaluation",
            "targetType": "course",
            "targetId": "1",
            "questions": [
                {"id": "q1", "type": "yes_no", "question": "Recommend?", "required": true}
            ],
            "isActive": true,
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(form.target_type, TargetType::Course);
        assert_eq!(form.target_id.as_deref(), Some("1"));
        assert!(form.question("q1").is_some());

        let value = serde_json::to_value(&form).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("isActive").is_some());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn answers_keep_their_json_type() {
        let response: FeedbackResponse = serde_json::from_value(json!({
            "id": "r1",
            "formId": "f1",
            "answers": {"q1": 4, "q2": "great", "q3": "yes"},
            "studentId": "anonymous",
            "submittedAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(response.answer("q1"), Some(&Answer::Number(4)));
        assert_eq!(response.answer("q2").and_then(Answer::as_text), Some("great"));
        assert!(response.answer("q4").is_none());
    }

    #[test]
    fn blank_answers() {
        assert!(Answer::from("   ").is_blank());
        assert!(!Answer::from("ok").is_blank());
        assert!(!Answer::Number(3).is_blank());
    }
}
