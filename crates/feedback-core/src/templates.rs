//! Standard rating scales and starter form templates.

use serde::{Deserialize, Serialize};

use crate::model::{NewFeedbackForm, Question, RatingScale, TargetType};

/// 1..=5 with word labels.
pub fn five_star() -> RatingScale {
    RatingScale {
        min: 1,
        max: 5,
        labels: ["Poor", "Fair", "Good", "Very Good", "Excellent"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

/// 1..=10 labelled with the numbers themselves.
pub fn ten_point() -> RatingScale {
    RatingScale {
        min: 1,
        max: 10,
        labels: (1..=10).map(|n| n.to_string()).collect(),
    }
}

/// The built-in starter templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Course,
    Instructor,
}

impl std::str::FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "course" => Ok(Template::Course),
            "instructor" => Ok(Template::Instructor),
            other => Err(format!("unknown template: {other}")),
        }
    }
}

impl Template {
    pub fn title(self) -> &'static str {
        match self {
            Template::Course => "Course Evaluation",
            Template::Instructor => "Instructor Evaluation",
        }
    }

    /// A fresh set of questions for this template. Every call generates new
    /// question ids.
    pub fn questions(self) -> Vec<Question> {
        match self {
            Template::Course => vec![
                Question::rating(
                    "How would you rate the overall quality of this course?",
                    five_star(),
                ),
                Question::rating(
                    "How clear were the course objectives and expectations?",
                    five_star(),
                ),
                Question::rating("How would you rate the course materials?", five_star()),
                Question::text("What did you like most about this course?").optional(),
                Question::text("What suggestions do you have for improving this course?")
                    .optional(),
            ],
            Template::Instructor => vec![
                Question::rating(
                    "How would you rate the instructor's teaching effectiveness?",
                    five_star(),
                ),
                Question::rating(
                    "How accessible was the instructor for help and questions?",
                    five_star(),
                ),
                Question::rating(
                    "How well did the instructor communicate course material?",
                    five_star(),
                ),
                Question::yes_no("Would you recommend this instructor to other students?"),
                Question::text("Additional comments about the instructor:").optional(),
            ],
        }
    }

    /// A ready-to-submit form targeting `target_id`.
    pub fn instantiate(self, target_id: Option<String>) -> NewFeedbackForm {
        let target_type = match self {
            Template::Course => TargetType::Course,
            Template::Instructor => TargetType::Instructor,
        };
        NewFeedbackForm {
            title: self.title().to_string(),
            description: None,
            target_type,
            target_id,
            questions: self.questions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    #[test]
    fn builtin_scales_are_valid() {
        five_star().check().unwrap();
        ten_point().check().unwrap();
        assert_eq!(five_star().label_for(5), Some("Excellent"));
        assert_eq!(ten_point().labels.len(), 10);
    }

    #[test]
    fn course_template_shape() {
        let questions = Template::Course.questions();
        assert_eq!(questions.len(), 5);
        let ratings = questions
            .iter()
            .filter(|q| q.question_type() == QuestionType::Rating)
            .count();
        assert_eq!(ratings, 3);
        assert!(questions[3..].iter().all(|q| !q.required));
    }

    #[test]
    fn instructor_template_has_required_yes_no() {
        let questions = Template::Instructor.questions();
        let yes_no = questions
            .iter()
            .find(|q| q.question_type() == QuestionType::YesNo)
            .unwrap();
        assert!(yes_no.required);
    }

    #[test]
    fn instantiation_generates_fresh_ids() {
        let a = Template::Course.instantiate(Some("1".into()));
        let b = Template::Course.instantiate(Some("1".into()));
        assert_eq!(a.title, "Course Evaluation");
        assert_eq!(a.target_type, TargetType::Course);
        assert_ne!(a.questions[0].id, b.questions[0].id);
    }

    #[test]
    fn parse_template_name() {
        assert_eq!("Instructor".parse::<Template>().unwrap(), Template::Instructor);
        assert!("general".parse::<Template>().is_err());
    }
}
