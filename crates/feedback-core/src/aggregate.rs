//! Response aggregation: averages, distributions, and text samples.
//!
//! Every function here is pure. Summaries are recomputed from the full
//! response set on each call; there are no running totals to keep in sync.
//! [`summarize`] is the entry point consumers use for per-form summaries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Answer, FeedbackForm, FeedbackResponse, QuestionKind, QuestionType};
use crate::state::State;

/// Occurrence count per distinct answer value.
pub type Distribution = BTreeMap<Answer, usize>;

/// Mean of the numeric answers to `question_id`, or `0.0` if there are none.
///
/// Non-numeric answers are ignored. Summation is done in integers so the
/// result does not depend on response order.
pub fn average_rating(responses: &[FeedbackResponse], question_id: &str) -> f64 {
    let (sum, count) = responses
        .iter()
        .filter_map(|r| r.answer(question_id).and_then(Answer::as_number))
        .fold((0i128, 0u64), |(sum, count), n| (sum + n as i128, count + 1));

    if count == 0 {
        return 0.0;
    }
    sum as f64 / count as f64
}

/// Count of each distinct answer to `question_id`, over responses that
/// answered it.
pub fn distribution(responses: &[FeedbackResponse], question_id: &str) -> Distribution {
    let mut dist = Distribution::new();
    for answer in responses.iter().filter_map(|r| r.answer(question_id)) {
        *dist.entry(answer.clone()).or_insert(0) += 1;
    }
    dist
}

/// Non-blank text answers to `question_id`, oldest submission first.
///
/// Responses submitted at the same instant are ordered by id, so the output
/// does not depend on the order of `responses`. Answers are returned as
/// submitted, untrimmed.
pub fn text_responses(responses: &[FeedbackResponse], question_id: &str) -> Vec<String> {
    let mut ordered: Vec<&FeedbackResponse> = responses.iter().collect();
    ordered.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    ordered
        .into_iter()
        .filter_map(|r| r.answer(question_id).and_then(Answer::as_text))
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// The aggregate computed for one question, shaped by its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryDetail {
    Rating {
        #[serde(rename = "averageRating")]
        average_rating: f64,
        distribution: Distribution,
    },
    Choice {
        distribution: Distribution,
    },
    Text {
        responses: Vec<String>,
    },
}

/// Summary of one question across a response set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSummary {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(flatten)]
    pub detail: SummaryDetail,
}

impl QuestionSummary {
    pub fn average_rating(&self) -> Option<f64> {
        match &self.detail {
            SummaryDetail::Rating { average_rating, .. } => Some(*average_rating),
            _ => None,
        }
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        match &self.detail {
            SummaryDetail::Rating { distribution, .. } | SummaryDetail::Choice { distribution } => {
                Some(distribution)
            }
            SummaryDetail::Text { .. } => None,
        }
    }

    pub fn text_responses(&self) -> Option<&[String]> {
        match &self.detail {
            SummaryDetail::Text { responses } => Some(responses),
            _ => None,
        }
    }
}

/// Summary of a whole form across a response set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub total_responses: usize,
    /// Keyed by question id.
    pub question_summaries: BTreeMap<String, QuestionSummary>,
}

impl FeedbackSummary {
    pub fn question(&self, question_id: &str) -> Option<&QuestionSummary> {
        self.question_summaries.get(question_id)
    }
}

/// Summarize `responses` against every question of `form`.
///
/// The caller is responsible for passing only the responses that belong to
/// `form` (see [`responses_for_form`]). An empty set yields zero averages and
/// empty distributions rather than an error.
pub fn summarize(responses: &[FeedbackResponse], form: &FeedbackForm) -> FeedbackSummary {
    let question_summaries = form
        .questions
        .iter()
        .map(|question| {
            let detail = match &question.kind {
                QuestionKind::Rating { .. } => SummaryDetail::Rating {
                    average_rating: average_rating(responses, &question.id),
                    distribution: distribution(responses, &question.id),
                },
                QuestionKind::MultipleChoice { .. } | QuestionKind::YesNo => {
                    SummaryDetail::Choice {
                        distribution: distribution(responses, &question.id),
                    }
                }
                QuestionKind::Text => SummaryDetail::Text {
                    responses: text_responses(responses, &question.id),
                },
            };

            (
                question.id.clone(),
                QuestionSummary {
                    question: question.question.clone(),
                    question_type: question.question_type(),
                    detail,
                },
            )
        })
        .collect();

    FeedbackSummary {
        total_responses: responses.len(),
        question_summaries,
    }
}

// ---------------------------------------------------------------------------
// Dashboard helpers
// ---------------------------------------------------------------------------

/// The responses that belong to `form_id`, in their original order.
pub fn responses_for_form(responses: &[FeedbackResponse], form_id: &str) -> Vec<FeedbackResponse> {
    responses
        .iter()
        .filter(|r| r.form_id == form_id)
        .cloned()
        .collect()
}

/// Number of responses per form id. Orphaned responses are counted too.
pub fn response_counts(responses: &[FeedbackResponse]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in responses {
        *counts.entry(r.form_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// The last `limit` responses, newest first.
pub fn recent_responses(responses: &[FeedbackResponse], limit: usize) -> Vec<&FeedbackResponse> {
    responses.iter().rev().take(limit).collect()
}

/// Responses as a percentage of `total_students`; `0.0` if there are none.
pub fn completion_rate(response_count: usize, total_students: usize) -> f64 {
    if total_students == 0 {
        return 0.0;
    }
    response_count as f64 / total_students as f64 * 100.0
}

/// Mean of the average ratings of every rating question on `form`, or `0.0`
/// if the form has no rating questions.
pub fn overall_rating(form: &FeedbackForm, summary: &FeedbackSummary) -> f64 {
    let averages: Vec<f64> = form
        .questions
        .iter()
        .filter(|q| q.question_type() == QuestionType::Rating)
        .map(|q| {
            summary
                .question(&q.id)
                .and_then(QuestionSummary::average_rating)
                .unwrap_or(0.0)
        })
        .collect();

    if averages.is_empty() {
        return 0.0;
    }
    averages.iter().sum::<f64>() / averages.len() as f64
}

/// Headline counts for an administrator dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_forms: usize,
    pub active_forms: usize,
    pub total_responses: usize,
    pub courses: usize,
    pub instructors: usize,
}

pub fn overview(state: &State) -> Overview {
    Overview {
        total_forms: state.feedback_forms.len(),
        active_forms: state.feedback_forms.iter().filter(|f| f.is_active).count(),
        total_responses: state.feedback_responses.len(),
        courses: state.courses.len(),
        instructors: state.instructors.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answers, Question, TargetType};
    use crate::templates::five_star;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn response(id: &str, minutes: i64, answers: &[(&str, Answer)]) -> FeedbackResponse {
        FeedbackResponse {
            id: id.into(),
            form_id: "form".into(),
            answers: answers
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<Answers>(),
            student_id: "anonymous".into(),
            submitted_at: base_time() + Duration::minutes(minutes),
        }
    }

    fn make_form(questions: Vec<Question>) -> FeedbackForm {
        FeedbackForm {
            id: "form".into(),
            title: "Course Evaluation".into(),
            description: None,
            target_type: TargetType::General,
            target_id: None,
            questions,
            is_active: true,
            created_at: base_time(),
        }
    }

    fn rating_and_text_form() -> FeedbackForm {
        let mut rating = Question::rating("Overall?", five_star());
        rating.id = "rating".into();
        let mut text = Question::text("Comments?").optional();
        text.id = "text".into();
        make_form(vec![rating, text])
    }

    fn scenario_responses() -> Vec<FeedbackResponse> {
        vec![
            response("r1", 0, &[("rating", Answer::Number(5)), ("text", "great".into())]),
            response("r2", 1, &[("rating", Answer::Number(3)), ("text", "".into())]),
            response("r3", 2, &[("rating", Answer::Number(4))]),
        ]
    }

    #[test]
    fn scenario_rating_and_text() {
        let form = rating_and_text_form();
        let responses = scenario_responses();
        let summary = summarize(&responses, &form);

        assert_eq!(summary.total_responses, 3);

        let rating = summary.question("rating").unwrap();
        assert!((rating.average_rating().unwrap() - 4.0).abs() < f64::EPSILON);
        let dist = rating.distribution().unwrap();
        assert_eq!(dist.len(), 3);
        assert_eq!(dist[&Answer::Number(5)], 1);
        assert_eq!(dist[&Answer::Number(3)], 1);
        assert_eq!(dist[&Answer::Number(4)], 1);

        let text = summary.question("text").unwrap();
        assert_eq!(text.text_responses().unwrap(), ["great".to_string()]);
        assert!(text.distribution().is_none());
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average_rating(&[], "rating"), 0.0);
        let responses = vec![response("r1", 0, &[("other", Answer::Number(2))])];
        assert_eq!(average_rating(&responses, "rating"), 0.0);
    }

    #[test]
    fn average_ignores_text_answers() {
        let responses = vec![
            response("r1", 0, &[("q", Answer::Number(2))]),
            response("r2", 1, &[("q", "4".into())]),
        ];
        assert_eq!(average_rating(&responses, "q"), 2.0);
    }

    #[test]
    fn average_stays_within_scale() {
        let scale = five_star();
        let responses: Vec<FeedbackResponse> = (0..50)
            .map(|i| response(&format!("r{i}"), i, &[("q", Answer::Number(1 + i % 5))]))
            .collect();
        let avg = average_rating(&responses, "q");
        assert!(avg >= scale.min as f64 && avg <= scale.max as f64);
    }

    #[test]
    fn distribution_counts_only_present_answers() {
        let responses = vec![
            response("r1", 0, &[("q", "yes".into())]),
            response("r2", 1, &[("q", "no".into())]),
            response("r3", 2, &[("q", "yes".into())]),
            response("r4", 3, &[]),
        ];
        let dist = distribution(&responses, "q");
        assert_eq!(dist[&Answer::from("yes")], 2);
        assert_eq!(dist[&Answer::from("no")], 1);
        assert_eq!(dist.values().sum::<usize>(), 3);
    }

    #[test]
    fn text_responses_follow_submission_order() {
        let responses = vec![
            response("late", 10, &[("q", "second".into())]),
            response("early", 0, &[("q", "first".into())]),
            response("blank", 5, &[("q", "   ".into())]),
        ];
        assert_eq!(text_responses(&responses, "q"), vec!["first", "second"]);
    }

    #[test]
    fn summarize_is_order_independent() {
        let form = rating_and_text_form();
        let mut responses = scenario_responses();
        responses.push(response("r4", 2, &[("text", "also good".into())]));

        let forward = summarize(&responses, &form);
        responses.reverse();
        let backward = summarize(&responses, &form);
        responses.swap(0, 2);
        let shuffled = summarize(&responses, &form);

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
        assert_eq!(forward, summarize(&responses, &form));
    }

    #[test]
    fn summarize_empty_set() {
        let mut choice = Question::multiple_choice("Pace?", vec!["slow".into(), "fast".into()])
            .unwrap();
        choice.id = "choice".into();
        let mut form = rating_and_text_form();
        form.questions.push(choice);

        let summary = summarize(&[], &form);
        assert_eq!(summary.total_responses, 0);
        assert_eq!(summary.question_summaries.len(), 3);
        assert_eq!(summary.question("rating").unwrap().average_rating(), Some(0.0));
        assert!(summary.question("rating").unwrap().distribution().unwrap().is_empty());
        assert!(summary.question("choice").unwrap().distribution().unwrap().is_empty());
        assert!(summary.question("text").unwrap().text_responses().unwrap().is_empty());
    }

    #[test]
    fn summary_serializes_like_the_collection_layout() {
        let summary = summarize(&scenario_responses(), &rating_and_text_form());
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["totalResponses"], 3);
        assert_eq!(value["questionSummaries"]["rating"]["type"], "rating");
        assert_eq!(value["questionSummaries"]["rating"]["averageRating"], 4.0);
        assert_eq!(value["questionSummaries"]["rating"]["distribution"]["5"], 1);
        assert_eq!(value["questionSummaries"]["text"]["responses"][0], "great");
    }

    #[test]
    fn overall_rating_averages_rating_questions() {
        let mut q1 = Question::rating("A", five_star());
        q1.id = "a".into();
        let mut q2 = Question::rating("B", five_star());
        q2.id = "b".into();
        let form = make_form(vec![q1, q2, Question::text("C")]);
        let responses = vec![response("r1", 0, &[("a", Answer::Number(5)), ("b", Answer::Number(3))])];

        let summary = summarize(&responses, &form);
        assert!((overall_rating(&form, &summary) - 4.0).abs() < f64::EPSILON);

        let text_only = make_form(vec![Question::text("Only text")]);
        let summary = summarize(&responses, &text_only);
        assert_eq!(overall_rating(&text_only, &summary), 0.0);
    }

    #[test]
    fn filtering_and_counts() {
        let mut responses = scenario_responses();
        responses[1].form_id = "other".into();

        assert_eq!(responses_for_form(&responses, "form").len(), 2);
        assert!(responses_for_form(&responses, "missing").is_empty());

        let counts = response_counts(&responses);
        assert_eq!(counts["form"], 2);
        assert_eq!(counts["other"], 1);
    }

    #[test]
    fn recent_is_newest_first() {
        let responses = scenario_responses();
        let recent: Vec<&str> = recent_responses(&responses, 2)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(recent, vec!["r3", "r2"]);
        assert_eq!(recent_responses(&responses, 10).len(), 3);
    }

    #[test]
    fn completion_rate_handles_zero_students() {
        assert_eq!(completion_rate(5, 0), 0.0);
        assert!((completion_rate(5, 20) - 25.0).abs() < f64::EPSILON);
    }
}
