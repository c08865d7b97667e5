//! The `feedback summary` command.

use anyhow::{Context, Result};
use comfy_table::Table;

use feedback_core::aggregate::{overall_rating, Distribution, SummaryDetail};
use feedback_core::model::{
    Answer, FeedbackForm, Question, QuestionKind, QuestionType, YES_NO_CHOICES,
};
use feedback_core::FeedbackSummary;

use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, form_id: &str, format: &str) -> Result<()> {
    let (_, store) = super::open_store(global)?;
    let form = store
        .form(form_id)
        .with_context(|| format!("form not found: {form_id}"))?;
    let summary = store
        .summary_for(form_id)
        .with_context(|| format!("form not found: {form_id}"))?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "text" => {
            let target = store.resolve_target(form);
            print_text(form, target.display_name(), &summary);
        }
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

fn print_text(form: &FeedbackForm, target: &str, summary: &FeedbackSummary) {
    println!("{}", form.title);
    println!("Target: {target} ({})", form.target_type);
    println!("Responses: {}", summary.total_responses);
    if form.questions.iter().any(|q| q.scale().is_some()) {
        println!("Overall rating: {:.2}", overall_rating(form, summary));
    }

    for (i, question) in form.questions.iter().enumerate() {
        let Some(qs) = summary.question(&question.id) else {
            continue;
        };
        println!("\nQ{}. {} [{}]", i + 1, qs.question, qs.question_type);

        match &qs.detail {
            SummaryDetail::Rating {
                average_rating,
                distribution,
            } => {
                println!("Average: {average_rating:.2}");
                println!("{}", distribution_table(question, distribution, summary.total_responses));
            }
            SummaryDetail::Choice { distribution } => {
                println!("{}", distribution_table(question, distribution, summary.total_responses));
            }
            SummaryDetail::Text { responses } => {
                if responses.is_empty() {
                    println!("  (no text responses)");
                }
                for text in responses {
                    println!("  \"{text}\"");
                }
            }
        }
    }
}

/// One row per possible answer (scale point or option), then any other
/// values that were submitted.
fn distribution_table(question: &Question, dist: &Distribution, total: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Answer", "Count", "Share"]);

    let mut expected: Vec<(Answer, String)> = Vec::new();
    if let QuestionKind::Rating { scale } = &question.kind {
        // A stored scale that fails its check may be arbitrarily wide.
        let points = if scale.check().is_ok() {
            scale.points()
        } else {
            1..=0
        };
        for point in points {
            let label = match scale.label_for(point) {
                Some(l) if l != point.to_string() => format!("{point} ({l})"),
                _ => point.to_string(),
            };
            expected.push((Answer::Number(point), label));
        }
    } else if let QuestionKind::MultipleChoice { options } = &question.kind {
        for option in options {
            expected.push((Answer::from(option.as_str()), option.clone()));
        }
    } else if question.question_type() == QuestionType::YesNo {
        for choice in YES_NO_CHOICES {
            expected.push((Answer::from(choice), choice.to_string()));
        }
    }

    let share = |count: usize| {
        if total == 0 {
            "0.0%".to_string()
        } else {
            format!("{:.1}%", count as f64 / total as f64 * 100.0)
        }
    };

    for (answer, label) in &expected {
        let count = dist.get(answer).copied().unwrap_or(0);
        table.add_row(vec![label.clone(), count.to_string(), share(count)]);
    }
    for (answer, count) in dist {
        if !expected.iter().any(|(a, _)| a == answer) {
            table.add_row(vec![answer.to_string(), count.to_string(), share(*count)]);
        }
    }

    table
}
