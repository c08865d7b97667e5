//! The `feedback submit` command.

use anyhow::{Context, Result};

use feedback_core::model::{Answers, NewFeedbackResponse};
use feedback_core::validate::validate_answers;

use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, form_id: &str, answers_json: &str, student: String) -> Result<()> {
    let answers: Answers =
        serde_json::from_str(answers_json).context("answers must be a JSON object")?;

    let (_, mut store) = super::open_store(global)?;
    let form = store
        .form(form_id)
        .with_context(|| format!("form not found: {form_id}"))?;

    anyhow::ensure!(form.is_active, "form {form_id} is not accepting responses");
    validate_answers(form, &answers).context("response rejected")?;

    let response = store.submit_feedback_response(NewFeedbackResponse {
        form_id: form_id.to_string(),
        answers,
        student_id: student,
    });

    println!("Submitted response {}", response.id);
    Ok(())
}
