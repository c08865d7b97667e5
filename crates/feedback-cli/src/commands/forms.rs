//! The `feedback create-form`, `delete-form`, and `set-form-active` commands.

use anyhow::{Context, Result};

use feedback_core::templates::Template;
use feedback_core::validate::validate_new_form;

use crate::GlobalArgs;

pub fn create(
    global: &GlobalArgs,
    template: String,
    target_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let template: Template = template.parse().map_err(anyhow::Error::msg)?;
    let (_, mut store) = super::open_store(global)?;

    let mut form = template.instantiate(target_id);
    if let Some(title) = title {
        form.title = title;
    }
    form.description = description;

    validate_new_form(&form).context("form rejected")?;

    let created = store.add_feedback_form(form);
    println!("Created form {} ({})", created.id, created.title);
    println!(
        "Target: {} ({})",
        store.resolve_target(&created).display_name(),
        created.target_type
    );
    for (i, q) in created.questions.iter().enumerate() {
        let marker = if q.required { "*" } else { "" };
        println!("  Q{}{marker} [{}] {}: {}", i + 1, q.question_type(), q.id, q.question);
    }
    Ok(())
}

pub fn delete(global: &GlobalArgs, id: &str) -> Result<()> {
    let (_, mut store) = super::open_store(global)?;
    let kept = store.responses_for(id).len();

    let outcome = store.delete_feedback_form(id);
    if !outcome.found {
        println!("No form with id {id}; nothing deleted.");
        return Ok(());
    }

    println!("Deleted form {id}");
    if kept > 0 {
        println!("{kept} response(s) kept as orphaned responses.");
    }
    if !outcome.persisted {
        println!("Warning: change could not be saved to disk.");
    }
    Ok(())
}

pub fn set_active(global: &GlobalArgs, id: &str, active: bool) -> Result<()> {
    let (_, mut store) = super::open_store(global)?;
    let mut form = store
        .form(id)
        .cloned()
        .with_context(|| format!("form not found: {id}"))?;

    if form.is_active == active {
        println!("Form {id} is already {}.", state_word(active));
        return Ok(());
    }

    form.is_active = active;
    let outcome = store.update_feedback_form(form);
    println!("Form {id} is now {}.", state_word(active));
    if !outcome.persisted {
        println!("Warning: change could not be saved to disk.");
    }
    Ok(())
}

fn state_word(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "inactive"
    }
}
