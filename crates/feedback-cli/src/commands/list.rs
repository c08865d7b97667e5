//! The `feedback courses`, `feedback instructors`, and `feedback forms` commands.

use anyhow::Result;
use comfy_table::Table;

use feedback_core::aggregate::response_counts;

use crate::GlobalArgs;

pub fn courses(global: &GlobalArgs) -> Result<()> {
    let (_, store) = super::open_store(global)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Instructor", "Department"]);
    for c in store.courses() {
        table.add_row(vec![
            c.id.as_str(),
            c.name.as_str(),
            c.instructor.as_str(),
            c.department.as_str(),
        ]);
    }
    println!("{table}");
    println!("{} course(s)", store.courses().len());
    Ok(())
}

pub fn instructors(global: &GlobalArgs) -> Result<()> {
    let (_, store) = super::open_store(global)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Department", "Email"]);
    for i in store.instructors() {
        table.add_row(vec![
            i.id.as_str(),
            i.name.as_str(),
            i.department.as_str(),
            i.email.as_str(),
        ]);
    }
    println!("{table}");
    println!("{} instructor(s)", store.instructors().len());
    Ok(())
}

pub fn forms(global: &GlobalArgs, active_only: bool) -> Result<()> {
    let (_, store) = super::open_store(global)?;

    let forms = if active_only {
        store.active_forms()
    } else {
        store.feedback_forms().iter().collect()
    };

    if forms.is_empty() {
        println!("No feedback forms. Create one with `feedback create-form`.");
        return Ok(());
    }

    let counts = response_counts(store.feedback_responses());
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Type", "Target", "Questions", "Responses", "Active"]);
    for form in forms {
        table.add_row(vec![
            form.id.clone(),
            form.title.clone(),
            form.target_type.to_string(),
            store.resolve_target(form).display_name().to_string(),
            form.questions.len().to_string(),
            counts.get(&form.id).copied().unwrap_or(0).to_string(),
            if form.is_active { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
