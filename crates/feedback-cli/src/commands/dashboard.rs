//! The `feedback dashboard` command.

use anyhow::Result;
use comfy_table::Table;

use feedback_core::aggregate::{overview, recent_responses};

use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (config, store) = super::open_store(global)?;
    let stats = overview(store.state());

    println!("Feedback dashboard ({})", config.data_dir.display());
    let mut table = Table::new();
    table.set_header(vec!["Forms", "Active", "Responses", "Courses", "Instructors"]);
    table.add_row(vec![
        stats.total_forms.to_string(),
        stats.active_forms.to_string(),
        stats.total_responses.to_string(),
        stats.courses.to_string(),
        stats.instructors.to_string(),
    ]);
    println!("{table}");

    let recent = recent_responses(store.feedback_responses(), config.recent_activity_limit);
    println!("\nRecent activity:");
    if recent.is_empty() {
        println!("  No responses yet.");
    }
    for response in recent {
        let title = store
            .form_for_response(response)
            .map(|f| f.title.as_str())
            .unwrap_or("(deleted form)");
        println!(
            "  {}  {}  {}",
            response.submitted_at.format("%Y-%m-%d %H:%M"),
            title,
            response.student_id
        );
    }

    Ok(())
}
