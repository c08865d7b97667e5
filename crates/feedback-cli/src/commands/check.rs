//! The `feedback check` command.

use anyhow::Result;

use feedback_core::validate::audit;

use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (_, store) = super::open_store(global)?;
    let warnings = audit(&store);

    for w in &warnings {
        println!("  WARNING: {w}");
    }

    if warnings.is_empty() {
        println!("No dangling references.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
