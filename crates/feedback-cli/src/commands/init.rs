//! The `feedback init` command.

use anyhow::Result;

use feedback_core::seed::seed_defaults;
use feedback_core::Storage;

use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    if std::path::Path::new("feedback.toml").exists() {
        println!("feedback.toml already exists, skipping.");
    } else {
        std::fs::write("feedback.toml", SAMPLE_CONFIG)?;
        println!("Created feedback.toml");
    }

    let config = super::config(global)?;
    let storage = Storage::open_dir(&config.data_dir)?.with_pretty_json(config.pretty_json);
    let report = seed_defaults(&storage);

    if report.is_noop() {
        println!("Data in {} already initialized.", config.data_dir.display());
    }
    for collection in &report.initialized {
        println!("Initialized {collection}");
    }
    for collection in &report.failed {
        println!("Could not initialize {collection}");
    }

    println!("\nNext steps:");
    println!("  1. Run: feedback create-form --template course --target-id 1");
    println!("  2. Run: feedback forms");
    println!("  3. Run: feedback summary --form <id>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# feedback configuration

data_dir = "./feedback-data"
seed_on_startup = true
recent_activity_limit = 5
pretty_json = true
"#;
