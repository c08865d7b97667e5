//! The `feedback` command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "feedback", version, about = "Student feedback forms and summaries")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

/// Course fields. Required by `add-course`; optional patches for `update-course`.
#[derive(Args, Clone)]
pub struct CourseFields {
    /// Course name
    #[arg(long)]
    name: Option<String>,

    /// Instructor display name
    #[arg(long)]
    instructor: Option<String>,

    /// Department
    #[arg(long)]
    department: Option<String>,

    /// Course description
    #[arg(long)]
    description: Option<String>,
}

/// Instructor fields. Required by `add-instructor`; optional patches for
/// `update-instructor`.
#[derive(Args, Clone)]
pub struct InstructorFields {
    /// Instructor name
    #[arg(long)]
    name: Option<String>,

    /// Department
    #[arg(long)]
    department: Option<String>,

    /// Contact email
    #[arg(long)]
    email: Option<String>,

    /// Short biography
    #[arg(long)]
    bio: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and seed the data directory
    Init,

    /// List courses
    Courses,

    /// List instructors
    Instructors,

    /// Add a course
    AddCourse {
        #[command(flatten)]
        fields: CourseFields,
    },

    /// Change fields of an existing course
    UpdateCourse {
        /// Course id
        #[arg(long)]
        id: String,

        #[command(flatten)]
        fields: CourseFields,
    },

    /// Delete a course (forms targeting it are kept)
    DeleteCourse {
        /// Course id
        #[arg(long)]
        id: String,
    },

    /// Add an instructor
    AddInstructor {
        #[command(flatten)]
        fields: InstructorFields,
    },

    /// Change fields of an existing instructor
    UpdateInstructor {
        /// Instructor id
        #[arg(long)]
        id: String,

        #[command(flatten)]
        fields: InstructorFields,
    },

    /// Delete an instructor (forms targeting them are kept)
    DeleteInstructor {
        /// Instructor id
        #[arg(long)]
        id: String,
    },

    /// List feedback forms with response counts
    Forms {
        /// Only show forms accepting responses
        #[arg(long)]
        active: bool,
    },

    /// Create a feedback form from a template
    CreateForm {
        /// Template: course, instructor
        #[arg(long)]
        template: String,

        /// Target course or instructor id
        #[arg(long)]
        target_id: Option<String>,

        /// Override the template title
        #[arg(long)]
        title: Option<String>,

        /// Form description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a feedback form (its responses are kept)
    DeleteForm {
        /// Form id
        #[arg(long)]
        id: String,
    },

    /// Open or close a form for submissions
    SetFormActive {
        /// Form id
        #[arg(long)]
        id: String,

        /// true to accept responses, false to close the form
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },

    /// Submit a response to a form
    Submit {
        /// Form id
        #[arg(long)]
        form: String,

        /// Answers as a JSON object of question id to value
        #[arg(long)]
        answers: String,

        /// Student identifier
        #[arg(long, default_value = "anonymous")]
        student: String,
    },

    /// Show the aggregated summary of a form
    Summary {
        /// Form id
        #[arg(long)]
        form: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show headline counts and recent activity
    Dashboard,

    /// Report dangling references (unknown targets, orphaned responses)
    Check,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("feedback_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    let result = match cli.command {
        Commands::Init => commands::init::execute(&global),
        Commands::Courses => commands::list::courses(&global),
        Commands::Instructors => commands::list::instructors(&global),
        Commands::AddCourse { fields } => commands::catalog::add_course(&global, fields),
        Commands::UpdateCourse { id, fields } => {
            commands::catalog::update_course(&global, &id, fields)
        }
        Commands::DeleteCourse { id } => commands::catalog::delete_course(&global, &id),
        Commands::AddInstructor { fields } => commands::catalog::add_instructor(&global, fields),
        Commands::UpdateInstructor { id, fields } => {
            commands::catalog::update_instructor(&global, &id, fields)
        }
        Commands::DeleteInstructor { id } => commands::catalog::delete_instructor(&global, &id),
        Commands::Forms { active } => commands::list::forms(&global, active),
        Commands::CreateForm {
            template,
            target_id,
            title,
            description,
        } => commands::forms::create(&global, template, target_id, title, description),
        Commands::DeleteForm { id } => commands::forms::delete(&global, &id),
        Commands::SetFormActive { id, active } => {
            commands::forms::set_active(&global, &id, active)
        }
        Commands::Submit {
            form,
            answers,
            student,
        } => commands::submit::execute(&global, &form, &answers, student),
        Commands::Summary { form, format } => commands::summary::execute(&global, &form, &format),
        Commands::Dashboard => commands::dashboard::execute(&global),
        Commands::Check => commands::check::execute(&global),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
