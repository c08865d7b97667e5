//! Domain model, storage, and response aggregation for student feedback forms.
//!
//! This crate owns the authoritative state of the feedback system (courses,
//! instructors, forms, and responses), persists it collection by collection,
//! and derives summaries from raw responses on demand.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod seed;
pub mod state;
pub mod storage;
pub mod templates;
pub mod validate;

pub use aggregate::{summarize, FeedbackSummary, QuestionSummary};
pub use error::{StorageError, ValidationError};
pub use state::{CommandOutcome, FeedbackStore};
pub use storage::{FileBackend, MemoryBackend, Storage};
