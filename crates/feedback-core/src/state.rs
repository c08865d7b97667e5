//! The authoritative in-memory state and its command set.
//!
//! [`FeedbackStore`] is constructed once at startup and handed to whatever
//! needs it. Its collections are only changed through the commands below.
//! Each command builds the new collection, writes it through [`Storage`],
//! and only then swaps it into memory, so readers never see a half-applied
//! command. A failed write is logged and the in-memory value still wins.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::aggregate::{responses_for_form, summarize, FeedbackSummary};
use crate::id::generate_id;
use crate::model::{
    Course, FeedbackForm, FeedbackResponse, Instructor, NewCourse, NewFeedbackForm,
    NewFeedbackResponse, NewInstructor, TargetType,
};
use crate::seed::seed_defaults;
use crate::storage::{Collection, Storage};

/// Snapshot of every collection the store owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub feedback_forms: Vec<FeedbackForm>,
    pub feedback_responses: Vec<FeedbackResponse>,
}

/// Result of an update or delete command.
///
/// A missing id is not an error: the collection is left as it was (and
/// written back unchanged) with `found == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether an entity with the given id existed.
    pub found: bool,
    /// Whether the resulting collection reached storage.
    pub persisted: bool,
}

/// What a form is about, resolved against the current collections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target<'a> {
    Course(&'a Course),
    Instructor(&'a Instructor),
    General,
    /// The form names a target that does not exist (or names none).
    Unknown,
}

impl Target<'_> {
    /// Display name of the target, `"Unknown"` when it cannot be resolved.
    pub fn display_name(&self) -> &str {
        match self {
            Target::Course(c) => &c.name,
            Target::Instructor(i) => &i.name,
            Target::General => "General",
            Target::Unknown => "Unknown",
        }
    }
}

trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Course {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Instructor {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for FeedbackForm {
    fn id(&self) -> &str {
        &self.id
    }
}

fn replaced<T: Identified + Clone>(items: &[T], item: T) -> (Vec<T>, bool) {
    let mut found = false;
    let next = items
        .iter()
        .map(|existing| {
            if existing.id() == item.id() {
                found = true;
                item.clone()
            } else {
                existing.clone()
            }
        })
        .collect();
    (next, found)
}

fn removed<T: Identified + Clone>(items: &[T], id: &str) -> (Vec<T>, bool) {
    let next: Vec<T> = items.iter().filter(|e| e.id() != id).cloned().collect();
    let found = next.len() != items.len();
    (next, found)
}

fn appended<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(item);
    next
}

/// The single authoritative store of courses, instructors, forms, and responses.
#[derive(Debug)]
pub struct FeedbackStore {
    storage: Storage,
    state: State,
}

impl FeedbackStore {
    /// A store with empty collections. Nothing is read from `storage` until
    /// [`load_all`](Self::load_all) is called.
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            state: State::default(),
        }
    }

    /// Bootstrap: seed missing collections, then load everything.
    pub fn open(storage: Storage) -> Self {
        Self::open_with(storage, true)
    }

    /// Like [`open`](Self::open), with seeding optional.
    pub fn open_with(storage: Storage, seed: bool) -> Self {
        if seed {
            seed_defaults(&storage);
        }
        let mut store = Self::new(storage);
        store.load_all();
        store
    }

    /// Reload all four collections from storage. Missing or corrupted
    /// collections load as empty.
    pub fn load_all(&mut self) {
        let storage = &self.storage;
        let state = State {
            courses: storage.load(Collection::Courses.key(), Vec::new()),
            instructors: storage.load(Collection::Instructors.key(), Vec::new()),
            feedback_forms: storage.load(Collection::FeedbackForms.key(), Vec::new()),
            feedback_responses: storage.load(Collection::FeedbackResponses.key(), Vec::new()),
        };
        tracing::debug!(
            "loaded {} courses, {} instructors, {} forms, {} responses",
            state.courses.len(),
            state.instructors.len(),
            state.feedback_forms.len(),
            state.feedback_responses.len()
        );
        self.state = state;
    }

    fn persist<T: Serialize>(&self, collection: Collection, value: &[T]) -> bool {
        match self.storage.save(collection.key(), value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to persist {collection}, keeping in-memory state: {e}");
                false
            }
        }
    }

    // -- queries -------------------------------------------------------------

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn courses(&self) -> &[Course] {
        &self.state.courses
    }

    pub fn instructors(&self) -> &[Instructor] {
        &self.state.instructors
    }

    pub fn feedback_forms(&self) -> &[FeedbackForm] {
        &self.state.feedback_forms
    }

    pub fn feedback_responses(&self) -> &[FeedbackResponse] {
        &self.state.feedback_responses
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.state.courses.iter().find(|c| c.id == id)
    }

    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.state.instructors.iter().find(|i| i.id == id)
    }

    pub fn form(&self, id: &str) -> Option<&FeedbackForm> {
        self.state.feedback_forms.iter().find(|f| f.id == id)
    }

    /// Resolve what `form` targets. Dangling ids resolve to [`Target::Unknown`].
    pub fn resolve_target(&self, form: &FeedbackForm) -> Target<'_> {
        let id = form.target_id.as_deref();
        match form.target_type {
            TargetType::General => Target::General,
            TargetType::Course => id
                .and_then(|id| self.course(id))
                .map_or(Target::Unknown, Target::Course),
            TargetType::Instructor => id
                .and_then(|id| self.instructor(id))
                .map_or(Target::Unknown, Target::Instructor),
        }
    }

    /// The form a response answers, or `None` for an orphaned response.
    pub fn form_for_response(&self, response: &FeedbackResponse) -> Option<&FeedbackForm> {
        self.form(&response.form_id)
    }

    /// Responses whose form no longer exists.
    pub fn orphaned_responses(&self) -> Vec<&FeedbackResponse> {
        self.state
            .feedback_responses
            .iter()
            .filter(|r| self.form(&r.form_id).is_none())
            .collect()
    }

    /// Forms currently open for submissions.
    pub fn active_forms(&self) -> Vec<&FeedbackForm> {
        self.state
            .feedback_forms
            .iter()
            .filter(|f| f.is_active)
            .collect()
    }

    /// Forms with at least one response.
    pub fn forms_with_responses(&self) -> Vec<&FeedbackForm> {
        self.state
            .feedback_forms
            .iter()
            .filter(|f| {
                self.state
                    .feedback_responses
                    .iter()
                    .any(|r| r.form_id == f.id)
            })
            .collect()
    }

    /// Responses submitted against `form_id`, in submission order.
    pub fn responses_for(&self, form_id: &str) -> Vec<FeedbackResponse> {
        responses_for_form(&self.state.feedback_responses, form_id)
    }

    /// Summarize the responses of an existing form.
    pub fn summary_for(&self, form_id: &str) -> Option<FeedbackSummary> {
        let form = self.form(form_id)?;
        Some(summarize(&self.responses_for(form_id), form))
    }

    // -- course commands -----------------------------------------------------

    pub fn add_course(&mut self, data: NewCourse) -> Course {
        let course = Course {
            id: generate_id(),
            name: data.name,
            instructor: data.instructor,
            department: data.department,
            description: data.description,
        };
        tracing::debug!("add_course {}", course.id);
        let next = appended(&self.state.courses, course.clone());
        self.persist(Collection::Courses, &next);
        self.state.courses = next;
        course
    }

    pub fn update_course(&mut self, course: Course) -> CommandOutcome {
        tracing::debug!("update_course {}", course.id);
        let (next, found) = replaced(&self.state.courses, course);
        let persisted = self.persist(Collection::Courses, &next);
        self.state.courses = next;
        CommandOutcome { found, persisted }
    }

    pub fn delete_course(&mut self, id: &str) -> CommandOutcome {
        tracing::debug!("delete_course {id}");
        let (next, found) = removed(&self.state.courses, id);
        let persisted = self.persist(Collection::Courses, &next);
        self.state.courses = next;
        CommandOutcome { found, persisted }
    }

    // -- instructor commands -------------------------------------------------

    pub fn add_instructor(&mut self, data: NewInstructor) -> Instructor {
        let instructor = Instructor {
            id: generate_id(),
            name: data.name,
            department: data.department,
            email: data.email,
            bio: data.bio,
        };
        tracing::debug!("add_instructor {}", instructor.id);
        let next = appended(&self.state.instructors, instructor.clone());
        self.persist(Collection::Instructors, &next);
        self.state.instructors = next;
        instructor
    }

    pub fn update_instructor(&mut self, instructor: Instructor) -> CommandOutcome {
        tracing::debug!("update_instructor {}", instructor.id);
        let (next, found) = replaced(&self.state.instructors, instructor);
        let persisted = self.persist(Collection::Instructors, &next);
        self.state.instructors = next;
        CommandOutcome { found, persisted }
    }

    pub fn delete_instructor(&mut self, id: &str) -> CommandOutcome {
        tracing::debug!("delete_instructor {id}");
        let (next, found) = removed(&self.state.instructors, id);
        let persisted = self.persist(Collection::Instructors, &next);
        self.state.instructors = next;
        CommandOutcome { found, persisted }
    }

    // -- form commands -------------------------------------------------------

    /// Create a form. It gets a fresh id, the current time, and starts active.
    pub fn add_feedback_form(&mut self, data: NewFeedbackForm) -> FeedbackForm {
        let form = FeedbackForm {
            id: generate_id(),
            title: data.title,
            description: data.description,
            target_type: data.target_type,
            target_id: data.target_id,
            questions: data.questions,
            is_active: true,
            created_at: Utc::now(),
        };
        tracing::debug!("add_feedback_form {}", form.id);
        let next = appended(&self.state.feedback_forms, form.clone());
        self.persist(Collection::FeedbackForms, &next);
        self.state.feedback_forms = next;
        form
    }

    /// Replace the form with the same id.
    pub fn update_feedback_form(&mut self, form: FeedbackForm) -> CommandOutcome {
        tracing::debug!("update_feedback_form {}", form.id);
        let (next, found) = replaced(&self.state.feedback_forms, form);
        let persisted = self.persist(Collection::FeedbackForms, &next);
        self.state.feedback_forms = next;
        CommandOutcome { found, persisted }
    }

    /// Remove a form. Its responses stay in the response collection.
    pub fn delete_feedback_form(&mut self, id: &str) -> CommandOutcome {
        tracing::debug!("delete_feedback_form {id}");
        let (next, found) = removed(&self.state.feedback_forms, id);
        let persisted = self.persist(Collection::FeedbackForms, &next);
        self.state.feedback_forms = next;
        CommandOutcome { found, persisted }
    }

    // -- response commands ---------------------------------------------------

    /// Append a response, stamping it with a fresh id and the current time.
    pub fn submit_feedback_response(&mut self, data: NewFeedbackResponse) -> FeedbackResponse {
        let response = FeedbackResponse {
            id: generate_id(),
            form_id: data.form_id,
            answers: data.answers,
            student_id: data.student_id,
            submitted_at: Utc::now(),
        };
        tracing::debug!(
            "submit_feedback_response {} for form {}",
            response.id,
            response.form_id
        );
        let next = appended(&self.state.feedback_responses, response.clone());
        self.persist(Collection::FeedbackResponses, &next);
        self.state.feedback_responses = next;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::model::{Answer, Answers, Question};
    use crate::seed::{sample_courses, sample_instructors};
    use crate::storage::StorageBackend;
    use crate::templates::five_star;

    /// A backend whose writes always fail, as if storage were full.
    struct FullBackend;

    impl StorageBackend for FullBackend {
        fn name(&self) -> &str {
            "full"
        }

        fn read(&self, _: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }

        fn delete(&self, _: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn seeded_store() -> FeedbackStore {
        FeedbackStore::open(Storage::in_memory())
    }

    fn stored_courses(store: &FeedbackStore) -> Vec<Course> {
        store.storage().load("courses", Vec::new())
    }

    fn course_form(target_id: &str) -> NewFeedbackForm {
        let mut rating = Question::rating("Overall?", five_star());
        rating.id = "q-rating".into();
        NewFeedbackForm {
            title: "Course Evaluation".into(),
            description: None,
            target_type: TargetType::Course,
            target_id: Some(target_id.into()),
            questions: vec![rating],
        }
    }

    fn answer(form_id: &str, rating: i64) -> NewFeedbackResponse {
        let mut answers = Answers::new();
        answers.insert("q-rating".into(), Answer::Number(rating));
        NewFeedbackResponse {
            form_id: form_id.into(),
            answers,
            student_id: "anonymous".into(),
        }
    }

    #[test]
    fn open_seeds_and_loads() {
        let store = seeded_store();
        assert_eq!(store.courses(), sample_courses().as_slice());
        assert_eq!(store.instructors(), sample_instructors().as_slice());
        assert!(store.feedback_forms().is_empty());
        assert!(store.feedback_responses().is_empty());
    }

    #[test]
    fn add_course_assigns_id_and_persists() {
        let mut store = seeded_store();
        let course = store.add_course(NewCourse {
            name: "Biology 110".into(),
            instructor: "Dr. Green".into(),
            department: "Biology".into(),
            description: Some("Intro to cells".into()),
        });

        assert!(!course.id.is_empty());
        assert_eq!(store.courses().len(), 5);
        assert_eq!(stored_courses(&store).last(), Some(&course));
    }

    #[test]
    fn update_missing_course_is_a_noop() {
        let mut store = seeded_store();
        let before = store.courses().to_vec();

        let outcome = store.update_course(Course {
            id: "does-not-exist".into(),
            name: "Ghost".into(),
            instructor: "Nobody".into(),
            department: "None".into(),
            description: None,
        });

        assert_eq!(
            outcome,
            CommandOutcome {
                found: false,
                persisted: true
            }
        );
        assert_eq!(store.courses(), before.as_slice());
        assert_eq!(stored_courses(&store), before);
    }

    #[test]
    fn update_and_delete_course() {
        let mut store = seeded_store();
        let mut course = store.course("2").unwrap().clone();
        course.name = "Linear Algebra".into();

        assert!(store.update_course(course).found);
        assert_eq!(store.course("2").unwrap().name, "Linear Algebra");
        assert_eq!(stored_courses(&store)[1].name, "Linear Algebra");

        assert!(store.delete_course("2").found);
        assert!(store.course("2").is_none());
        assert!(!store.delete_course("2").found);
        assert_eq!(stored_courses(&store).len(), 3);
    }

    #[test]
    fn instructor_lifecycle() {
        let mut store = seeded_store();
        let added = store.add_instructor(NewInstructor {
            name: "Dr. Green".into(),
            department: "Biology".into(),
            email: "green@university.edu".into(),
            bio: None,
        });
        assert_eq!(store.instructors().len(), 5);

        let mut updated = added.clone();
        updated.bio = Some("Cell biologist".into());
        assert!(store.update_instructor(updated).found);
        assert_eq!(
            store.instructor(&added.id).unwrap().bio.as_deref(),
            Some("Cell biologist")
        );

        assert!(store.delete_instructor(&added.id).found);
        assert!(!store.delete_instructor(&added.id).found);
        let stored: Vec<Instructor> = store.storage().load("instructors", Vec::new());
        assert_eq!(stored, sample_instructors());
    }

    #[test]
    fn add_form_stamps_metadata() {
        let mut store = seeded_store();
        let form = store.add_feedback_form(course_form("1"));
        assert!(form.is_active);
        assert!(!form.id.is_empty());
        assert!(form.created_at <= Utc::now());

        let stored: Vec<FeedbackForm> = store.storage().load("feedbackForms", Vec::new());
        assert_eq!(stored, vec![form]);
    }

    #[test]
    fn update_form_replaces_by_id() {
        let mut store = seeded_store();
        let mut form = store.add_feedback_form(course_form("1"));
        form.is_active = false;
        form.title = "Closed".into();

        assert!(store.update_feedback_form(form.clone()).found);
        assert_eq!(store.form(&form.id), Some(&form));
        assert!(store.active_forms().is_empty());
    }

    #[test]
    fn deleting_a_form_keeps_its_responses() {
        let mut store = seeded_store();
        let form = store.add_feedback_form(course_form("1"));
        store.submit_feedback_response(answer(&form.id, 4));
        store.submit_feedback_response(answer(&form.id, 2));

        assert!(store.delete_feedback_form(&form.id).found);
        assert_eq!(store.feedback_responses().len(), 2);
        assert_eq!(store.orphaned_responses().len(), 2);
        assert!(store.form_for_response(&store.feedback_responses()[0]).is_none());
        assert!(store.summary_for(&form.id).is_none());

        let stored: Vec<FeedbackResponse> = store.storage().load("feedbackResponses", Vec::new());
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn responses_are_appended_in_order() {
        let mut store = seeded_store();
        let form = store.add_feedback_form(course_form("1"));
        let first = store.submit_feedback_response(answer(&form.id, 5));
        let second = store.submit_feedback_response(answer(&form.id, 3));

        assert_ne!(first.id, second.id);
        assert!(first.submitted_at <= second.submitted_at);
        let ids: Vec<&str> = store
            .feedback_responses()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

        let summary = store.summary_for(&form.id).unwrap();
        assert_eq!(summary.total_responses, 2);
        assert_eq!(
            summary.question("q-rating").unwrap().average_rating(),
            Some(4.0)
        );
        assert_eq!(store.forms_with_responses().len(), 1);
    }

    #[test]
    fn dangling_targets_resolve_to_unknown() {
        let mut store = seeded_store();
        let form = store.add_feedback_form(course_form("1"));
        assert_eq!(store.resolve_target(&form).display_name(), "Computer Science 101");

        store.delete_course("1");
        assert_eq!(store.resolve_target(&form), Target::Unknown);
        assert_eq!(store.resolve_target(&form).display_name(), "Unknown");

        let mut general = form.clone();
        general.target_type = TargetType::General;
        general.target_id = None;
        assert_eq!(store.resolve_target(&general), Target::General);

        let mut instructor = form;
        instructor.target_type = TargetType::Instructor;
        instructor.target_id = Some("3".into());
        assert!(matches!(
            store.resolve_target(&instructor),
            Target::Instructor(i) if i.name == "Dr. Williams"
        ));
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let mut store = FeedbackStore::open(Storage::new(FullBackend));
        assert!(store.courses().is_empty());

        let course = store.add_course(NewCourse {
            name: "Art 100".into(),
            ..Default::default()
        });
        assert_eq!(store.courses(), std::slice::from_ref(&course));

        let outcome = store.delete_course(&course.id);
        assert!(outcome.found);
        assert!(!outcome.persisted);
        assert!(store.courses().is_empty());
    }

    #[test]
    fn load_all_recovers_persisted_state() {
        let mut store = seeded_store();
        let form = store.add_feedback_form(course_form("1"));
        store.submit_feedback_response(answer(&form.id, 5));
        let snapshot = store.state().clone();

        store.load_all();
        assert_eq!(store.state(), &snapshot);
    }

    #[test]
    fn new_store_starts_empty_until_loaded() {
        let storage = Storage::in_memory();
        seed_defaults(&storage);
        let mut store = FeedbackStore::new(storage);
        assert!(store.courses().is_empty());
        store.load_all();
        assert_eq!(store.courses().len(), 4);
    }
}
