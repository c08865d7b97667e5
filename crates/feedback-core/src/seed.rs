//! First-run initialization of the persisted collections.

use crate::model::{Course, FeedbackForm, FeedbackResponse, Instructor};
use crate::storage::{Collection, Storage};

/// The fixed sample courses written on first run.
pub fn sample_courses() -> Vec<Course> {
    [
        ("1", "Computer Science 101", "Dr. Smith", "Computer Science"),
        ("2", "Mathematics 201", "Prof. Johnson", "Mathematics"),
        ("3", "Physics 150", "Dr. Williams", "Physics"),
        ("4", "Chemistry 120", "Prof. Brown", "Chemistry"),
    ]
    .into_iter()
    .map(|(id, name, instructor, department)| Course {
        id: id.into(),
        name: name.into(),
        instructor: instructor.into(),
        department: department.into(),
        description: None,
    })
    .collect()
}

/// The fixed sample instructors written on first run.
pub fn sample_instructors() -> Vec<Instructor> {
    [
        ("1", "Dr. Smith", "Computer Science", "smith@university.edu"),
        ("2", "Prof. Johnson", "Mathematics", "johnson@university.edu"),
        ("3", "Dr. Williams", "Physics", "williams@university.edu"),
        ("4", "Prof. Brown", "Chemistry", "brown@university.edu"),
    ]
    .into_iter()
    .map(|(id, name, department, email)| Instructor {
        id: id.into(),
        name: name.into(),
        department: department.into(),
        email: email.into(),
        bio: None,
    })
    .collect()
}

/// Which collections a seeding pass initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub initialized: Vec<Collection>,
    /// Collections that could not be checked, or were missing but could not
    /// be written.
    pub failed: Vec<Collection>,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        self.initialized.is_empty() && self.failed.is_empty()
    }
}

/// Initialize every collection that has no stored value.
///
/// Courses and instructors get the sample data; forms and responses get an
/// empty array. Existing entries, including unparseable ones, are never
/// overwritten, so this is safe to run on every startup. A collection whose
/// presence cannot be determined is skipped and reported as failed.
pub fn seed_defaults(storage: &Storage) -> SeedReport {
    let mut report = SeedReport::default();

    for collection in Collection::ALL {
        let key = collection.key();
        match storage.contains(key) {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("could not check '{key}', leaving it untouched: {e}");
                report.failed.push(collection);
                continue;
            }
        }

        let result = match collection {
            Collection::Courses => storage.save(key, &sample_courses()),
            Collection::Instructors => storage.save(key, &sample_instructors()),
            Collection::FeedbackForms => storage.save(key, &Vec::<FeedbackForm>::new()),
            Collection::FeedbackResponses => storage.save(key, &Vec::<FeedbackResponse>::new()),
        };

        match result {
            Ok(()) => report.initialized.push(collection),
            Err(e) => {
                tracing::warn!("could not seed '{key}': {e}");
                report.failed.push(collection);
            }
        }
    }

    if !report.initialized.is_empty() {
        let names: Vec<&str> = report.initialized.iter().map(|c| c.key()).collect();
        tracing::info!("seeded default data: {}", names.join(", "));
    }

    report
}
