//! The course and instructor admin commands (`feedback add-course`,
//! `update-course`, `delete-course`, and their instructor counterparts).

use anyhow::{Context, Result};

use feedback_core::model::{NewCourse, NewInstructor, TargetType};
use feedback_core::{CommandOutcome, FeedbackStore};

use crate::{CourseFields, GlobalArgs, InstructorFields};

fn required(field: &str, value: Option<String>) -> Result<String> {
    let value = value.with_context(|| format!("--{field} is required"))?;
    anyhow::ensure!(!value.trim().is_empty(), "{field} must not be empty");
    Ok(value)
}

fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>> {
    if let Some(v) = &value {
        anyhow::ensure!(!v.trim().is_empty(), "{field} must not be empty");
    }
    Ok(value)
}

/// Forms that will point at nothing once the target is gone.
fn dependent_forms(store: &FeedbackStore, target_type: TargetType, id: &str) -> usize {
    store
        .feedback_forms()
        .iter()
        .filter(|f| f.target_type == target_type && f.target_id.as_deref() == Some(id))
        .count()
}

fn report_outcome(kind: &str, id: &str, outcome: CommandOutcome, action: &str) {
    println!("{action} {kind} {id}");
    if !outcome.persisted {
        println!("Warning: change could not be saved to disk.");
    }
}

// -- courses ------------------------------------------------------------------

pub fn add_course(global: &GlobalArgs, fields: CourseFields) -> Result<()> {
    let data = NewCourse {
        name: required("name", fields.name)?,
        instructor: required("instructor", fields.instructor)?,
        department: required("department", fields.department)?,
        description: fields.description,
    };
    let (_, mut store) = super::open_store(global)?;

    let course = store.add_course(data);
    println!("Created course {} ({})", course.id, course.name);
    Ok(())
}

pub fn update_course(global: &GlobalArgs, id: &str, fields: CourseFields) -> Result<()> {
    let (_, mut store) = super::open_store(global)?;
    let mut course = store
        .course(id)
        .cloned()
        .with_context(|| format!("course not found: {id}"))?;

    if let Some(name) = non_blank("name", fields.name)? {
        course.name = name;
    }
    if let Some(instructor) = non_blank("instructor", fields.instructor)? {
        course.instructor = instructor;
    }
    if let Some(department) = non_blank("department", fields.department)? {
        course.department = department;
    }
    if fields.description.is_some() {
        course.description = fields.description;
    }

    let outcome = store.update_course(course);
    report_outcome("course", id, outcome, "Updated");
    Ok(())
}

pub fn delete_course(global: &GlobalArgs, id: &str) -> Result<()> {
    let (_, mut store) = super::open_store(global)?;
    let dependents = dependent_forms(&store, TargetType::Course, id);

    let outcome = store.delete_course(id);
    if !outcome.found {
        println!("No course with id {id}; nothing deleted.");
        return Ok(());
    }

    report_outcome("course", id, outcome, "Deleted");
    if dependents > 0 {
        println!("{dependents} form(s) now target an unknown course.");
    }
    Ok(())
}

// -- instructors --------------------------------------------------------------

pub fn add_instructor(global: &GlobalArgs, fields: InstructorFields) -> Result<()> {
    let data = NewInstructor {
        name: required("name", fields.name)?,
        department: required("department", fields.department)?,
        email: required("email", fields.email)?,
        bio: fields.bio,
    };
    let (_, mut store) = super::open_store(global)?;

    let instructor = store.add_instructor(data);
    println!("Created instructor {} ({})", instructor.id, instructor.name);
    Ok(())
}

pub fn update_instructor(global: &GlobalArgs, id: &str, fields: InstructorFields) -> Result<()> {
    let (_, mut store) = super::open_store(global)?;
    let mut instructor = store
        .instructor(id)
        .cloned()
        .with_context(|| format!("instructor not found: {id}"))?;

    if let Some(name) = non_blank("name", fields.name)? {
        instructor.name = name;
    }
    if let Some(department) = non_blank("department", fields.department)? {
        instructor.department = department;
    }
    if let Some(email) = non_blank("email", fields.email)? {
        instructor.email = email;
    }
    if fields.bio.is_some() {
        instructor.bio = fields.bio;
    }

    let outcome = store.update_instructor(instructor);
    report_outcome("instructor", id, outcome, "Updated");
    Ok(())
}

pub fn delete_instructor(global: &GlobalArgs, id: &str) -> Result<()> {
    let (_, mut store) = super::open_store(global)?;
    let dependents = dependent_forms(&store, TargetType::Instructor, id);

    let outcome = store.delete_instructor(id);
    if !outcome.found {
        println!("No instructor with id {id}; nothing deleted.");
        return Ok(());
    }

    report_outcome("instructor", id, outcome, "Deleted");
    if dependents > 0 {
        println!("{dependents} form(s) now target an unknown instructor.");
    }
    Ok(())
}
