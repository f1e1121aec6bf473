use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{ensure_id, Course, Exam, Professor, Student};
use crate::patch::{coerce, CoerceError, PatchField, Patchable};

/// A scheduled course offering: term, schedule, exams and roster.
///
/// Stored as one document per class; exams are embedded and go away with the
/// class, while students, professors and the course are references by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Class {
    pub id: String,
    pub class_number: Option<String>,
    pub year: i32,
    pub semester: i32,
    pub schedule: Option<String>,
    pub exams: Vec<Exam>,
    pub students: Vec<Student>,
    pub professors: Vec<Professor>,
    pub course: Option<Course>,
}

impl Class {
    /// Assign server-generated identifiers to the class and to every nested
    /// exam, student, professor and course that arrived without one.
    pub fn assign_missing_ids(&mut self) {
        ensure_id(&mut self.id);
        for exam in &mut self.exams {
            ensure_id(&mut exam.id);
        }
        for student in &mut self.students {
            ensure_id(&mut student.id);
        }
        for professor in &mut self.professors {
            ensure_id(&mut professor.id);
        }
        if let Some(course) = self.course.as_mut() {
            ensure_id(&mut course.id);
        }
    }

    /// First exam identifier that appears more than once, if any.
    pub fn duplicate_exam_id(&self) -> Option<&str> {
        first_duplicate(&self.exams)
    }

    pub fn find_exam(&self, exam_id: &str) -> Option<&Exam> {
        self.exams.iter().find(|e| e.id == exam_id)
    }

    pub fn find_exam_mut(&mut self, exam_id: &str) -> Option<&mut Exam> {
        self.exams.iter_mut().find(|e| e.id == exam_id)
    }

    /// Remove an exam by id; returns it when present.
    pub fn remove_exam(&mut self, exam_id: &str) -> Option<Exam> {
        let index = self.exams.iter().position(|e| e.id == exam_id)?;
        Some(self.exams.remove(index))
    }

    pub fn course_id(&self) -> Option<&str> {
        self.course.as_ref().map(|c| c.id.as_str())
    }
}

fn first_duplicate(exams: &[Exam]) -> Option<&str> {
    let mut seen = HashSet::new();
    exams
        .iter()
        .map(|e| e.id.as_str())
        .filter(|id| !id.trim().is_empty())
        .find(|id| !seen.insert(*id))
}

static CLASS_FIELDS: &[PatchField<Class>] = &[
    PatchField::read_only("id"),
    PatchField::writable("classNumber", |class, value| {
        class.class_number = coerce::scalar(value)?;
        Ok(())
    }),
    PatchField::writable("year", |class, value| {
        class.year = coerce::scalar(value)?;
        Ok(())
    }),
    PatchField::writable("semester", |class, value| {
        class.semester = coerce::scalar(value)?;
        Ok(())
    }),
    PatchField::writable("schedule", |class, value| {
        class.schedule = coerce::scalar(value)?;
        Ok(())
    }),
    PatchField::writable("exams", |class, value| {
        let exams: Vec<Exam> = coerce::structured(value)?;
        if let Some(id) = first_duplicate(&exams) {
            return Err(CoerceError::Rejected(format!("duplicate exam id '{}'", id)));
        }
        class.exams = exams;
        Ok(())
    }),
    PatchField::writable("students", |class, value| {
        class.students = coerce::structured(value)?;
        Ok(())
    }),
    PatchField::writable("professors", |class, value| {
        class.professors = coerce::structured(value)?;
        Ok(())
    }),
    PatchField::writable("course", |class, value| {
        class.course = coerce::structured(value)?;
        Ok(())
    }),
];

impl Patchable for Class {
    fn patch_fields() -> &'static [PatchField<Self>] {
        CLASS_FIELDS
    }
}
