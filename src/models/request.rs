use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Class, Course, Exam, Professor, Student};

/// POST /api/v1/classes body. Carries at most one embedded exam, student and
/// professor; richer rosters are managed through PUT/PATCH.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateClassRequest {
    pub class_number: Option<String>,
    pub year: i32,
    pub semester: i32,
    pub schedule: Option<String>,
    pub course: Option<Course>,
    pub exam: Option<ExamRequest>,
    pub student: Option<Student>,
    pub professor: Option<Professor>,
}

/// Exam payload for POST and PUT on the exam sub-resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExamRequest {
    pub id: Option<String>,
    pub name: String,
    pub date: DateTime<Utc>,
    pub weight: i32,
}

impl CreateClassRequest {
    pub fn into_class(self) -> Class {
        Class {
            id: String::new(),
            class_number: self.class_number,
            year: self.year,
            semester: self.semester,
            schedule: self.schedule,
            exams: self.exam.map(ExamRequest::into_exam).into_iter().collect(),
            students: self.student.into_iter().collect(),
            professors: self.professor.into_iter().collect(),
            course: self.course,
        }
    }
}

impl ExamRequest {
    /// Build an exam, keeping a client-supplied id when it is not blank.
    pub fn into_exam(self) -> Exam {
        let mut exam = Exam {
            id: self.id.unwrap_or_default(),
            name: self.name,
            date: self.date,
            weight: self.weight,
        };
        super::ensure_id(&mut exam.id);
        exam
    }
}
