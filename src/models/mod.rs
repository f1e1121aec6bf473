pub mod class;
pub mod exam;
pub mod reference;
pub mod request;

pub use class::Class;
pub use exam::Exam;
pub use reference::{Course, Professor, Student};
pub use request::{CreateClassRequest, ExamRequest};

/// Generate a fresh server-side identifier (UUID v4, hyphenated text).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fill `id` with a generated identifier when it is empty or whitespace.
/// Identifiers that are already set are never replaced.
pub fn ensure_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = new_id();
    }
}
