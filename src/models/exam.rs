use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patch::{coerce, PatchField, Patchable};

/// A weighted assessment embedded in exactly one class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub weight: i32,
}

impl Exam {
    /// Full replacement used by PUT: everything but the identifier.
    pub fn replace_contents(&mut self, name: String, date: DateTime<Utc>, weight: i32) {
        self.name = name;
        self.date = date;
        self.weight = weight;
    }
}

static EXAM_FIELDS: &[PatchField<Exam>] = &[
    PatchField::read_only("id"),
    PatchField::writable("name", |exam, value| {
        exam.name = coerce::scalar(value)?;
        Ok(())
    }),
    PatchField::writable("date", |exam, value| {
        exam.date = coerce::scalar(value)?;
        Ok(())
    }),
    PatchField::writable("weight", |exam, value| {
        exam.weight = coerce::scalar(value)?;
        Ok(())
    }),
];

impl Patchable for Exam {
    fn patch_fields() -> &'static [PatchField<Self>] {
        EXAM_FIELDS
    }
}
