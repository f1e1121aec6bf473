//! Partial updates driven by loosely-typed JSON maps.
//!
//! Every patchable type publishes a table of [`PatchField`]s: a field name and
//! a typed setter that coerces the raw JSON value. [`apply_patch`] walks the
//! client map, matches keys case-insensitively against that table and runs the
//! setters. Unknown keys, read-only fields and values that fail to coerce are
//! dropped one by one; the rest of the map is still applied.

pub mod coerce;

use serde_json::{Map, Value};

pub use coerce::CoerceError;

/// A PATCH body: field name to raw value, in the order the client sent them.
pub type PatchDocument = Map<String, Value>;

/// Typed setter for one field. Returns an error when the value cannot be
/// coerced; the target must be left untouched in that case.
pub type FieldSetter<T> = fn(&mut T, &Value) -> Result<(), CoerceError>;

pub struct PatchField<T: 'static> {
    pub name: &'static str,
    setter: Option<FieldSetter<T>>,
}

impl<T: 'static> PatchField<T> {
    pub const fn writable(name: &'static str, setter: FieldSetter<T>) -> Self {
        Self {
            name,
            setter: Some(setter),
        }
    }

    /// A field that exists on the type but can never be patched.
    pub const fn read_only(name: &'static str) -> Self {
        Self { name, setter: None }
    }
}

pub trait Patchable: Sized + 'static {
    fn patch_fields() -> &'static [PatchField<Self>];

    fn patch_field(name: &str) -> Option<&'static PatchField<Self>> {
        Self::patch_fields()
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }
}

/// Apply `updates` onto `target` in place.
///
/// Never fails: each entry either lands on its field or is skipped.
pub fn apply_patch<T: Patchable>(target: &mut T, updates: &PatchDocument) {
    for (key, value) in updates {
        let Some(field) = T::patch_field(key) else {
            tracing::debug!("patch: no field named '{}', skipping", key);
            continue;
        };

        let Some(setter) = field.setter else {
            tracing::debug!("patch: field '{}' is read-only, skipping", field.name);
            continue;
        };

        if let Err(e) = setter(target, value) {
            tracing::debug!("patch: could not set '{}': {}", field.name, e);
        }
    }
}
