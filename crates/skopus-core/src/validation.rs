//! Required-field validation for the draft input forms.

use std::collections::BTreeSet;
use std::fmt;

/// A form field that can be reported as missing.
pub trait FieldId: Copy + Ord + fmt::Debug {
    /// Stable identifier shown to the front end (e.g. `"clientName"`).
    fn as_str(&self) -> &'static str;
}

/// Every required field that was blank when the form was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError<F: FieldId> {
    pub missing: BTreeSet<F>,
}

impl<F: FieldId> ValidationError<F> {
    /// Field identifiers in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.missing.iter().map(FieldId::as_str).collect()
    }
}

impl<F: FieldId> fmt::Display for ValidationError<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing required fields: {}",
            self.field_names().join(", ")
        )
    }
}

impl<F: FieldId> std::error::Error for ValidationError<F> {}

/// Collects the fields whose value is empty after trimming.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every blank field.
pub fn require_filled<'a, F, I>(fields: I) -> Result<(), ValidationError<F>>
where
    F: FieldId,
    I: IntoIterator<Item = (F, &'a str)>,
{
    let missing: BTreeSet<F> = fields
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}
