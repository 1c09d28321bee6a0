//! Explicit input validation.
//!
//! Validation runs at the API boundary, before anything reaches storage, and
//! returns a typed [`ValidationFailure`] listing every violated constraint.
//! Messages follow the document-store convention clients of this API already
//! match on, e.g.
//! ``User validation failed: username: Path `username` is required.``

use thiserror::Error;

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    /// The field is absent or blank.
    Required { field: &'static str },

    /// The field is shorter than `min` characters.
    ///
    /// `value` is echoed back in the message when present; secrets leave it `None`.
    TooShort {
        field: &'static str,
        value: Option<String>,
        min: usize,
    },

    /// A numeric field is below its minimum.
    BelowMinimum {
        field: &'static str,
        value: i64,
        min: i64,
    },

    /// The value is already taken by another record.
    NotUnique { field: &'static str, value: String },
}

impl FieldViolation {
    pub fn field(&self) -> &'static str {
        match self {
            FieldViolation::Required { field }
            | FieldViolation::TooShort { field, .. }
            | FieldViolation::BelowMinimum { field, .. }
            | FieldViolation::NotUnique { field, .. } => field,
        }
    }
}

impl core::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FieldViolation::Required { field } => write!(f, "Path `{field}` is required."),
            FieldViolation::TooShort {
                field,
                value: Some(value),
                min,
            } => write!(
                f,
                "Path `{field}` (`{value}`) is shorter than the minimum allowed length ({min})."
            ),
            FieldViolation::TooShort {
                field,
                value: None,
                min,
            } => write!(
                f,
                "Path `{field}` is shorter than the minimum allowed length ({min})."
            ),
            FieldViolation::BelowMinimum { field, value, min } => write!(
                f,
                "Path `{field}` ({value}) is less than minimum allowed value ({min})."
            ),
            FieldViolation::NotUnique { field, value } => write!(
                f,
                "Error, expected `{field}` to be unique. Value: `{value}`"
            ),
        }
    }
}

/// Validation failure for one model, carrying every violation found.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{model} validation failed: {}", describe(.violations))]
pub struct ValidationFailure {
    model: &'static str,
    violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn single(model: &'static str, violation: FieldViolation) -> Self {
        Self {
            model,
            violations: vec![violation],
        }
    }

    pub fn model(&self) -> &'static str {
        self.model
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field(), v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Accumulates violations for a single model.
pub(crate) struct Validator {
    model: &'static str,
    violations: Vec<FieldViolation>,
}

impl Validator {
    pub(crate) fn new(model: &'static str) -> Self {
        Self {
            model,
            violations: Vec::new(),
        }
    }

    /// Require a non-blank string.
    ///
    /// Returns the value unchanged, or an empty string after recording a violation.
    pub(crate) fn required(&mut self, field: &'static str, value: Option<String>) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                self.violations.push(FieldViolation::Required { field });
                String::new()
            }
        }
    }

    pub(crate) fn min_length(&mut self, field: &'static str, value: &str, min: usize, echo: bool) {
        if value.chars().count() < min {
            self.violations.push(FieldViolation::TooShort {
                field,
                value: echo.then(|| value.to_string()),
                min,
            });
        }
    }

    pub(crate) fn at_least(&mut self, field: &'static str, value: i64, min: i64) {
        if value < min {
            self.violations
                .push(FieldViolation::BelowMinimum { field, value, min });
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationFailure> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure {
                model: self.model,
                violations: self.violations,
            })
        }
    }
}
