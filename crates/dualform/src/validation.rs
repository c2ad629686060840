//! Validation context shared by every [`Validate`] implementation.
//!
//! A [`Validator`] remembers which field is currently being checked, so that errors raised deep
//! inside nested configuration can point at the offending key (for example `image.digest`).
use std::fmt::{Display, Write};

use snafu::Snafu;

use crate::capability::Validate;

/// Contains context used for generating validation errors
///
/// Constructed internally in [`validate`]
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    ident: Option<&'a dyn Display>,
    parent: Option<&'a Validator<'a>>,
}

impl<'a> Validator<'a> {
    /// Creates a `Validator` for a subfield of the current object
    pub fn field<'b>(&'b self, ident: &'b dyn Display) -> Validator<'b> {
        Validator {
            ident: Some(ident),
            parent: Some(self),
        }
    }

    fn error_problem(self, problem: ValidationProblem) -> ValidationError {
        let mut idents = Vec::new();
        let mut curr = Some(&self);
        while let Some(curr_some) = curr {
            if let Some(ident) = curr_some.ident {
                idents.push(ident.to_string());
            }
            curr = curr_some.parent;
        }
        ValidationError {
            path: FieldPath { idents },
            problem,
        }
    }

    /// Returns an error indicating that the `Validator` refers to a required field that is currently not provided
    pub fn error_required(self) -> ValidationError {
        self.error_problem(ValidationProblem::FieldRequired)
    }

    /// Returns an error indicating that the value at this field violates a constraint
    pub fn error_invalid(self, reason: impl Into<String>) -> ValidationError {
        self.error_problem(ValidationProblem::Invalid {
            reason: reason.into(),
        })
    }

    /// Returns an error wrapping a lower-level error raised while checking this field
    pub fn error_custom(
        self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> ValidationError {
        self.error_problem(ValidationProblem::Custom {
            source: source.into(),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
struct FieldPath {
    idents: Vec<String>,
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.idents.is_empty() {
            return f.write_str("<root>");
        }

        for (i, ident) in self.idents.iter().rev().enumerate() {
            if i > 0 {
                f.write_char('.')?;
            }
            f.write_str(ident)?;
        }
        Ok(())
    }
}

/// An error that occurred when validating an object.
///
/// It is constructed by calling one of the `error_*` methods on [`Validator`], such as [`Validator::error_required`].
#[derive(Debug, Snafu)]
#[snafu(display("failed to validate {path}"))]
pub struct ValidationError {
    path: FieldPath,
    #[snafu(source)]
    problem: ValidationProblem,
}

impl ValidationError {
    /// The dotted path of the field that failed validation, `<root>` for the top-level value.
    pub fn path(&self) -> String {
        self.path.to_string()
    }

    /// Returns `true` if the error was raised because a required field is missing.
    pub fn is_required(&self) -> bool {
        matches!(self.problem, ValidationProblem::FieldRequired)
    }
}

/// A problem that was discovered during validation, with no additional context.
#[derive(Debug, Snafu)]
enum ValidationProblem {
    #[snafu(display("field is required"))]
    FieldRequired,

    #[snafu(display("{reason}"))]
    Invalid { reason: String },

    #[snafu(display("field is invalid"))]
    Custom {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Validates `value` (and everything nested inside of it), starting at the root path.
pub fn validate<T: Validate + ?Sized>(value: &T) -> Result<(), ValidationError> {
    value.validate(Validator {
        ident: None,
        parent: None,
    })
}
