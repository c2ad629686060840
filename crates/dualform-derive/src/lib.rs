//! Derive macros for the capability traits of [`dualform`](https://docs.rs/dualform).
//!
//! Use them through the re-exports in `dualform`, not by depending on this crate directly.
use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod emptiness;
mod validate;

/// Derives `Emptiness` for a struct: the struct is zero if every one of its fields is zero.
///
/// Fields can be excluded with `#[emptiness(skip)]`. A struct without (non-skipped) fields is
/// always zero. Enums are not supported.
///
/// ```
/// use dualform::Emptiness;
///
/// #[derive(Default, Emptiness)]
/// struct ImageRef {
///     tag: String,
///     digest: Option<String>,
///     #[emptiness(skip)]
///     pull_policy: u8,
/// }
///
/// assert!(ImageRef::default().is_zero());
/// assert!(!ImageRef { tag: "latest".to_owned(), ..Default::default() }.is_zero());
/// ```
///
/// # Attributes
///
/// - `#[emptiness(crate_path = "...")]` overrides the path to the `dualform` crate.
/// - `#[emptiness(bound = "T: Emptiness")]` adds where predicates to the generated impl.
#[proc_macro_derive(Emptiness, attributes(emptiness))]
pub fn derive_emptiness(input: TokenStream) -> TokenStream {
    emptiness::derive(parse_macro_input!(input as DeriveInput)).into()
}

/// Derives `Validate`, validating every field (or, for enums, every field of the active variant).
///
/// Errors raised by a field are reported relative to the field name, or its index for tuple
/// fields. Fields can be excluded with `#[validate(skip)]`.
///
/// ```
/// use dualform::{Validate, Validator, ValidationError, validation::validate};
///
/// #[derive(Validate)]
/// #[validate(with = "check_range")]
/// struct Replicas {
///     min: u16,
///     max: u16,
/// }
///
/// fn check_range(replicas: &Replicas, validator: Validator) -> Result<(), ValidationError> {
///     if replicas.min > replicas.max {
///         return Err(validator.field(&"min").error_invalid("min must not exceed max"));
///     }
///     Ok(())
/// }
///
/// let err = validate(&Replicas { min: 3, max: 1 }).unwrap_err();
/// assert_eq!(err.path(), "min");
/// ```
///
/// # Attributes
///
/// - `#[validate(with = "path::to::fn")]` runs an additional check of the whole value after all
///   fields passed. The function receives `&Self` and the `Validator` of the value.
/// - `#[validate(crate_path = "...")]` overrides the path to the `dualform` crate.
/// - `#[validate(bound = "T: Validate")]` adds where predicates to the generated impl.
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    validate::derive(parse_macro_input!(input as DeriveInput)).into()
}
