//! The two optional capabilities a value embedded in a [`BasicOrAdvanced`] may provide.
//!
//! Both traits come with default methods, so opting in is a one-liner for types that have nothing
//! interesting to say (`impl Emptiness for Foo {}`), while types with a meaningful notion of
//! "empty" or "invalid" override the respective method. Structs can derive either trait, see
//! [`derive@Emptiness`] and [`derive@Validate`].
//!
//! [`BasicOrAdvanced`]: crate::BasicOrAdvanced
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt::Display,
};

pub use dualform_derive::{Emptiness, Validate};

use crate::validation::{ValidationError, Validator};

/// A value that can report whether it is semantically absent.
///
/// Decoding a [`BasicOrAdvanced`](crate::BasicOrAdvanced) only accepts the basic shape if it
/// decoded to a value that is *not* zero, and otherwise falls back to the advanced shape.
///
/// The default implementation never considers a value to be zero: if a type cannot tell, whatever
/// was decoded is trusted to be present.
///
/// # Example
///
/// ```
/// use dualform::capability::Emptiness;
///
/// struct Replicas(u16);
///
/// impl Emptiness for Replicas {
///     fn is_zero(&self) -> bool {
///         self.0 == 0
///     }
/// }
///
/// assert!(Replicas(0).is_zero());
/// assert!("".is_zero());
/// assert!(!0u16.is_zero());
/// ```
pub trait Emptiness {
    /// Returns `true` if `self` holds nothing meaningful.
    fn is_zero(&self) -> bool {
        false
    }
}

/// A value that can check itself for internal consistency.
///
/// The default implementation accepts every value.
pub trait Validate {
    /// Validates `self`, reporting problems relative to the field tracked by `validator`.
    fn validate(&self, validator: Validator) -> Result<(), ValidationError> {
        let _ = validator;
        Ok(())
    }
}

/// Implements both capabilities with their defaults for leaf types that are never empty.
macro_rules! never_zero {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Emptiness for $ty {}
            impl Validate for $ty {}
        )*
    };
}

never_zero!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char,
);

impl Emptiness for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl Validate for String {}

impl Emptiness for str {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl Validate for str {}

impl<T: Emptiness + ?Sized> Emptiness for &T {
    fn is_zero(&self) -> bool {
        T::is_zero(self)
    }
}
impl<T: Validate + ?Sized> Validate for &T {
    fn validate(&self, validator: Validator) -> Result<(), ValidationError> {
        T::validate(self, validator)
    }
}

impl<T: Emptiness + ?Sized> Emptiness for Box<T> {
    fn is_zero(&self) -> bool {
        T::is_zero(self)
    }
}
impl<T: Validate + ?Sized> Validate for Box<T> {
    fn validate(&self, validator: Validator) -> Result<(), ValidationError> {
        T::validate(self, validator)
    }
}

impl<T> Emptiness for Option<T> {
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}
impl<T: Validate> Validate for Option<T> {
    fn validate(&self, validator: Validator) -> Result<(), ValidationError> {
        match self {
            Some(value) => value.validate(validator),
            None => Ok(()),
        }
    }
}

impl<T> Emptiness for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl<T: Validate> Validate for Vec<T> {
    fn validate(&self, validator: Validator) -> Result<(), ValidationError> {
        validate_items(self.iter().enumerate(), validator)
    }
}

impl<T> Emptiness for BTreeSet<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl<T> Validate for BTreeSet<T> {}

impl<T, S> Emptiness for HashSet<T, S> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl<T, S> Validate for HashSet<T, S> {}

impl<K, V> Emptiness for BTreeMap<K, V> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl<K: Display, V: Validate> Validate for BTreeMap<K, V> {
    fn validate(&self, validator: Validator) -> Result<(), ValidationError> {
        validate_items(self.iter(), validator)
    }
}

impl<K, V, S> Emptiness for HashMap<K, V, S> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl<K: Display, V: Validate, S> Validate for HashMap<K, V, S> {
    fn validate(&self, validator: Validator) -> Result<(), ValidationError> {
        validate_items(self.iter(), validator)
    }
}

impl Emptiness for serde_yaml::Value {
    fn is_zero(&self) -> bool {
        self.is_null()
    }
}
impl Validate for serde_yaml::Value {}

impl Emptiness for serde_yaml::Mapping {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl Validate for serde_yaml::Mapping {}

impl Emptiness for serde_json::Value {
    fn is_zero(&self) -> bool {
        self.is_null()
    }
}
impl Validate for serde_json::Value {}

impl Emptiness for serde_json::Map<String, serde_json::Value> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
impl Validate for serde_json::Map<String, serde_json::Value> {}

fn validate_items<'v, K, V>(
    items: impl IntoIterator<Item = (K, &'v V)>,
    validator: Validator,
) -> Result<(), ValidationError>
where
    K: Display,
    V: Validate + 'v,
{
    for (key, value) in items {
        value.validate(validator.field(&key))?;
    }
    Ok(())
}
