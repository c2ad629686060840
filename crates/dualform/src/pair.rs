//! The [`BasicOrAdvanced`] container and its decoding rules.
use std::{any::type_name, borrow::Cow};

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use snafu::{ResultExt, Snafu};
use strum::{AsRefStr, Display};
use tracing::{debug, trace};

use crate::{
    capability::{Emptiness, Validate},
    validation::{self, ValidationError, Validator},
};

/// Identifies which of the two shapes of a [`BasicOrAdvanced`] is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Shape {
    Basic,
    Advanced,
}

#[derive(Debug, Snafu)]
pub enum DecodeError {
    #[snafu(display("failed to decode node as the basic shape"))]
    DecodeBasic { source: serde_yaml::Error },

    #[snafu(display("failed to decode node as the advanced shape"))]
    DecodeAdvanced { source: serde_yaml::Error },
}

impl DecodeError {
    /// The shape whose decode attempt is reported by this error.
    pub fn shape(&self) -> Shape {
        match self {
            Self::DecodeBasic { .. } => Shape::Basic,
            Self::DecodeAdvanced { .. } => Shape::Advanced,
        }
    }

    /// Returns the underlying document error.
    pub fn into_source(self) -> serde_yaml::Error {
        match self {
            Self::DecodeBasic { source } | Self::DecodeAdvanced { source } => source,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("failed to encode {shape} shape as document node"))]
pub struct EncodeError {
    source: serde_yaml::Error,
    shape: Shape,
}

/// A configuration value that is written either in a terse *basic* form or in a structured
/// *advanced* form.
///
/// Configuration schemas often accept a shorthand next to the full object for the same field,
/// for example an image that is either `nginx:1.27` or `{ name: nginx, tag: "1.27", pullPolicy: Always }`.
/// `BasicOrAdvanced` decodes whichever of the two was written, without the caller having to
/// declare it up front:
///
/// 1. The node is decoded as `B`. If that succeeds and the value is not [zero](Emptiness::is_zero),
///    the basic shape wins, even if the node would also decode as `A`.
/// 2. Otherwise the node is decoded as `A`, which wins if it is not zero either.
/// 3. Otherwise the container stays [`Empty`](Self::Empty). If one of the attempts failed, the
///    error of the basic attempt is preferred over the one of the advanced attempt. If both
///    attempts produced zero values, the node was explicitly empty and no error is raised.
///
/// Serialization is transparent: an active value is written exactly like the bare value would be,
/// an empty container is written as `null`.
///
/// # Example
///
/// ```
/// use dualform::{BasicOrAdvanced, Emptiness};
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize, Emptiness)]
/// struct ImageRef {
///     #[serde(default)]
///     tag: String,
///     #[serde(default)]
///     digest: String,
/// }
///
/// #[derive(Deserialize)]
/// struct Service {
///     image: BasicOrAdvanced<String, ImageRef>,
/// }
///
/// let service: Service = serde_yaml::from_str("image: latest").unwrap();
/// assert_eq!(service.image.basic().map(String::as_str), Some("latest"));
///
/// let service: Service =
///     serde_yaml::from_str("image: { tag: latest, digest: 'sha256:abc' }").unwrap();
/// assert!(service.image.is_advanced());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BasicOrAdvanced<B, A> {
    /// Neither shape is set, either because nothing was decoded yet or because the decoded node
    /// was explicitly empty.
    Empty,

    /// The terse shape.
    Basic(B),

    /// The structured shape.
    Advanced(A),
}

// Not derived, the derive would require `B: Default` and `A: Default`.
impl<B, A> Default for BasicOrAdvanced<B, A> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<B, A> BasicOrAdvanced<B, A> {
    /// Creates an empty container.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Wraps a value that is already known to be in the basic shape.
    pub fn from_basic(value: B) -> Self {
        Self::Basic(value)
    }

    /// Wraps a value that is already known to be in the advanced shape.
    pub fn from_advanced(value: A) -> Self {
        Self::Advanced(value)
    }

    /// Returns the active shape, or [`None`] if the container is empty.
    pub fn shape(&self) -> Option<Shape> {
        match self {
            Self::Empty => None,
            Self::Basic(_) => Some(Shape::Basic),
            Self::Advanced(_) => Some(Shape::Advanced),
        }
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced(_))
    }

    /// Returns `true` if neither shape is active.
    ///
    /// Unlike [`is_empty`](Self::is_empty) this does not look into the active value, which makes
    /// it usable with `#[serde(skip_serializing_if = "BasicOrAdvanced::is_unset")]`.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn basic(&self) -> Option<&B> {
        match self {
            Self::Basic(value) => Some(value),
            _ => None,
        }
    }

    pub fn advanced(&self) -> Option<&A> {
        match self {
            Self::Advanced(value) => Some(value),
            _ => None,
        }
    }

    pub fn basic_mut(&mut self) -> Option<&mut B> {
        match self {
            Self::Basic(value) => Some(value),
            _ => None,
        }
    }

    pub fn advanced_mut(&mut self) -> Option<&mut A> {
        match self {
            Self::Advanced(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_basic(self) -> Option<B> {
        match self {
            Self::Basic(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_advanced(self) -> Option<A> {
        match self {
            Self::Advanced(value) => Some(value),
            _ => None,
        }
    }

    /// Converts from `&BasicOrAdvanced<B, A>` to `BasicOrAdvanced<&B, &A>`.
    pub fn as_ref(&self) -> BasicOrAdvanced<&B, &A> {
        match self {
            Self::Empty => BasicOrAdvanced::Empty,
            Self::Basic(value) => BasicOrAdvanced::Basic(value),
            Self::Advanced(value) => BasicOrAdvanced::Advanced(value),
        }
    }

    /// Takes the value out of the container, leaving it empty.
    pub fn take(&mut self) -> Self {
        std::mem::replace(self, Self::Empty)
    }
}

impl<B, A> BasicOrAdvanced<B, A>
where
    B: DeserializeOwned + Emptiness,
    A: DeserializeOwned + Emptiness,
{
    /// Decodes a new container from `node`.
    ///
    /// See [`decode`](Self::decode) for the rules that decide which shape becomes active.
    pub fn from_node(node: &serde_yaml::Value) -> Result<Self, DecodeError> {
        let mut pair = Self::Empty;
        pair.decode(node)?;
        Ok(pair)
    }

    /// Decodes `node` into `self`, replacing whatever was stored before.
    ///
    /// The container is reset first, so a failed decode always leaves it empty and nothing of a
    /// previous decode survives. A `null` node is explicitly empty and yields an empty container
    /// without an error.
    pub fn decode(&mut self, node: &serde_yaml::Value) -> Result<(), DecodeError> {
        *self = Self::Empty;

        if node.is_null() {
            trace!("node is null, leaving container empty");
            return Ok(());
        }

        let basic_error = match B::deserialize(node) {
            Ok(basic) if !basic.is_zero() => {
                trace!(basic = type_name::<B>(), "decoded node as basic shape");
                *self = Self::Basic(basic);
                return Ok(());
            }
            Ok(_) => {
                debug!(
                    basic = type_name::<B>(),
                    "basic shape decoded to a zero value, falling back to advanced shape"
                );
                None
            }
            Err(err) => {
                debug!(
                    basic = type_name::<B>(),
                    error = %err,
                    "failed to decode basic shape, falling back to advanced shape"
                );
                Some(err)
            }
        };

        let advanced_error = match A::deserialize(node) {
            Ok(advanced) if !advanced.is_zero() => {
                trace!(advanced = type_name::<A>(), "decoded node as advanced shape");
                *self = Self::Advanced(advanced);
                return Ok(());
            }
            Ok(_) => None,
            Err(err) => Some(err),
        };

        match (basic_error, advanced_error) {
            (Some(source), _) => Err(source).context(DecodeBasicSnafu),
            (None, Some(source)) => Err(source).context(DecodeAdvancedSnafu),
            (None, None) => {
                trace!("both shapes decoded to zero values, leaving container empty");
                Ok(())
            }
        }
    }
}

impl<B, A> BasicOrAdvanced<B, A>
where
    B: Serialize,
    A: Serialize,
{
    /// Encodes the active value as a document node, or `null` if the container is empty.
    pub fn encode(&self) -> Result<serde_yaml::Value, EncodeError> {
        match self {
            Self::Empty => Ok(serde_yaml::Value::Null),
            Self::Basic(value) => serde_yaml::to_value(value).context(EncodeSnafu {
                shape: Shape::Basic,
            }),
            Self::Advanced(value) => serde_yaml::to_value(value).context(EncodeSnafu {
                shape: Shape::Advanced,
            }),
        }
    }
}

impl<B, A> BasicOrAdvanced<B, A>
where
    B: Emptiness,
    A: Emptiness,
{
    /// Returns `true` if no shape is active, or if the active value reports itself as zero.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Basic(value) => value.is_zero(),
            Self::Advanced(value) => value.is_zero(),
        }
    }
}

impl<B, A> BasicOrAdvanced<B, A>
where
    B: Validate,
    A: Validate,
{
    /// Validates the active value. An empty container is always valid.
    ///
    /// Errors of the active value are returned as they are.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}

impl<B: Emptiness, A: Emptiness> Emptiness for BasicOrAdvanced<B, A> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<B: Validate, A: Validate> Validate for BasicOrAdvanced<B, A> {
    fn validate(&self, validator: Validator) -> Result<(), ValidationError> {
        match self {
            Self::Empty => Ok(()),
            Self::Basic(value) => Validate::validate(value, validator),
            Self::Advanced(value) => Validate::validate(value, validator),
        }
    }
}

impl<B: Serialize, A: Serialize> Serialize for BasicOrAdvanced<B, A> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Basic(value) => value.serialize(serializer),
            Self::Advanced(value) => value.serialize(serializer),
        }
    }
}

impl<'de, B, A> Deserialize<'de> for BasicOrAdvanced<B, A>
where
    B: DeserializeOwned + Emptiness,
    A: DeserializeOwned + Emptiness,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let node = serde_yaml::Value::deserialize(deserializer)?;
        Self::from_node(&node).map_err(|err| serde::de::Error::custom(err.into_source()))
    }
}

impl<B: JsonSchema, A: JsonSchema> JsonSchema for BasicOrAdvanced<B, A> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        format!(
            "BasicOrAdvanced_for_{basic}_and_{advanced}",
            basic = B::schema_name(),
            advanced = A::schema_name()
        )
        .into()
    }

    fn schema_id() -> Cow<'static, str> {
        format!(
            "dualform::BasicOrAdvanced<{basic}, {advanced}>",
            basic = B::schema_id(),
            advanced = A::schema_id()
        )
        .into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "anyOf": [
                generator.subschema_for::<B>(),
                generator.subschema_for::<A>(),
            ]
        })
    }
}
