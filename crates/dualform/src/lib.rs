//! Decode configuration values that can be written in two different shapes.
//!
//! Configuration formats love shorthands. A container image can be `nginx:1.27`, or it can be
//!
//! ```yaml
//! image:
//!   name: nginx
//!   tag: "1.27"
//!   pullPolicy: Always
//! ```
//!
//! Both mean (roughly) the same thing, and users expect to be able to write either. This crate
//! provides [`BasicOrAdvanced`], a container that decodes whichever of the two shapes was written
//! into one typed handle. Decoding first tries the terse *basic* shape and only falls back to the
//! structured *advanced* shape if the basic one cannot be decoded or turns out to be empty.
//!
//! Whether a value is "empty" and whether it is "valid" are optional capabilities, expressed by
//! the [`Emptiness`] and [`Validate`] traits in [`capability`]. Both can be derived for structs.
//!
//! The [`yaml`] module contains helpers for reading documents and writing them back.

pub mod capability;
pub mod pair;
pub mod validation;
pub mod yaml;

pub use capability::{Emptiness, Validate};
pub use pair::{BasicOrAdvanced, DecodeError, EncodeError, Shape};
pub use validation::{ValidationError, Validator};
