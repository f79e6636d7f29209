//! Shared types used across the flyscene crates.

pub mod color;
pub mod types;

pub use color::{Color, ParseColorError};
pub use types::{RotationOrder, Transform};
