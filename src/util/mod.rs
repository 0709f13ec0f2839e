//! Utility types shared by the builder and its adapters.
//!
//! - [`Aabb`] - Bounding box algebra over `glam` vectors
//! - [`Error`] / [`Result`] - Error handling

mod error;
mod math;

pub use error::*;
pub use math::*;
