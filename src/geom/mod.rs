//! Geometry consumed by the builder and the reference traversal.
//!
//! - [`Triangle`] - The input primitive
//! - [`Ray`] - Slab and Möller–Trumbore tests
//! - [`load_obj`] - OBJ file adapter (feature `obj`)

mod ray;
mod triangle;

#[cfg(feature = "obj")]
mod obj;

pub use ray::*;
pub use triangle::*;

#[cfg(feature = "obj")]
pub use obj::load_obj;
