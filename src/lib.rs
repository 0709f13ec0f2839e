//! # flatbvh
//!
//! Bounding volume hierarchy builder for triangle meshes, producing a flat
//! node array that a GPU kernel can traverse without a stack.
//!
//! Each packed node carries its box, a primitive id (`-1` for internal
//! nodes) and a "miss" index: where to continue when the ray misses the box
//! or after a leaf is tested. Descending is always a step to the next slot.
//!
//! ## Modules
//!
//! - [`util`] - Bounding box algebra, errors
//! - [`geom`] - Triangles, rays, OBJ loading
//! - [`bvh`] - Builder, flattener, packer and reference traversal
//!
//! ## Example
//!
//! ```
//! use flatbvh::prelude::*;
//!
//! let triangles = vec![
//!     Triangle::from([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
//!     Triangle::from([[4.0, 0.0, 0.0], [5.0, 0.0, 0.0], [4.0, 1.0, 0.0]]),
//! ];
//! let bvh = Bvh::build(&triangles)?;
//! assert_eq!(bvh.len(), 3);
//!
//! let upload: &[u8] = bvh.as_bytes();
//! assert_eq!(upload.len(), 3 * 32);
//! # Ok::<(), flatbvh::Error>(())
//! ```

pub mod util;
pub mod geom;
pub mod bvh;

// Command-line settings (enabled with "cli" feature)
#[cfg(feature = "cli")]
pub mod settings;

// Re-export commonly used types
pub use util::{Aabb, Error, Result};
pub use bvh::{Bvh, BuildParams, PackedNode};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Aabb, Error, Result, Vec3};
    pub use crate::geom::{Ray, Triangle};
    pub use crate::bvh::{Bvh, BvhStats, BuildParams, Hit, PackedNode};
}
