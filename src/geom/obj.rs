//! Wavefront OBJ loading via `tobj`.

use std::path::Path;

use super::{triangles_from_indexed, Triangle};
use crate::util::Result;

/// Load every model in an OBJ file as one concatenated triangle list.
///
/// Faces are triangulated on load; materials are ignored.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_obj(path: impl AsRef<Path>) -> Result<Vec<Triangle>> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj(path.as_ref(), &options)?;

    let mut triangles = Vec::new();
    for model in &models {
        let positions: Vec<[f32; 3]> = model
            .mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let tris = triangles_from_indexed(&positions, &model.mesh.indices)?;
        tracing::debug!(model = %model.name, triangles = tris.len(), "loaded model");
        triangles.extend(tris);
    }

    Ok(triangles)
}
