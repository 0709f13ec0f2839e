//! Error types for BVH construction and its input adapters.

use thiserror::Error;

/// Main error type for flatbvh operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No triangles to build from
    #[error("Empty scene: a BVH needs at least one triangle")]
    EmptyScene,

    /// Scene exceeds what 32-bit packed node indices can address
    #[error("Too many triangles: {0}")]
    TooManyTriangles(usize),

    /// Index buffer does not describe whole triangles
    #[error("Index count {0} is not a multiple of 3")]
    IndexCount(usize),

    /// Index buffer refers past the end of the vertex buffer
    #[error("Vertex index {index} out of range (vertex count: {vertex_count})")]
    VertexIndexOutOfRange { index: u32, vertex_count: usize },

    /// NaN or infinite coordinate in the input
    #[error("Triangle {triangle} has a non-finite vertex")]
    NonFiniteVertex { triangle: usize },

    /// Build parameters outside their domain
    #[error("Invalid build parameters: {0}")]
    InvalidParams(String),

    /// Packed node array violates a structural invariant
    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wavefront OBJ loading error
    #[cfg(feature = "obj")]
    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),
}

impl Error {
    /// Create an invalid tree error.
    pub fn invalid_tree(msg: impl Into<String>) -> Self {
        Self::InvalidTree(msg.into())
    }

    /// Create an invalid parameters error.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }
}

/// Result type alias for flatbvh operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::EmptyScene;
        assert!(e.to_string().contains("at least one triangle"));

        let e = Error::VertexIndexOutOfRange { index: 7, vertex_count: 3 };
        assert!(e.to_string().contains("7"));
        assert!(e.to_string().contains("3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
