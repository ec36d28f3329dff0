/// Errors while serializing a mesh.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("mesh `{name}` has no triangles")]
    EmptyMesh { name: String },

    #[error("index {index} out of range (vertex count = {vertex_count})")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("STL supports at most {max} triangles, got {count}")]
    TooManyTriangles { count: usize, max: u32 },

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
