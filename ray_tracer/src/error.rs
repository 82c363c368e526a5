use thiserror::Error;

#[derive(Debug, Error)]
pub enum RayTracerError {
    #[error("Cannot normalize or use a zero-length vector as a direction")]
    ZeroVector,

    #[error("Camera forward and up vectors must be orthogonal (dot product {0})")]
    NonOrthogonalCamera(f64),

    #[error("Radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    #[error("Height must be positive, got {0}")]
    NonPositiveHeight(f64),

    #[error("A polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("All vertices of a polygon must lie in the same plane")]
    NonCoplanarVertices,

    #[error("Polygon vertices must be ordered and the polygon must be convex")]
    NonConvexPolygon,

    #[error("Rendering resource is not set: {0}")]
    MissingResource(&'static str),

    #[error("Invalid render setting: {0}")]
    InvalidSetting(String),

    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write the image: {0}")]
    Io(#[from] std::io::Error),
}
