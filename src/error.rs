/// Errors raised while building, solving or applying a warp.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WarpError {
    /// A control point's source or target lies outside the square domain.
    #[error("Point ({x}, {y}) lies outside the warp domain")]
    OutOfDomain { x: f64, y: f64 },

    /// A radial solve was requested without any committed control point.
    #[error("At least one committed control point is required")]
    NoControlPoints,

    /// The kernel matrix cannot be factorized within the solver tolerance.
    #[error("Kernel matrix is singular or ill-conditioned (pivot ratio {0:e})")]
    SingularSystem(f64),

    /// A pending control point was handed to a solver.
    #[error("Control point has not been committed")]
    UncommittedControlPoint,

    /// `commit` was called on a control point that already has an end position.
    #[error("Control point is already committed")]
    AlreadyCommitted,

    /// Domain bounds or resolution are not usable.
    #[error("Invalid domain: min {min}, max {max}, resolution {resolution}")]
    InvalidDomain { min: f64, max: f64, resolution: usize },

    /// The FFD lattice needs at least one knot interval.
    #[error("Knot count must be at least 1")]
    InvalidKnotCount,

    /// Pixel buffer length does not match `width * height * 3`.
    #[error("Data length ({actual}) does not match the image size ({expected})")]
    ImageSizeMismatch { expected: usize, actual: usize },

    /// Width or height is zero.
    #[error("Image must have non-zero width and height")]
    EmptyImage,

    /// An image operation was requested on a grid without image.
    #[error("Grid has no image attached")]
    NoImage,
}

impl WarpError {
    /// Whether the error belongs to the degenerate solve family,
    /// in which case the caller should skip the warp and keep the grid as it is.
    pub fn is_degenerate_solve(&self) -> bool {
        matches!(self, WarpError::NoControlPoints | WarpError::SingularSystem(_))
    }
}

/// Result alias used across the crate.
pub type WarpResult<T> = Result<T, WarpError>;
