use thiserror::Error;

/// Top-level error type for outline geometry construction and transfer.
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Pack(#[from] PackError),
}

/// Errors related to geometric parameters.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors raised while building an outline descriptor.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Errors related to packing descriptors into flat buffers.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("buffer too short: need {needed} values, have {available}")]
    BufferTooShort { needed: usize, available: usize },

    #[error("invalid element count {0}")]
    InvalidCount(f64),

    #[error("invalid corner type ordinal {0}")]
    InvalidCornerType(f64),
}

/// Convenience type alias for results using [`OutlineError`].
pub type Result<T> = std::result::Result<T, OutlineError>;
