pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod packable;

pub use error::{OutlineError, Result};
pub use geometry::{CornerType, OutlineGeometry};
pub use math::Ellipsoid;
pub use operations::{
    CorridorOutline, CorridorOutlineOptions, PolylineVolumeOutline, PolylineVolumeOutlineOptions,
};
pub use packable::Packable;
