pub mod corner;
pub mod corridor_outline;
pub mod volume_outline;

pub use corridor_outline::{CorridorOutline, CorridorOutlineOptions};
pub use volume_outline::{PolylineVolumeOutline, PolylineVolumeOutlineOptions};

use std::f64::consts::PI;

use crate::error::{GeometryError, Result};

/// Checks that a subdivision granularity lies in `(0, π]`.
pub(crate) fn validate_granularity(granularity: f64) -> Result<()> {
    if granularity > 0.0 && granularity <= PI {
        Ok(())
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter: "granularity",
            value: granularity,
            min: 0.0,
            max: PI,
        }
        .into())
    }
}
