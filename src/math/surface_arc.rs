//! Subdivision of a path between two points along the ellipsoid surface.

use super::{chord_length, Ellipsoid, Point3};

/// Upper bound on the subdivisions of a single run.
pub const MAX_SEGMENTS: usize = 1 << 20;

/// Number of subdivisions needed so that no step is longer than
/// `min_distance`.
///
/// Returns `None` when more than [`MAX_SEGMENTS`] would be needed or the
/// ratio is not a number.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn number_of_segments(start: &Point3, end: &Point3, min_distance: f64) -> Option<usize> {
    let distance = (end - start).norm();
    let segments = (distance / min_distance).ceil();
    if segments <= MAX_SEGMENTS as f64 {
        Some(segments.max(0.0) as usize)
    } else {
        None
    }
}

/// Generates surface points from `start` to `end`, inclusive.
///
/// The chord between consecutive points never exceeds the chord subtended by
/// `granularity` radians on the ellipsoid's largest radius. Intermediate
/// points are interpolated on the chord and projected onto the surface.
/// Coincident ends yield a single point. Returns `None` when a point cannot
/// be projected (the path passes through the center) or the run would need
/// more than [`MAX_SEGMENTS`] subdivisions.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn generate_arc(
    ellipsoid: &Ellipsoid,
    start: &Point3,
    end: &Point3,
    granularity: f64,
) -> Option<Vec<Point3>> {
    let min_distance = chord_length(granularity, ellipsoid.maximum_radius());
    let segments = number_of_segments(start, end, min_distance)?;

    let first = ellipsoid.scale_to_geodetic_surface(start)?;
    let last = ellipsoid.scale_to_geodetic_surface(end)?;

    let mut points = Vec::with_capacity(segments + 1);
    points.push(first);
    for i in 1..segments {
        let t = i as f64 / segments as f64;
        let p = first + (last - first) * t;
        points.push(ellipsoid.scale_to_geodetic_surface(&p)?);
    }
    if segments > 0 {
        points.push(last);
    }
    Some(points)
}

/// Linearly interpolates `count` heights from `h0` to `h1`, inclusive.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn interpolate_heights(count: usize, h0: f64, h1: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![h0],
        _ => {
            let step = (h1 - h0) / (count - 1) as f64;
            (0..count)
                .map(|i| if i + 1 == count { h1 } else { h0 + step * i as f64 })
                .collect()
        }
    }
}
