pub mod ellipsoid;
pub mod polygon_2d;
pub mod surface_arc;

pub use ellipsoid::{Cartographic, Ellipsoid};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance for detecting parallel directions at a waypoint.
pub const EPSILON7: f64 = 1e-7;

/// Convergence threshold for the surface projection iteration.
pub const EPSILON12: f64 = 1e-12;

/// One degree in radians; the default granularity.
pub const RADIANS_PER_DEGREE: f64 = std::f64::consts::PI / 180.0;

/// Returns the angle in `[0, π]` between two vectors.
///
/// Zero-length inputs yield `0.0`.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let (Some(a), Some(b)) = (a.try_normalize(0.0), b.try_normalize(0.0)) else {
        return 0.0;
    };
    a.cross(&b).norm().atan2(a.dot(&b))
}

/// Compares two scalars with a relative epsilon.
#[must_use]
pub fn equals_epsilon(a: f64, b: f64, relative: f64) -> bool {
    let diff = (a - b).abs();
    diff <= relative * a.abs().max(b.abs()) || diff <= f64::EPSILON
}

/// Compares two points component-wise with a relative epsilon.
#[must_use]
pub fn points_equal_epsilon(a: &Point3, b: &Point3, relative: f64) -> bool {
    equals_epsilon(a.x, b.x, relative)
        && equals_epsilon(a.y, b.y, relative)
        && equals_epsilon(a.z, b.z, relative)
}

/// Removes consecutive duplicate points (relative tolerance [`TOLERANCE`]).
#[must_use]
pub fn remove_adjacent_duplicates(points: &[Point3]) -> Vec<Point3> {
    let mut cleaned: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        match cleaned.last() {
            Some(last) if points_equal_epsilon(last, p, TOLERANCE) => {}
            _ => cleaned.push(*p),
        }
    }
    cleaned
}

/// Length of the chord subtending `angle` radians on a circle of `radius`.
#[must_use]
pub fn chord_length(angle: f64, radius: f64) -> f64 {
    2.0 * radius * (angle * 0.5).sin()
}
