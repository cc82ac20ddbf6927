use nalgebra::{Rotation3, Unit};

use crate::geometry::CornerType;
use crate::math::{angle_between, Point3, Vector3, EPSILON7, RADIANS_PER_DEGREE, TOLERANCE};

/// Angular step of rounded joins and end caps (5°).
pub const ARC_STEP: f64 = 5.0 * RADIANS_PER_DEGREE;

/// Lower bound on the sine of the half turn; caps a miter at four half-widths.
const MIN_MITER_SINE: f64 = 0.25;

/// Number of [`ARC_STEP`] increments needed to sweep `angle` radians.
///
/// Angles that are an exact multiple of the step are not rounded up.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn arc_steps(angle: f64) -> usize {
    (angle / ARC_STEP - TOLERANCE).ceil().max(0.0) as usize
}

/// Turn geometry at an interior waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
    /// Unit direction from the waypoint toward the inside of the turn, in
    /// the tangent plane.
    pub bisector: Vector3,
    /// Multiplier taking a half-width to the distance of the inner rail
    /// vertex along [`Turn::bisector`].
    pub miter_scale: f64,
    /// `true` when the left rail is on the outside of the turn.
    pub left_is_outside: bool,
}

impl Turn {
    /// Analyzes the turn at a waypoint with surface `normal`.
    ///
    /// `backward` points to the previous waypoint and `forward` to the next;
    /// both are unit vectors. Returns `None` when the two directions are
    /// parallel in the tangent plane, in which case the path runs straight
    /// through (or doubles back on itself) and no corner is built.
    #[must_use]
    pub fn analyze(normal: &Vector3, backward: &Vector3, forward: &Vector3) -> Option<Self> {
        let forward_tangent = reject(forward, normal).try_normalize(0.0)?;
        let backward_tangent = reject(backward, normal).try_normalize(0.0)?;
        if (forward_tangent.dot(&backward_tangent).abs() - 1.0).abs() <= EPSILON7 {
            return None;
        }

        let bisector = (forward + backward).try_normalize(0.0)?;
        let bisector = normal.cross(&bisector.cross(normal)).try_normalize(0.0)?;
        let miter_scale = 1.0 / bisector.cross(backward).norm().max(MIN_MITER_SINE);
        let left_is_outside = normal.dot(&backward.cross(forward)) >= 0.0;

        Some(Self {
            bisector,
            miter_scale,
            left_is_outside,
        })
    }

    /// Offset from the waypoint to the inner rail vertex.
    #[must_use]
    pub fn inner_offset(&self, half_width: f64) -> Vector3 {
        self.bisector * (half_width * self.miter_scale)
    }

    /// `+1.0` when the outer rail is on the left, `-1.0` otherwise.
    #[must_use]
    pub fn outward_sign(&self) -> f64 {
        if self.left_is_outside {
            1.0
        } else {
            -1.0
        }
    }
}

/// Component of `v` orthogonal to the unit vector `normal`.
fn reject(v: &Vector3, normal: &Vector3) -> Vector3 {
    v - normal * v.dot(normal)
}

/// Rotates `start` about the axis through the origin and `pivot`, `count`
/// times by `step` radians, collecting every rotated point.
///
/// Clockwise sweeps (seen from outside the ellipsoid) turn about `-pivot`.
/// Returns `None` when `pivot` is the origin.
#[must_use]
pub fn sweep_about_pivot(
    pivot: &Point3,
    start: &Point3,
    step: f64,
    count: usize,
    clockwise: bool,
) -> Option<Vec<Point3>> {
    let axis = if clockwise { -pivot.coords } else { pivot.coords };
    let axis = Unit::try_new(axis, 0.0)?;
    let rotation = Rotation3::from_axis_angle(&axis, step);

    let mut current = *start;
    Some(
        (0..count)
            .map(|_| {
                current = rotation * current;
                current
            })
            .collect(),
    )
}

/// Points where the outer rail meets a corner.
#[derive(Debug, Clone, Copy)]
pub struct CornerRails {
    /// The waypoint.
    pub position: Point3,
    /// Inner rail vertex, also the center of rounded joins.
    pub pivot: Point3,
    /// Last outer rail point before the corner.
    pub start: Point3,
    /// First outer rail point after the corner.
    pub end: Point3,
    /// `true` when the outer rail is on the left.
    pub left_is_outside: bool,
}

/// Outer rail points inserted at a corner, dispatched once per corner type.
///
/// Every variant ends at (or within rounding of) [`CornerRails::end`].
#[derive(Debug, Clone, PartialEq)]
pub enum CornerJoin {
    /// Sharp tip opposite the pivot, then the start of the next rail.
    Mitered { tip: Point3, end: Point3 },
    /// Straight chord to the start of the next rail.
    Beveled { end: Point3 },
    /// Circular arc about the pivot in [`ARC_STEP`] increments.
    Rounded { arc: Vec<Point3> },
}

impl CornerJoin {
    /// Builds the join for `corner_type`. Returns `None` when a rounded join
    /// cannot be swept.
    #[must_use]
    pub fn new(corner_type: CornerType, rails: &CornerRails) -> Option<Self> {
        match corner_type {
            CornerType::Mitered => Some(Self::Mitered {
                tip: rails.position - (rails.pivot - rails.position),
                end: rails.end,
            }),
            CornerType::Beveled => Some(Self::Beveled { end: rails.end }),
            CornerType::Rounded => Some(Self::Rounded {
                arc: round_corner(rails)?,
            }),
        }
    }

    /// Number of points in the join.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Mitered { .. } => 2,
            Self::Beveled { .. } => 1,
            Self::Rounded { arc } => arc.len(),
        }
    }

    /// Returns `true` if the join adds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the point that stands for the outer corner: the middle
    /// point of the join.
    #[must_use]
    pub fn apex_index(&self) -> usize {
        self.len().saturating_sub(1) / 2
    }

    /// Consumes the join, returning its points in rail order.
    #[must_use]
    pub fn into_points(self) -> Vec<Point3> {
        match self {
            Self::Mitered { tip, end } => vec![tip, end],
            Self::Beveled { end } => vec![end],
            Self::Rounded { arc } => arc,
        }
    }
}

/// Sweeps the outer rail from `start` to `end` around the pivot.
///
/// The last point lands on `end`; `start` itself is not repeated.
fn round_corner(rails: &CornerRails) -> Option<Vec<Point3>> {
    let angle = angle_between(&(rails.start - rails.pivot), &(rails.end - rails.pivot));
    let count = arc_steps(angle) + 1;
    #[allow(clippy::cast_precision_loss)]
    let step = angle / count as f64;
    sweep_about_pivot(&rails.pivot, &rails.start, step, count, rails.left_is_outside)
}

/// Interior points of a semicircular end cap from `start` to `end`.
///
/// The cap is centered on the midpoint of the two rail ends and swept
/// counter-clockwise seen from outside the ellipsoid. Neither end point is
/// included.
#[must_use]
pub fn end_cap(start: &Point3, end: &Point3) -> Option<Vec<Point3>> {
    let pivot = nalgebra::center(start, end);
    let angle = angle_between(&(start - pivot), &(end - pivot));
    let count = arc_steps(angle) + 1;
    #[allow(clippy::cast_precision_loss)]
    let step = angle / count as f64;
    let mut cap = sweep_about_pivot(&pivot, start, step, count, false)?;
    cap.pop();
    Some(cap)
}
