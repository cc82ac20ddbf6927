use tracing::{debug, trace};

use crate::error::{ConstructionError, Result};
use crate::geometry::{CornerType, OutlineGeometry};
use crate::math::polygon_2d::{remove_duplicates_from_shape, to_counter_clockwise, BoundingRectangle};
use crate::math::surface_arc::{generate_arc, interpolate_heights};
use crate::math::{
    angle_between, remove_adjacent_duplicates, Ellipsoid, Point2, Point3, Vector2, Vector3,
    RADIANS_PER_DEGREE,
};
use crate::packable::{PackReader, PackWriter, Packable};

use super::corner::{arc_steps, sweep_about_pivot, Turn};
use super::validate_granularity;

/// Input for [`PolylineVolumeOutline::new`].
#[derive(Debug, Clone)]
pub struct PolylineVolumeOutlineOptions {
    /// Path waypoints in Earth-fixed coordinates. Their heights above the
    /// ellipsoid are kept. Required.
    pub polyline_positions: Option<Vec<Point3>>,
    /// Closed 2D cross-section in meters; x across the path, y up. Required.
    pub shape_positions: Option<Vec<Point2>>,
    pub ellipsoid: Ellipsoid,
    pub corner_type: CornerType,
    /// Angular distance between subdivided run points, in radians.
    pub granularity: f64,
}

impl Default for PolylineVolumeOutlineOptions {
    fn default() -> Self {
        Self {
            polyline_positions: None,
            shape_positions: None,
            ellipsoid: Ellipsoid::wgs84(),
            corner_type: CornerType::default(),
            granularity: RADIANS_PER_DEGREE,
        }
    }
}

/// Outline of a 2D shape swept along a path on the ellipsoid.
///
/// The shape is drawn as a ring at every subdivided path point; the first
/// and last rings are closed and consecutive rings are linked vertex to
/// vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineVolumeOutline {
    polyline_positions: Vec<Point3>,
    shape_positions: Vec<Point2>,
    ellipsoid: Ellipsoid,
    corner_type: CornerType,
    granularity: f64,
}

impl PolylineVolumeOutline {
    /// Creates a polyline volume outline descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MissingField`] if either position list is
    /// absent, or [`crate::error::GeometryError::ParameterOutOfRange`] if the
    /// granularity is not in `(0, π]`.
    pub fn new(options: PolylineVolumeOutlineOptions) -> Result<Self> {
        let polyline_positions = options
            .polyline_positions
            .ok_or(ConstructionError::MissingField("polyline_positions"))?;
        let shape_positions = options
            .shape_positions
            .ok_or(ConstructionError::MissingField("shape_positions"))?;
        validate_granularity(options.granularity)?;

        Ok(Self {
            polyline_positions,
            shape_positions,
            ellipsoid: options.ellipsoid,
            corner_type: options.corner_type,
            granularity: options.granularity,
        })
    }

    #[must_use]
    pub fn polyline_positions(&self) -> &[Point3] {
        &self.polyline_positions
    }

    #[must_use]
    pub fn shape_positions(&self) -> &[Point2] {
        &self.shape_positions
    }

    #[must_use]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    #[must_use]
    pub fn corner_type(&self) -> CornerType {
        self.corner_type
    }

    #[must_use]
    pub fn granularity(&self) -> f64 {
        self.granularity
    }

    /// Builds the line geometry.
    ///
    /// Returns `None` if fewer than two distinct path positions or three
    /// distinct shape positions remain, the path is numerically degenerate,
    /// or a run would need more than
    /// [`MAX_SEGMENTS`](crate::math::surface_arc::MAX_SEGMENTS) subdivisions.
    #[must_use]
    pub fn create_geometry(&self) -> Option<OutlineGeometry> {
        let positions = remove_adjacent_duplicates(&self.polyline_positions);
        let shape = remove_duplicates_from_shape(&self.shape_positions);
        if positions.len() < 2 || shape.len() < 3 {
            debug!(
                unique_positions = positions.len(),
                unique_shape_positions = shape.len(),
                "polyline volume outline needs two path positions and three shape positions"
            );
            return None;
        }

        let section = CrossSection::new(&to_counter_clockwise(shape));
        let mut sweep = Sweep {
            ellipsoid: &self.ellipsoid,
            section: &section,
            granularity: self.granularity,
            vertices: Vec::new(),
        };
        if sweep.run_path(&positions, self.corner_type).is_none() {
            debug!(
                granularity = self.granularity,
                "polyline volume outline path is degenerate or too finely subdivided"
            );
            return None;
        }

        let shape_len = section.offsets.len();
        let rings = sweep.vertices.len() / shape_len;
        if rings < 2 {
            debug!(rings, "polyline volume outline needs at least two rings");
            return None;
        }
        let geometry = OutlineGeometry::new(&sweep.vertices, ring_indices(shape_len, rings));
        trace!(
            rings,
            vertices = geometry.vertex_count(),
            lines = geometry.line_count(),
            "polyline volume outline built"
        );
        Some(geometry)
    }
}

/// Shape prepared for sweeping: centered on its bounding rectangle.
struct CrossSection {
    offsets: Vec<Vector2>,
    half_width: f64,
    /// Raises the centered shape so its bottom rests on the path.
    lift: f64,
}

impl CrossSection {
    fn new(shape: &[Point2]) -> Self {
        let bounds = BoundingRectangle::from_points(shape);
        let center = bounds.center();
        Self {
            offsets: shape.iter().map(|p| p - center).collect(),
            half_width: bounds.width * 0.5,
            lift: bounds.height * 0.5,
        }
    }
}

/// Accumulates ring vertices along the path.
struct Sweep<'a> {
    ellipsoid: &'a Ellipsoid,
    section: &'a CrossSection,
    granularity: f64,
    vertices: Vec<Point3>,
}

impl Sweep<'_> {
    fn run_path(&mut self, positions: &[Point3], corner_type: CornerType) -> Option<()> {
        let ellipsoid = self.ellipsoid;
        let half_width = self.section.half_width;
        let lift = self.section.lift;

        let heights = positions
            .iter()
            .map(|p| Some(ellipsoid.cartesian_to_cartographic(p)?.height))
            .collect::<Option<Vec<_>>>()?;
        let surface = positions
            .iter()
            .map(|p| ellipsoid.scale_to_geodetic_surface(p))
            .collect::<Option<Vec<_>>>()?;

        let mut forward = (surface[1] - surface[0]).try_normalize(0.0)?;
        let mut left = ellipsoid
            .geodetic_surface_normal(&surface[0])?
            .cross(&forward)
            .try_normalize(0.0)?;
        let mut backward = -forward;
        let mut previous = surface[0];
        let mut previous_height = heights[0];

        for i in 1..surface.len() - 1 {
            let (position, next) = (surface[i], surface[i + 1]);
            let height = heights[i];
            let normal = ellipsoid.geodetic_surface_normal(&position)?;
            forward = (next - position).try_normalize(0.0)?;

            if let Some(turn) = Turn::analyze(&normal, &backward, &forward) {
                let outward = turn.outward_sign();
                let pivot = position + turn.inner_offset(half_width);
                let start = pivot + left * (outward * half_width);
                self.run(&previous, &start, previous_height + lift, height + lift, &left, true)?;

                left = normal.cross(&forward).try_normalize(0.0)?;
                let end = pivot + left * (outward * half_width);

                if corner_type == CornerType::Mitered {
                    let miter_left = turn.bisector * -outward;
                    self.ring(&position, &miter_left, height + lift, turn.miter_scale)?;
                } else {
                    let corner = SweptCorner {
                        pivot,
                        start,
                        end,
                        left_is_outside: turn.left_is_outside,
                    };
                    self.corner(&corner, corner_type, height + lift)?;
                }
                previous = end;
            } else {
                // Straight through: the next run picks up at this waypoint.
                self.run(&previous, &position, previous_height + lift, height + lift, &left, false)?;
                previous = position;
            }
            backward = -forward;
            previous_height = height;
        }

        let last = surface.len() - 1;
        self.run(
            &previous,
            &surface[last],
            previous_height + lift,
            heights[last] + lift,
            &left,
            true,
        )
    }

    /// Rings along a subdivided run, optionally omitting the ring at `end`.
    fn run(
        &mut self,
        start: &Point3,
        end: &Point3,
        start_height: f64,
        end_height: f64,
        left: &Vector3,
        include_end: bool,
    ) -> Option<()> {
        let mut centers = generate_arc(self.ellipsoid, start, end, self.granularity)?;
        let heights = interpolate_heights(centers.len(), start_height, end_height);
        if !include_end {
            centers.pop();
        }
        for (center, height) in centers.iter().zip(heights) {
            self.ring(center, left, height, 1.0)?;
        }
        Some(())
    }

    /// Rings around a rounded or beveled corner. Rounded corners get one ring
    /// per interior arc step; beveled corners get rings at both arc ends.
    fn corner(&mut self, corner: &SweptCorner, corner_type: CornerType, height: f64) -> Option<()> {
        let from_pivot = |p: &Point3| *p - corner.pivot;
        let angle = angle_between(&from_pivot(&corner.start), &from_pivot(&corner.end));
        let steps = match corner_type {
            CornerType::Rounded => arc_steps(angle),
            CornerType::Mitered | CornerType::Beveled => 0,
        };
        let points = if steps > 0 {
            #[allow(clippy::cast_precision_loss)]
            let step = angle / (steps + 1) as f64;
            sweep_about_pivot(&corner.pivot, &corner.start, step, steps, corner.left_is_outside)?
        } else {
            vec![corner.start, corner.end]
        };

        let sign = if corner.left_is_outside { 1.0 } else { -1.0 };
        for point in &points {
            let left = (from_pivot(point) * sign).try_normalize(0.0)?;
            let center = self.ellipsoid.scale_to_geodetic_surface(point)?;
            self.ring(&center, &left, height, 1.0)?;
        }
        Some(())
    }

    /// Places the shape at `center`: x along the path's right, stretched by
    /// `x_scale`, and y along the surface normal, raised by `height`.
    fn ring(&mut self, center: &Point3, left: &Vector3, height: f64, x_scale: f64) -> Option<()> {
        let up = self.ellipsoid.geodetic_surface_normal(center)?;
        let right = -(left - up * left.dot(&up)).try_normalize(0.0)?;
        self.vertices.extend(
            self.section
                .offsets
                .iter()
                .map(|offset| *center + right * (offset.x * x_scale) + up * (offset.y + height)),
        );
        Some(())
    }
}

struct SweptCorner {
    pivot: Point3,
    start: Point3,
    end: Point3,
    left_is_outside: bool,
}

/// First ring closed, last ring closed, then one line per shape vertex
/// between consecutive rings.
#[allow(clippy::cast_possible_truncation)]
fn ring_indices(shape_len: usize, rings: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(2 * shape_len * (rings + 1));
    for ring in [0, rings - 1] {
        let base = ring * shape_len;
        for j in 0..shape_len {
            indices.push((base + j) as u32);
            indices.push((base + (j + 1) % shape_len) as u32);
        }
    }
    for ring in 0..rings - 1 {
        let base = ring * shape_len;
        for j in 0..shape_len {
            indices.push((base + j) as u32);
            indices.push((base + shape_len + j) as u32);
        }
    }
    indices
}

impl Packable for PolylineVolumeOutline {
    fn packed_length(&self) -> usize {
        1 + 3 * self.polyline_positions.len() + 1 + 2 * self.shape_positions.len() + 3 + 2
    }

    fn pack(&self, buffer: &mut [f64], offset: usize) -> Result<usize> {
        let mut writer = PackWriter::new(buffer, offset, self.packed_length())?;
        writer.write_count(self.polyline_positions.len());
        for p in &self.polyline_positions {
            writer.write_point3(p);
        }
        writer.write_count(self.shape_positions.len());
        for p in &self.shape_positions {
            writer.write_point2(p);
        }
        writer.write_vector3(&self.ellipsoid.radii());
        writer.write(self.corner_type.ordinal());
        writer.write(self.granularity);
        Ok(writer.offset())
    }

    fn unpack(buffer: &[f64], offset: usize) -> Result<Self> {
        let mut reader = PackReader::new(buffer, offset);
        let count = reader.read_count()?;
        let polyline_positions = (0..count)
            .map(|_| reader.read_point3())
            .collect::<Result<Vec<_>>>()?;
        let count = reader.read_count()?;
        let shape_positions = (0..count)
            .map(|_| reader.read_point2())
            .collect::<Result<Vec<_>>>()?;
        let radii = reader.read_vector3()?;
        let ellipsoid = Ellipsoid::new(radii.x, radii.y, radii.z)?;
        let corner_type = CornerType::from_ordinal(reader.read()?)?;
        let granularity = reader.read()?;

        Self::new(PolylineVolumeOutlineOptions {
            polyline_positions: Some(polyline_positions),
            shape_positions: Some(shape_positions),
            ellipsoid,
            corner_type,
            granularity,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{OutlineError, PackError};

    const ZIG_ZAG: [f64; 8] = [90.0, -30.0, 90.0, -31.0, 89.0, -31.0, 89.0, -32.0];

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(-10_000.0, -10_000.0),
            Point2::new(10_000.0, -10_000.0),
            Point2::new(10_000.0, 10_000.0),
            Point2::new(-10_000.0, 10_000.0),
        ]
    }

    fn volume(coordinates: &[f64], shape: Vec<Point2>, corner_type: CornerType) -> PolylineVolumeOutline {
        PolylineVolumeOutline::new(PolylineVolumeOutlineOptions {
            polyline_positions: Some(Ellipsoid::wgs84().cartesian_array_from_degrees(coordinates)),
            shape_positions: Some(shape),
            corner_type,
            ..Default::default()
        })
        .unwrap()
    }

    fn counts(outline: &PolylineVolumeOutline) -> (usize, usize) {
        let geometry = outline.create_geometry().unwrap();
        (geometry.vertex_count(), geometry.line_count())
    }

    #[test]
    fn missing_polyline_positions_fails() {
        let result = PolylineVolumeOutline::new(PolylineVolumeOutlineOptions {
            shape_positions: Some(square()),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(OutlineError::Construction(ConstructionError::MissingField(
                "polyline_positions"
            )))
        ));
    }

    #[test]
    fn missing_shape_positions_fails() {
        let result = PolylineVolumeOutline::new(PolylineVolumeOutlineOptions {
            polyline_positions: Some(Ellipsoid::wgs84().cartesian_array_from_degrees(&ZIG_ZAG)),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(OutlineError::Construction(ConstructionError::MissingField(
                "shape_positions"
            )))
        ));
    }

    #[test]
    fn duplicate_positions_give_no_geometry() {
        let outline = volume(&[-12.0, 33.0, -12.0, 33.0], square(), CornerType::Rounded);
        assert!(outline.create_geometry().is_none());
    }

    #[test]
    fn degenerate_shape_gives_no_geometry() {
        let x = Point2::new(1.0, 0.0);
        let outline = volume(&[90.0, -30.0, 90.0, -35.0], vec![x, x, x], CornerType::Rounded);
        assert!(outline.create_geometry().is_none());
    }

    #[test]
    fn straight_volume() {
        let outline = volume(&[90.0, -30.0, 90.0, -35.0], square(), CornerType::Mitered);
        assert_eq!(counts(&outline), (24, 28));
    }

    #[test]
    fn clockwise_shape_is_reversed() {
        let ccw = volume(&[90.0, -30.0, 90.0, -35.0], square(), CornerType::Mitered);
        let reversed: Vec<Point2> = square().into_iter().rev().collect();
        let cw = volume(&[90.0, -30.0, 90.0, -35.0], reversed, CornerType::Mitered);
        let (a, b) = (ccw.create_geometry().unwrap(), cw.create_geometry().unwrap());
        assert_eq!(a.vertex_count(), 24);
        assert_eq!(a.positions, b.positions);
    }

    #[test]
    fn shape_bottom_rests_on_path() {
        let ellipsoid = Ellipsoid::wgs84();
        let outline = volume(&[90.0, -30.0, 90.0, -35.0], square(), CornerType::Mitered);
        let geometry = outline.create_geometry().unwrap();
        let heights: Vec<f64> = (0..geometry.vertex_count())
            .map(|i| {
                let p = geometry.vertex(i).unwrap();
                ellipsoid.cartesian_to_cartographic(&p).unwrap().height
            })
            .collect();
        let min = heights.iter().copied().fold(f64::INFINITY, f64::min);
        let max = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Horizontal offsets of 10 km rise about 8 m off the curved surface.
        assert_relative_eq!(min, 0.0, epsilon = 10.0);
        assert_relative_eq!(max, 20_000.0, epsilon = 10.0);
    }

    #[test]
    fn path_heights_are_kept() {
        let ellipsoid = Ellipsoid::wgs84();
        let positions = vec![
            ellipsoid.cartesian_from_degrees(90.0, -30.0, 1_000.0),
            ellipsoid.cartesian_from_degrees(90.0, -35.0, 1_000.0),
        ];
        let outline = PolylineVolumeOutline::new(PolylineVolumeOutlineOptions {
            polyline_positions: Some(positions),
            shape_positions: Some(square()),
            corner_type: CornerType::Mitered,
            ..Default::default()
        })
        .unwrap();
        let geometry = outline.create_geometry().unwrap();
        let min = (0..geometry.vertex_count())
            .map(|i| {
                let p = geometry.vertex(i).unwrap();
                ellipsoid.cartesian_to_cartographic(&p).unwrap().height
            })
            .fold(f64::INFINITY, f64::min);
        assert_relative_eq!(min, 1_000.0, epsilon = 10.0);
    }

    #[test]
    fn right_turn() {
        let outline = volume(&[90.0, -30.0, 90.0, -31.0, 91.0, -31.0], square(), CornerType::Mitered);
        assert_eq!(counts(&outline), (20, 24));
    }

    #[test]
    fn left_turn() {
        let outline = volume(&[90.0, -30.0, 90.0, -31.0, 89.0, -31.0], square(), CornerType::Mitered);
        assert_eq!(counts(&outline), (20, 24));
    }

    #[test]
    fn beveled_zig_zag() {
        let outline = volume(&ZIG_ZAG, square(), CornerType::Beveled);
        assert_eq!(counts(&outline), (40, 44));
    }

    #[test]
    fn rounded_zig_zag() {
        let outline = volume(&ZIG_ZAG, square(), CornerType::Rounded);
        assert_eq!(counts(&outline), (172, 176));
    }

    #[test]
    fn collinear_waypoint_adds_no_ring() {
        let outline = volume(&[90.0, -30.0, 90.0, -32.0, 90.0, -35.0], square(), CornerType::Mitered);
        assert_eq!(counts(&outline), (24, 28));
    }

    #[test]
    fn collinear_waypoint_keeps_next_corner() {
        for corner_type in [CornerType::Mitered, CornerType::Rounded, CornerType::Beveled] {
            let with_lead_in = volume(&[0.0, 0.0, 10.0, 0.0, 20.0, 0.0, 20.0, 10.0], square(), corner_type)
                .create_geometry()
                .unwrap();
            let without = volume(&[10.0, 0.0, 20.0, 0.0, 20.0, 10.0], square(), corner_type)
                .create_geometry()
                .unwrap();

            // The lead-in only adds rings in front; everything from the
            // collinear waypoint on is shared.
            let (long, short) = (&with_lead_in.positions, &without.positions);
            assert!(long.len() > short.len());
            let tail = &long[long.len() - short.len()..];
            for (a, b) in tail.iter().zip(short) {
                assert_relative_eq!(*a, *b, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn tiny_granularity_gives_no_geometry() {
        let outline = PolylineVolumeOutline::new(PolylineVolumeOutlineOptions {
            polyline_positions: Some(Ellipsoid::wgs84().cartesian_array_from_degrees(&ZIG_ZAG)),
            shape_positions: Some(square()),
            granularity: 1e-300,
            ..Default::default()
        })
        .unwrap();
        assert!(outline.create_geometry().is_none());
    }

    #[test]
    fn topology_links_rings() {
        let outline = volume(&[90.0, -30.0, 90.0, -35.0], square(), CornerType::Mitered);
        let geometry = outline.create_geometry().unwrap();
        let lines: Vec<_> = geometry.lines().collect();
        assert_eq!(&lines[..4], &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(&lines[4..8], &[(20, 21), (21, 22), (22, 23), (23, 20)]);
        assert_eq!(lines[8], (0, 4));
        assert_eq!(lines[27], (19, 23));
        for i in 0..geometry.vertex_count() {
            assert!(geometry.bounding_sphere.contains(&geometry.vertex(i).unwrap(), 1e-6));
        }
    }

    #[test]
    fn pack_layout() {
        let outline = PolylineVolumeOutline::new(PolylineVolumeOutlineOptions {
            polyline_positions: Some(vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ]),
            shape_positions: Some(vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ]),
            ellipsoid: Ellipsoid::unit_sphere(),
            corner_type: CornerType::Beveled,
            granularity: 0.1,
        })
        .unwrap();
        let expected = [
            3.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 3.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0,
            1.0, 1.0, 1.0, 2.0, 0.1,
        ];
        assert_eq!(outline.packed_length(), expected.len());
        assert_eq!(outline.to_packed().unwrap(), expected);
        assert_eq!(PolylineVolumeOutline::unpack(&expected, 0).unwrap(), outline);
    }

    #[test]
    fn pack_at_offset() {
        let outline = volume(&ZIG_ZAG, square(), CornerType::Rounded);
        let mut buffer = vec![0.0; 5 + outline.packed_length()];
        assert_eq!(outline.pack(&mut buffer, 5).unwrap(), buffer.len());
        assert_eq!(PolylineVolumeOutline::unpack(&buffer, 5).unwrap(), outline);
    }

    #[test]
    fn unpack_truncated_buffer_fails() {
        let packed = volume(&ZIG_ZAG, square(), CornerType::Rounded).to_packed().unwrap();
        assert!(matches!(
            PolylineVolumeOutline::unpack(&packed[..10], 0),
            Err(OutlineError::Pack(PackError::BufferTooShort { .. }))
        ));
    }

    #[test]
    fn unpack_bad_shape_count_fails() {
        let mut packed = volume(&ZIG_ZAG, square(), CornerType::Rounded).to_packed().unwrap();
        packed[1 + 3 * 4] = 2.5;
        assert!(matches!(
            PolylineVolumeOutline::unpack(&packed, 0),
            Err(OutlineError::Pack(PackError::InvalidCount(_)))
        ));
    }

    #[test]
    fn unpack_bad_granularity_fails() {
        let mut packed = volume(&ZIG_ZAG, square(), CornerType::Rounded).to_packed().unwrap();
        let last = packed.len() - 1;
        packed[last] = -1.0;
        assert!(PolylineVolumeOutline::unpack(&packed, 0).is_err());
    }
}
