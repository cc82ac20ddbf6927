use tracing::{debug, trace};

use crate::error::{ConstructionError, Result};
use crate::geometry::{CornerType, OutlineGeometry};
use crate::math::surface_arc::generate_arc;
use crate::math::{remove_adjacent_duplicates, Ellipsoid, Point3, Vector3, RADIANS_PER_DEGREE};
use crate::packable::{PackReader, PackWriter, Packable};

use super::corner::{end_cap, CornerJoin, CornerRails, Turn};
use super::validate_granularity;

/// Heights closer than this produce a flat outline.
const EXTRUSION_TOLERANCE: f64 = 1e-2;

/// Number of scalar fields packed after the ellipsoid radii.
const PACKED_SCALARS: usize = 5;

/// Input for [`CorridorOutline::new`].
#[derive(Debug, Clone)]
pub struct CorridorOutlineOptions {
    /// Centerline waypoints in Earth-fixed coordinates. Required.
    pub positions: Option<Vec<Point3>>,
    /// Distance between the two rails. Required.
    pub width: Option<f64>,
    pub ellipsoid: Ellipsoid,
    /// Height of the outline above the ellipsoid.
    pub height: f64,
    /// Height of the second outline level; defaults to `height`.
    pub extruded_height: Option<f64>,
    pub corner_type: CornerType,
    /// Angular distance between subdivided run points, in radians.
    pub granularity: f64,
}

impl Default for CorridorOutlineOptions {
    fn default() -> Self {
        Self {
            positions: None,
            width: None,
            ellipsoid: Ellipsoid::wgs84(),
            height: 0.0,
            extruded_height: None,
            corner_type: CornerType::default(),
            granularity: RADIANS_PER_DEGREE,
        }
    }
}

/// Outline of a corridor: two rails at a fixed distance either side of a
/// path on the ellipsoid, closed by end caps and joined at corners.
///
/// Optionally extruded between two heights, with vertical lines at the ends
/// and corners.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorOutline {
    positions: Vec<Point3>,
    width: f64,
    ellipsoid: Ellipsoid,
    height: f64,
    extruded_height: f64,
    corner_type: CornerType,
    granularity: f64,
}

impl CorridorOutline {
    /// Creates a corridor outline descriptor.
    ///
    /// The larger of `height` and `extruded_height` becomes the top level.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MissingField`] if `positions` or `width`
    /// is absent, or [`crate::error::GeometryError::ParameterOutOfRange`] if
    /// the granularity is not in `(0, π]`.
    pub fn new(options: CorridorOutlineOptions) -> Result<Self> {
        let positions = options
            .positions
            .ok_or(ConstructionError::MissingField("positions"))?;
        let width = options
            .width
            .ok_or(ConstructionError::MissingField("width"))?;
        validate_granularity(options.granularity)?;

        let extruded_height = options.extruded_height.unwrap_or(options.height);
        Ok(Self {
            positions,
            width,
            ellipsoid: options.ellipsoid,
            height: options.height.max(extruded_height),
            extruded_height: options.height.min(extruded_height),
            corner_type: options.corner_type,
            granularity: options.granularity,
        })
    }

    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Top level height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Bottom level height; equal to [`CorridorOutline::height`] when flat.
    #[must_use]
    pub fn extruded_height(&self) -> f64 {
        self.extruded_height
    }

    #[must_use]
    pub fn corner_type(&self) -> CornerType {
        self.corner_type
    }

    #[must_use]
    pub fn granularity(&self) -> f64 {
        self.granularity
    }

    /// Returns `true` if the outline has two levels joined by walls.
    #[must_use]
    pub fn is_extruded(&self) -> bool {
        (self.height - self.extruded_height).abs() > EXTRUSION_TOLERANCE
    }

    /// Builds the line geometry.
    ///
    /// Returns `None` if fewer than two distinct positions remain, the width
    /// is not positive, the path is numerically degenerate, or a run would
    /// need more than [`MAX_SEGMENTS`](crate::math::surface_arc::MAX_SEGMENTS)
    /// subdivisions.
    #[must_use]
    pub fn create_geometry(&self) -> Option<OutlineGeometry> {
        let positions = remove_adjacent_duplicates(&self.positions);
        if positions.len() < 2 {
            debug!(
                unique_positions = positions.len(),
                "corridor outline needs at least two distinct positions"
            );
            return None;
        }
        if !(self.width > 0.0 && self.width.is_finite()) {
            debug!(width = self.width, "corridor outline width must be positive");
            return None;
        }

        let Some(rails) = self.compute_rails(&positions) else {
            debug!(
                granularity = self.granularity,
                "corridor outline path is degenerate or too finely subdivided"
            );
            return None;
        };
        let corners = rails.corners.len();
        let ring = OutlineRing::from_rails(rails)?;

        let geometry = if self.is_extruded() {
            ring.extruded(&self.ellipsoid, self.height, self.extruded_height)?
        } else {
            ring.flat(&self.ellipsoid, self.height)?
        };
        trace!(
            corners,
            vertices = geometry.vertex_count(),
            lines = geometry.line_count(),
            "corridor outline built"
        );
        Some(geometry)
    }

    /// Walks the path, emitting one run of rail points per straight stretch
    /// and one join per corner.
    fn compute_rails(&self, positions: &[Point3]) -> Option<Rails> {
        let ellipsoid = &self.ellipsoid;
        let half_width = self.width * 0.5;
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
        let mut runs = Vec::new();
        let mut corners = Vec::new();

        for window in surface.windows(3) {
            let (position, next) = (window[1], window[2]);
            let normal = ellipsoid.geodetic_surface_normal(&position)?;
            forward = (next - position).try_normalize(0.0)?;
            let Some(turn) = Turn::analyze(&normal, &backward, &forward) else {
                backward = -forward;
                continue;
            };

            let outward = turn.outward_sign();
            let pivot = position + turn.inner_offset(half_width);
            let center = pivot + left * (outward * half_width);
            let start = pivot + left * (outward * self.width);
            let run = generate_arc(ellipsoid, &previous, &center, self.granularity)?;
            runs.push(Run::shifted(&run, &left, half_width));

            left = normal.cross(&forward).try_normalize(0.0)?;
            let end = pivot + left * (outward * self.width);
            previous = pivot + left * (outward * half_width);

            let rails = CornerRails {
                position,
                pivot,
                start,
                end,
                left_is_outside: turn.left_is_outside,
            };
            corners.push(Corner {
                left_is_outside: turn.left_is_outside,
                join: CornerJoin::new(self.corner_type, &rails)?,
            });
            backward = -forward;
        }

        let last = surface[surface.len() - 1];
        let run = generate_arc(ellipsoid, &previous, &last, self.granularity)?;
        runs.push(Run::shifted(&run, &left, half_width));

        let caps = if self.corner_type == CornerType::Rounded {
            let (first, last) = (runs.first()?, runs.last()?);
            Some(EndCaps {
                first: end_cap(first.left.first()?, first.right.first()?)?,
                last: end_cap(last.right.last()?, last.left.last()?)?,
            })
        } else {
            None
        };

        Some(Rails {
            runs,
            corners,
            caps,
        })
    }
}

/// Rail points of one straight stretch, both in path order.
struct Run {
    right: Vec<Point3>,
    left: Vec<Point3>,
}

impl Run {
    fn shifted(centerline: &[Point3], left: &Vector3, half_width: f64) -> Self {
        let offset = left * half_width;
        Self {
            right: centerline.iter().map(|p| *p - offset).collect(),
            left: centerline.iter().map(|p| *p + offset).collect(),
        }
    }
}

struct Corner {
    left_is_outside: bool,
    join: CornerJoin,
}

/// Interior points of the rounded caps at the path ends.
#[derive(Default)]
struct EndCaps {
    first: Vec<Point3>,
    last: Vec<Point3>,
}

/// Runs alternate with corners: `runs.len() == corners.len() + 1`.
struct Rails {
    runs: Vec<Run>,
    corners: Vec<Corner>,
    caps: Option<EndCaps>,
}

/// The closed outline ring on the surface, plus the ring indices that get a
/// vertical wall when extruded.
struct OutlineRing {
    vertices: Vec<Point3>,
    walls: Vec<usize>,
}

impl OutlineRing {
    /// Stitches the rails into one loop: right rail forward, last cap, left
    /// rail backward, first cap.
    fn from_rails(rails: Rails) -> Option<Self> {
        let mut runs = rails.runs.into_iter();
        let first = runs.next()?;
        let (mut right, mut left) = (first.right, first.left);
        // Wall vertices per side, as indices into that side.
        let (mut right_walls, mut left_walls) = (vec![0], vec![0]);

        for (corner, run) in rails.corners.into_iter().zip(runs) {
            let (outer, outer_walls, outer_run, inner, inner_walls, inner_run) =
                if corner.left_is_outside {
                    (&mut left, &mut left_walls, run.left, &mut right, &mut right_walls, run.right)
                } else {
                    (&mut right, &mut right_walls, run.right, &mut left, &mut left_walls, run.left)
                };

            inner_walls.push(inner.len() - 1);
            inner.extend(inner_run.into_iter().skip(1));

            outer_walls.push(outer.len() + corner.join.apex_index());
            outer.extend(corner.join.into_points());
            outer.extend(outer_run.into_iter().skip(1));
        }
        right_walls.push(right.len() - 1);
        left_walls.push(left.len() - 1);

        let caps = rails.caps.unwrap_or_default();
        let left_start = right.len() + caps.last.len();
        let left_last = left.len() - 1;

        let mut walls = right_walls;
        walls.extend(left_walls.iter().map(|&i| left_start + left_last - i));

        let mut vertices = right;
        vertices.extend(caps.last);
        vertices.extend(left.into_iter().rev());
        vertices.extend(caps.first);
        Some(Self { vertices, walls })
    }

    fn flat(&self, ellipsoid: &Ellipsoid, height: f64) -> Option<OutlineGeometry> {
        let vertices = raise(&self.vertices, ellipsoid, height)?;
        let indices = loop_indices(vertices.len(), 0);
        Some(OutlineGeometry::new(&vertices, indices))
    }

    /// Top ring, bottom ring, then one vertical line per wall vertex.
    #[allow(clippy::cast_possible_truncation)]
    fn extruded(&self, ellipsoid: &Ellipsoid, top: f64, bottom: f64) -> Option<OutlineGeometry> {
        let n = self.vertices.len();
        let mut vertices = raise(&self.vertices, ellipsoid, top)?;
        vertices.extend(raise(&self.vertices, ellipsoid, bottom)?);

        let mut indices = loop_indices(n, 0);
        indices.extend(loop_indices(n, n));
        for &wall in &self.walls {
            indices.push(wall as u32);
            indices.push((wall + n) as u32);
        }
        Some(OutlineGeometry::new(&vertices, indices))
    }
}

/// Moves every point to `height` above the surface.
fn raise(points: &[Point3], ellipsoid: &Ellipsoid, height: f64) -> Option<Vec<Point3>> {
    points
        .iter()
        .map(|p| ellipsoid.scale_to_geodetic_height(p, height))
        .collect()
}

/// Line indices of a closed loop over `count` vertices starting at `base`.
#[allow(clippy::cast_possible_truncation)]
fn loop_indices(count: usize, base: usize) -> Vec<u32> {
    (0..count)
        .flat_map(|i| [(base + i) as u32, (base + (i + 1) % count) as u32])
        .collect()
}

impl Packable for CorridorOutline {
    fn packed_length(&self) -> usize {
        1 + 3 * self.positions.len() + 3 + PACKED_SCALARS
    }

    fn pack(&self, buffer: &mut [f64], offset: usize) -> Result<usize> {
        let mut writer = PackWriter::new(buffer, offset, self.packed_length())?;
        writer.write_count(self.positions.len());
        for p in &self.positions {
            writer.write_point3(p);
        }
        writer.write_vector3(&self.ellipsoid.radii());
        writer.write(self.width);
        writer.write(self.height);
        writer.write(self.extruded_height);
        writer.write(self.corner_type.ordinal());
        writer.write(self.granularity);
        Ok(writer.offset())
    }

    fn unpack(buffer: &[f64], offset: usize) -> Result<Self> {
        let mut reader = PackReader::new(buffer, offset);
        let count = reader.read_count()?;
        let positions = (0..count)
            .map(|_| reader.read_point3())
            .collect::<Result<Vec<_>>>()?;
        let radii = reader.read_vector3()?;
        let ellipsoid = Ellipsoid::new(radii.x, radii.y, radii.z)?;
        let width = reader.read()?;
        let height = reader.read()?;
        let extruded_height = reader.read()?;
        let corner_type = CornerType::from_ordinal(reader.read()?)?;
        let granularity = reader.read()?;

        Self::new(CorridorOutlineOptions {
            positions: Some(positions),
            width: Some(width),
            ellipsoid,
            height,
            extruded_height: Some(extruded_height),
            corner_type,
            granularity,
        })
    }
}
