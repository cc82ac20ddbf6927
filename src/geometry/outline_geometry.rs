use crate::math::Point3;

use super::BoundingSphere;

/// A line-list mesh: flat `xyz` positions and index pairs, one pair per
/// rendered segment.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineGeometry {
    /// Vertex positions, three components each.
    pub positions: Vec<f64>,
    /// Line indices, two per segment.
    pub indices: Vec<u32>,
    /// Sphere enclosing every vertex.
    pub bounding_sphere: BoundingSphere,
}

impl OutlineGeometry {
    /// Flattens `vertices` and pairs them with `indices`.
    #[must_use]
    pub fn new(vertices: &[Point3], indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 2 == 0, "line indices come in pairs");
        debug_assert!(
            indices.iter().all(|&i| (i as usize) < vertices.len()),
            "line index out of range"
        );
        let positions = vertices.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        Self {
            positions,
            indices,
            bounding_sphere: BoundingSphere::from_points(vertices),
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of line segments.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.indices.len() / 2
    }

    /// Returns vertex `index`, if present.
    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<Point3> {
        let c = self.positions.get(index * 3..index * 3 + 3)?;
        Some(Point3::new(c[0], c[1], c[2]))
    }

    /// Iterates over the segments as index pairs.
    pub fn lines(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.indices.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn triangle() -> OutlineGeometry {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        OutlineGeometry::new(&vertices, vec![0, 1, 1, 2, 2, 0])
    }

    #[test]
    fn counts() {
        let g = triangle();
        assert_eq!(g.positions.len(), 9);
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.line_count(), 3);
    }

    #[test]
    fn vertex_lookup() {
        let g = triangle();
        assert_eq!(g.vertex(1).unwrap(), Point3::new(1.0, 0.0, 0.0));
        assert!(g.vertex(3).is_none());
    }

    #[test]
    fn lines_pair_up() {
        let lines: Vec<(u32, u32)> = triangle().lines().collect();
        assert_eq!(lines, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn sphere_encloses_vertices() {
        let g = triangle();
        for i in 0..g.vertex_count() {
            assert!(g.bounding_sphere.contains(&g.vertex(i).unwrap(), 1e-12));
        }
    }
}
