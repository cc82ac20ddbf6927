use crate::math::{Point3, Vector3};

/// A sphere enclosing a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3,
    pub radius: f64,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            radius: 0.0,
        }
    }
}

impl BoundingSphere {
    /// Computes a tight sphere around `points`.
    ///
    /// Runs Ritter's algorithm seeded with the most separated pair of axis
    /// extremes and keeps it unless the sphere centered on the axis-aligned
    /// box is smaller. Empty input yields a zero sphere at the origin.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::default();
        };

        let mut min = [first; 3];
        let mut max = [first; 3];
        for p in points {
            for axis in 0..3 {
                if p[axis] < min[axis][axis] {
                    min[axis] = *p;
                }
                if p[axis] > max[axis][axis] {
                    max[axis] = *p;
                }
            }
        }

        let mut seed = 0;
        for axis in 1..3 {
            if (max[axis] - min[axis]).norm_squared() > (max[seed] - min[seed]).norm_squared() {
                seed = axis;
            }
        }

        let mut center = nalgebra::center(&min[seed], &max[seed]);
        let mut radius = (max[seed] - center).norm();
        for p in points {
            let d = (p - center).norm();
            if d > radius {
                let grown = (radius + d) * 0.5;
                let shift: Vector3 = (p - center) * ((d - grown) / d);
                center += shift;
                radius = grown;
            }
        }

        let box_center = Point3::new(
            (min[0].x + max[0].x) * 0.5,
            (min[1].y + max[1].y) * 0.5,
            (min[2].z + max[2].z) * 0.5,
        );
        let box_radius = points
            .iter()
            .map(|p| (p - box_center).norm())
            .fold(0.0, f64::max);

        if box_radius < radius {
            Self {
                center: box_center,
                radius: box_radius,
            }
        } else {
            Self { center, radius }
        }
    }

    /// Returns `true` if `point` lies inside the sphere, within `tolerance`.
    #[must_use]
    pub fn contains(&self, point: &Point3, tolerance: f64) -> bool {
        (point - self.center).norm() <= self.radius + tolerance
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn empty_is_zero_sphere() {
        assert_eq!(BoundingSphere::from_points(&[]), BoundingSphere::default());
    }

    #[test]
    fn single_point() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let sphere = BoundingSphere::from_points(&[p]);
        assert_relative_eq!(sphere.center, p);
        assert!(sphere.radius.abs() < 1e-12);
    }

    #[test]
    fn cube_corners() {
        let mut points = Vec::new();
        for x in [-1.0, 1.0] {
            for y in [-1.0, 1.0] {
                for z in [-1.0, 1.0] {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        let sphere = BoundingSphere::from_points(&points);
        assert_relative_eq!(sphere.radius, 3.0_f64.sqrt(), epsilon = 1e-12);
        for p in &points {
            assert!(sphere.contains(p, 1e-9));
        }
    }

    #[test]
    fn contains_every_scattered_point() {
        let points: Vec<Point3> = (0..50)
            .map(|i| {
                let t = f64::from(i);
                Point3::new((t * 0.7).sin() * 10.0, (t * 1.3).cos() * 4.0, t * 0.1)
            })
            .collect();
        let sphere = BoundingSphere::from_points(&points);
        for p in &points {
            assert!(sphere.contains(p, 1e-9));
        }
    }
}
