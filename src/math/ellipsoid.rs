use crate::error::{GeometryError, Result};

use super::{Point3, Vector3, EPSILON12};

/// Below this squared ellipsoid norm a point is treated as the center and the
/// surface projection falls back to a radial scale.
const CENTER_TOLERANCE_SQUARED: f64 = 0.1;

/// Upper bound on Newton iterations when projecting onto the surface.
const MAX_SURFACE_ITERATIONS: usize = 64;

/// A geodetic position: longitude and latitude in radians, height in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    /// Creates a cartographic position from radians.
    #[must_use]
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    /// Creates a cartographic position from degrees.
    #[must_use]
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), height)
    }
}

/// A triaxial ellipsoid centered at the origin, `x²/a² + y²/b² + z²/c² = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    radii: Vector3,
    radii_squared: Vector3,
    one_over_radii: Vector3,
    one_over_radii_squared: Vector3,
}

impl Ellipsoid {
    /// Creates an ellipsoid from its three radii.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] if a radius is not a
    /// positive finite number.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        for (parameter, value) in [("radius.x", x), ("radius.y", y), ("radius.z", z)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter,
                    value,
                    min: 0.0,
                    max: f64::MAX,
                }
                .into());
            }
        }
        Ok(Self::from_valid_radii(Vector3::new(x, y, z)))
    }

    fn from_valid_radii(radii: Vector3) -> Self {
        Self {
            radii,
            radii_squared: radii.component_mul(&radii),
            one_over_radii: radii.map(|r| 1.0 / r),
            one_over_radii_squared: radii.map(|r| 1.0 / (r * r)),
        }
    }

    /// The WGS84 reference ellipsoid.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::from_valid_radii(Vector3::new(6_378_137.0, 6_378_137.0, 6_356_752.314_245_179))
    }

    /// The unit sphere.
    #[must_use]
    pub fn unit_sphere() -> Self {
        Self::from_valid_radii(Vector3::new(1.0, 1.0, 1.0))
    }

    /// Returns the radii.
    #[must_use]
    pub fn radii(&self) -> Vector3 {
        self.radii
    }

    /// Returns the largest radius.
    #[must_use]
    pub fn maximum_radius(&self) -> f64 {
        self.radii.max()
    }

    /// Unit normal to the surface at the projection of `point`.
    ///
    /// Returns `None` at the center.
    #[must_use]
    pub fn geodetic_surface_normal(&self, point: &Point3) -> Option<Vector3> {
        point
            .coords
            .component_mul(&self.one_over_radii_squared)
            .try_normalize(0.0)
    }

    /// Unit normal to the surface at a cartographic position.
    #[must_use]
    pub fn geodetic_surface_normal_cartographic(&self, position: &Cartographic) -> Vector3 {
        let cos_lat = position.latitude.cos();
        Vector3::new(
            cos_lat * position.longitude.cos(),
            cos_lat * position.longitude.sin(),
            position.latitude.sin(),
        )
    }

    /// Converts a cartographic position to an Earth-fixed point.
    #[must_use]
    pub fn cartographic_to_cartesian(&self, position: &Cartographic) -> Point3 {
        let n = self.geodetic_surface_normal_cartographic(position);
        let k = self.radii_squared.component_mul(&n);
        let gamma = n.dot(&k).sqrt();
        Point3::from(k / gamma + n * position.height)
    }

    /// Converts longitude/latitude in degrees to an Earth-fixed point.
    #[must_use]
    pub fn cartesian_from_degrees(&self, longitude: f64, latitude: f64, height: f64) -> Point3 {
        self.cartographic_to_cartesian(&Cartographic::from_degrees(longitude, latitude, height))
    }

    /// Converts a flat `[lon0, lat0, lon1, lat1, ...]` list in degrees to
    /// surface points. A trailing odd value is ignored.
    #[must_use]
    pub fn cartesian_array_from_degrees(&self, coordinates: &[f64]) -> Vec<Point3> {
        coordinates
            .chunks_exact(2)
            .map(|c| self.cartesian_from_degrees(c[0], c[1], 0.0))
            .collect()
    }

    /// Converts an Earth-fixed point to a cartographic position.
    ///
    /// Returns `None` near the center, where the conversion is undefined.
    #[must_use]
    pub fn cartesian_to_cartographic(&self, point: &Point3) -> Option<Cartographic> {
        let surface = self.scale_to_geodetic_surface(point)?;
        let n = self.geodetic_surface_normal(&surface)?;
        let h = point - surface;
        let longitude = n.y.atan2(n.x);
        let latitude = n.z.clamp(-1.0, 1.0).asin();
        let height = h.dot(&point.coords).signum() * h.norm();
        Some(Cartographic::new(longitude, latitude, height))
    }

    /// Projects `point` onto the surface along the geodetic normal.
    ///
    /// Uses Newton's method on the normal multiplier. Returns `None` when the
    /// point is at the center.
    #[must_use]
    #[allow(clippy::similar_names)]
    pub fn scale_to_geodetic_surface(&self, point: &Point3) -> Option<Point3> {
        let p = point.coords;
        let inv = self.one_over_radii;
        let inv_sq = self.one_over_radii_squared;

        let x2 = p.x * p.x * inv.x * inv.x;
        let y2 = p.y * p.y * inv.y * inv.y;
        let z2 = p.z * p.z * inv.z * inv.z;

        let squared_norm = x2 + y2 + z2;
        let ratio = (1.0 / squared_norm).sqrt();
        if !ratio.is_finite() {
            return None;
        }

        // Radial intersection as the initial guess.
        let intersection = p * ratio;
        if squared_norm < CENTER_TOLERANCE_SQUARED {
            return Some(Point3::from(intersection));
        }

        let gradient = intersection.component_mul(&inv_sq) * 2.0;
        let mut lambda = (1.0 - ratio) * p.norm() / (0.5 * gradient.norm());
        let mut correction = 0.0;
        let mut multiplier = Vector3::new(1.0, 1.0, 1.0);

        for _ in 0..MAX_SURFACE_ITERATIONS {
            lambda -= correction;
            multiplier = inv_sq.map(|s| 1.0 / (1.0 + lambda * s));

            let m2 = multiplier.component_mul(&multiplier);
            let m3 = m2.component_mul(&multiplier);

            let func = x2 * m2.x + y2 * m2.y + z2 * m2.z - 1.0;
            if func.abs() <= EPSILON12 {
                break;
            }

            let denominator = x2 * m3.x * inv_sq.x + y2 * m3.y * inv_sq.y + z2 * m3.z * inv_sq.z;
            correction = func / (-2.0 * denominator);
        }

        Some(Point3::from(p.component_mul(&multiplier)))
    }

    /// Projects `point` onto the surface, then raises it by `height` along
    /// the surface normal.
    #[must_use]
    pub fn scale_to_geodetic_height(&self, point: &Point3, height: f64) -> Option<Point3> {
        let surface = self.scale_to_geodetic_surface(point)?;
        let normal = self.geodetic_surface_normal(&surface)?;
        Some(surface + normal * height)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::wgs84()
    }
}
