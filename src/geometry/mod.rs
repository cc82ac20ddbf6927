mod bounding_sphere;
mod corner_type;
mod outline_geometry;

pub use bounding_sphere::BoundingSphere;
pub use corner_type::CornerType;
pub use outline_geometry::OutlineGeometry;
