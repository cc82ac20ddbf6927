//! Builds sample corridor and polyline volume outlines and logs their sizes.
//!
//! Usage:
//! ```text
//! cargo run --example outline
//! RUST_LOG=corridor_outline=trace cargo run --example outline
//! ```

use corridor_outline::math::Point2;
use corridor_outline::{
    CornerType, CorridorOutline, CorridorOutlineOptions, Ellipsoid, OutlineError, Packable,
    PolylineVolumeOutline, PolylineVolumeOutlineOptions,
};

fn main() -> Result<(), OutlineError> {
    // Default: WARN for everything, INFO for this crate and the demo.
    // Override with RUST_LOG.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("outline=info".parse().unwrap_or_default())
        .add_directive("corridor_outline=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let ellipsoid = Ellipsoid::wgs84();
    let zig_zag =
        ellipsoid.cartesian_array_from_degrees(&[90.0, -30.0, 90.0, -31.0, 89.0, -31.0, 89.0, -32.0]);

    for corner_type in [CornerType::Rounded, CornerType::Mitered, CornerType::Beveled] {
        let corridor = CorridorOutline::new(CorridorOutlineOptions {
            positions: Some(zig_zag.clone()),
            width: Some(30_000.0),
            extruded_height: Some(20_000.0),
            corner_type,
            ..Default::default()
        })?;
        match corridor.create_geometry() {
            Some(geometry) => tracing::info!(
                ?corner_type,
                vertices = geometry.vertex_count(),
                lines = geometry.line_count(),
                radius = geometry.bounding_sphere.radius,
                "corridor outline"
            ),
            None => tracing::warn!(?corner_type, "corridor outline is degenerate"),
        }
    }

    let square = vec![
        Point2::new(-10_000.0, -10_000.0),
        Point2::new(10_000.0, -10_000.0),
        Point2::new(10_000.0, 10_000.0),
        Point2::new(-10_000.0, 10_000.0),
    ];
    let volume = PolylineVolumeOutline::new(PolylineVolumeOutlineOptions {
        polyline_positions: Some(zig_zag),
        shape_positions: Some(square),
        ..Default::default()
    })?;

    // Round trip through the transfer buffer before building.
    let packed = volume.to_packed()?;
    let volume = PolylineVolumeOutline::unpack(&packed, 0)?;
    match volume.create_geometry() {
        Some(geometry) => tracing::info!(
            packed = packed.len(),
            vertices = geometry.vertex_count(),
            lines = geometry.line_count(),
            "polyline volume outline"
        ),
        None => tracing::warn!("polyline volume outline is degenerate"),
    }
    Ok(())
}
