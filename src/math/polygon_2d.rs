use super::{Point2, TOLERANCE};

/// Orientation of a closed 2D polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindingOrder {
    Clockwise,
    CounterClockwise,
}

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns the winding order of a polygon. Degenerate polygons count as
/// counter-clockwise.
#[must_use]
pub fn winding_order_2d(points: &[Point2]) -> WindingOrder {
    if signed_area_2d(points) >= 0.0 {
        WindingOrder::CounterClockwise
    } else {
        WindingOrder::Clockwise
    }
}

/// Returns the polygon wound counter-clockwise, reversing clockwise input.
#[must_use]
pub fn to_counter_clockwise(points: Vec<Point2>) -> Vec<Point2> {
    match winding_order_2d(&points) {
        WindingOrder::CounterClockwise => points,
        WindingOrder::Clockwise => points.into_iter().rev().collect(),
    }
}

/// Removes duplicate neighbours of a closed polygon, including a last vertex
/// that repeats the first.
#[must_use]
pub fn remove_duplicates_from_shape(points: &[Point2]) -> Vec<Point2> {
    let n = points.len();
    let mut cleaned = Vec::with_capacity(n);
    for i in 0..n {
        let prev = &points[(i + n - 1) % n];
        let curr = &points[i];
        if (curr - prev).norm() > TOLERANCE {
            cleaned.push(*curr);
        }
    }
    cleaned
}

/// Axis-aligned bounds of a 2D point set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingRectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRectangle {
    /// Computes the bounds of `points`; empty input yields a zero rectangle.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Returns the center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&square());
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let pts: Vec<Point2> = square().into_iter().rev().collect();
        let area = signed_area_2d(&pts);
        assert!((area + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!((signed_area_2d(&[Point2::new(0.0, 0.0)])).abs() < TOLERANCE);
        assert!((signed_area_2d(&[])).abs() < TOLERANCE);
    }

    #[test]
    fn clockwise_is_reversed() {
        let cw: Vec<Point2> = square().into_iter().rev().collect();
        assert_eq!(winding_order_2d(&cw), WindingOrder::Clockwise);
        assert_eq!(to_counter_clockwise(cw), square());
    }

    #[test]
    fn counter_clockwise_is_kept() {
        assert_eq!(winding_order_2d(&square()), WindingOrder::CounterClockwise);
        assert_eq!(to_counter_clockwise(square()), square());
    }

    #[test]
    fn closing_vertex_is_removed() {
        let mut pts = square();
        pts.push(Point2::new(0.0, 0.0));
        let cleaned = remove_duplicates_from_shape(&pts);
        assert_eq!(cleaned, square());
    }

    #[test]
    fn repeated_vertex_collapses() {
        let x = Point2::new(1.0, 0.0);
        assert!(remove_duplicates_from_shape(&[x, x, x]).is_empty());
        assert_eq!(remove_duplicates_from_shape(&[x, x, Point2::origin()]).len(), 2);
    }

    #[test]
    fn bounding_rectangle_of_offset_box() {
        let pts = vec![
            Point2::new(-2.0, 1.0),
            Point2::new(4.0, 1.0),
            Point2::new(4.0, 3.0),
        ];
        let rect = BoundingRectangle::from_points(&pts);
        assert!((rect.x + 2.0).abs() < TOLERANCE);
        assert!((rect.y - 1.0).abs() < TOLERANCE);
        assert!((rect.width - 6.0).abs() < TOLERANCE);
        assert!((rect.height - 2.0).abs() < TOLERANCE);
        let c = rect.center();
        assert!((c.x - 1.0).abs() < TOLERANCE);
        assert!((c.y - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn bounding_rectangle_of_nothing() {
        assert_eq!(BoundingRectangle::from_points(&[]), BoundingRectangle::default());
    }
}
