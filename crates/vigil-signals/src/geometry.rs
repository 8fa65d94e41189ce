//! Pure geometry on landmark point sets.

/// A 2D point `[x, y]` in image coordinates.
pub type Point = [f32; 2];

/// Arithmetic mean of a point set, `None` when the set is empty.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p[0], sy + p[1]));
    Some([sx / n, sy / n])
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

#[inline]
pub fn midpoint(a: Point, b: Point) -> Point {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

/// Denominator guard: zero (or non-finite) becomes 1.
#[inline]
pub fn non_zero_or_one(d: f32) -> f32 {
    if d == 0.0 || !d.is_finite() {
        1.0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centroid_of_square() {
        let pts = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        let c = centroid(&pts).unwrap();
        assert_relative_eq!(c[0], 1.0);
        assert_relative_eq!(c[1], 1.0);
    }

    #[test]
    fn test_centroid_empty() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_distance_and_midpoint() {
        assert_relative_eq!(distance([0.0, 0.0], [3.0, 4.0]), 5.0);
        assert_eq!(midpoint([0.0, 0.0], [4.0, 2.0]), [2.0, 1.0]);
    }

    #[test]
    fn test_denominator_guard() {
        assert_eq!(non_zero_or_one(0.0), 1.0);
        assert_eq!(non_zero_or_one(f32::NAN), 1.0);
        assert_eq!(non_zero_or_one(2.5), 2.5);
    }
}
