//! Shared geometry utilities.

use std::f64::consts::PI;

use kurbo::{Point, Rect};

/// Angle of the line from `a` to `b`, in (-pi, pi].
pub fn slope_angle(a: Point, b: Point) -> f64 {
    (b - a).atan2()
}

/// Unsigned circular difference between two angles, in [0, pi].
pub fn angular_difference(alpha: f64, beta: f64) -> f64 {
    let mut diff = (alpha - beta).abs();
    while diff > PI {
        diff = 2.0 * PI - diff;
    }
    diff.abs()
}

/// Signed circular difference `alpha - beta`, wrapped into (-pi, pi].
///
/// Inputs are expected in (-pi, pi] (as produced by [`slope_angle`]).
pub fn signed_angular_difference(alpha: f64, beta: f64) -> f64 {
    let diff = alpha - beta;
    if diff > PI {
        alpha - (beta + 2.0 * PI)
    } else if diff < -PI {
        (alpha + 2.0 * PI) - beta
    } else {
        diff
    }
}

/// Catmull-Rom interpolation between `p1` and `p2` at `t` in [0, 1].
pub fn catmull_rom(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let axis = |a: f64, b: f64, c: f64, d: f64| {
        0.5 * ((-a + 3.0 * b - 3.0 * c + d) * t3
            + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
            + (-a + c) * t
            + 2.0 * b)
    };
    Point::new(
        axis(p0.x, p1.x, p2.x, p3.x),
        axis(p0.y, p1.y, p2.y, p3.y),
    )
}

/// Bounding box of a non-empty point list.
///
/// Returns a zero-size rect at the origin for an empty slice.
pub fn bounds_of(points: &[Point]) -> Rect {
    let Some(&first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .fold(Rect::from_points(first, first), |rect, &p| rect.union_pt(p))
}

/// Length of the diagonal of a box.
pub fn diagonal(rect: Rect) -> f64 {
    rect.width().hypot(rect.height())
}

/// Smallest square centered on `rect` that contains it.
pub fn squared(rect: Rect) -> Rect {
    let width = rect.width();
    let height = rect.height();
    if width > height {
        let y0 = rect.center().y - width / 2.0;
        Rect::new(rect.x0, y0, rect.x1, y0 + width)
    } else {
        let x0 = rect.center().x - height / 2.0;
        Rect::new(x0, rect.y0, x0 + height, rect.y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angular_difference_wraps() {
        let d = angular_difference(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-12);
        assert!((angular_difference(0.3, -0.2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn signed_difference_wraps() {
        let d = signed_angular_difference(-PI + 0.1, PI - 0.1);
        assert!((d - 0.2).abs() < 1e-12);
        let d = signed_angular_difference(PI - 0.1, -PI + 0.1);
        assert!((d + 0.2).abs() < 1e-12);
    }

    #[test]
    fn catmull_rom_hits_control_points() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 1.0),
        ];
        assert_eq!(catmull_rom(p[0], p[1], p[2], p[3], 0.0), p[1]);
        let end = catmull_rom(p[0], p[1], p[2], p[3], 1.0);
        assert!((end - p[2]).hypot() < 1e-12);
    }

    #[test]
    fn squared_box_is_centered() {
        let sq = squared(Rect::new(-1.0, 0.0, 1.0, 0.0));
        assert_eq!(sq, Rect::new(-1.0, -1.0, 1.0, 1.0));
        let sq = squared(Rect::new(0.0, 0.0, 2.0, 4.0));
        assert_eq!(sq, Rect::new(-1.0, 0.0, 3.0, 4.0));
    }
}
