//! Contour geometry: polygon moments, arc length, bounding boxes and
//! Douglas–Peucker simplification.
//!
//! Everything here treats a contour as a closed polygon through its points,
//! so a traced square of `n` pixels per side has area `(n - 1)^2`.

use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::types::{Point2D, Rect};

/// Raw spatial moments of a closed polygon, up to first order.
///
/// Moments are taken with positive orientation whatever the winding of the
/// input, so `m00` is the enclosed area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl ContourMoments {
    pub fn of(points: &[Point2D]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        // Green's theorem first moments; `winding` flips them to positive orientation
        let mut winding = 0.0f64;
        let mut sx = 0.0f64;
        let mut sy = 0.0f64;
        for (p, q) in points.iter().zip(points.iter().cycle().skip(1)) {
            let (x0, y0) = (p.x as f64, p.y as f64);
            let (x1, y1) = (q.x as f64, q.y as f64);
            let cross = x0 * y1 - x1 * y0;
            winding += cross;
            sx += (x0 + x1) * cross;
            sy += (y0 + y1) * cross;
        }
        let sign = if winding < 0.0 { -1.0 } else { 1.0 };

        Self {
            m00: imageproc::geometry::contour_area(&to_imageproc(points)),
            m10: sign * sx / 6.0,
            m01: sign * sy / 6.0,
        }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.m00
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.m00 <= f64::EPSILON
    }

    /// Centroid truncated toward zero, or [`Point2D::UNDEFINED`] for a
    /// zero-area polygon.
    pub fn centroid(&self) -> Point2D {
        if self.is_degenerate() {
            return Point2D::UNDEFINED;
        }
        Point2D {
            x: (self.m10 / self.m00) as i32,
            y: (self.m01 / self.m00) as i32,
        }
    }
}

/// Total length of the polyline; `closed` adds the segment back to the start.
pub fn arc_length(points: &[Point2D], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    imageproc::geometry::arc_length(&to_imageproc(points), closed)
}

/// Inclusive bounding box; zero-sized for an empty slice.
pub fn bounding_rect(points: &[Point2D]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect {
        x: min_x,
        y: min_y,
        w: (max_x - min_x) as u32 + 1,
        h: (max_y - min_y) as u32 + 1,
    }
}

/// Simplify a closed curve with Douglas–Peucker.
///
/// The ring is split at a pair of mutually distant points (the point farthest
/// from the first one, then the point farthest from that), so the result does
/// not depend on where tracing started. Each arc keeps the points deviating
/// more than `epsilon` from its chord, and a last pass drops vertices lying
/// within `epsilon` of the line through their neighbours. Vertices come out in
/// input order.
pub fn approximate_polygon(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let first = farthest_from(points, points[0]);
    let second = farthest_from(points, points[first]);
    if squared_distance(points[first], points[second]) == 0.0 {
        return vec![points[0]];
    }
    let (lo, hi) = (first.min(second), first.max(second));

    // ring positions run past `n` and wrap back onto the input
    let at = |i: usize| points[i % n];
    let mut keep = vec![false; n];
    keep[lo] = true;
    keep[hi] = true;

    let mut stack = vec![(lo, hi), (hi, lo + n)];
    while let Some((a, b)) = stack.pop() {
        if b <= a + 1 {
            continue;
        }
        let (pa, pb) = (at(a), at(b));
        let mut best = (a, 0.0f64);
        for i in a + 1..b {
            let d = segment_line_distance(at(i), pa, pb);
            if d > best.1 {
                best = (i, d);
            }
        }
        if best.1 > epsilon {
            keep[best.0 % n] = true;
            stack.push((a, best.0));
            stack.push((best.0, b));
        }
    }

    let mut poly: Vec<Point2D> = (0..n).filter(|&i| keep[i]).map(|i| points[i]).collect();
    drop_flat_vertices(&mut poly, epsilon);
    poly
}

/// Remove vertices within `epsilon` of the line through their ring
/// neighbours, until none is left or only a triangle remains.
fn drop_flat_vertices(poly: &mut Vec<Point2D>, epsilon: f64) {
    let mut i = 0;
    let mut since_removal = 0;
    while poly.len() > 3 && since_removal < poly.len() {
        let len = poly.len();
        let prev = poly[(i + len - 1) % len];
        let next = poly[(i + 1) % len];
        if segment_line_distance(poly[i], prev, next) <= epsilon {
            poly.remove(i);
            since_removal = 0;
            if i >= poly.len() {
                i = 0;
            }
        } else {
            since_removal += 1;
            i = (i + 1) % len;
        }
    }
}

fn farthest_from(points: &[Point2D], origin: Point2D) -> usize {
    let mut best = (0, 0.0f64);
    for (i, &p) in points.iter().enumerate() {
        let d = squared_distance(origin, p);
        if d > best.1 {
            best = (i, d);
        }
    }
    best.0
}

fn to_imageproc(points: &[Point2D]) -> Vec<Point<i32>> {
    points.iter().map(|p| Point::new(p.x, p.y)).collect()
}

#[inline]
fn squared_distance(a: Point2D, b: Point2D) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx * dx + dy * dy
}

#[inline]
fn distance(a: Point2D, b: Point2D) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Distance from `p` to the line through `a` and `b` (to `a` when they coincide).
fn segment_line_distance(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let len = distance(a, b);
    if len == 0.0 {
        return distance(p, a);
    }
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let cross = dx * (p.y - a.y) as f64 - dy * (p.x - a.x) as f64;
    cross.abs() / len
}
