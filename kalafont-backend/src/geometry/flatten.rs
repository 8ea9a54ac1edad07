//! Contour flattening and ring cleanup.
//!
//! Turns a decoded TrueType contour (on/off-curve points) into a closed
//! polygonal ring: implied on-curve points are restored, every quadratic
//! segment is sampled at a fixed resolution, and the ring is deduplicated,
//! de-colinearized and reoriented counter-clockwise.

use super::{signed_area, triangle_area, Point, EPSILON};
use crate::glyf::{Contour, GlyphPoint};

/// Samples per quadratic segment.
pub const CURVE_RESOLUTION: u32 = 16;

/// Flattens one contour into a polygonal ring (not yet cleaned).
pub fn flatten_contour(contour: &Contour) -> Vec<Point> {
    let n = contour.len();
    if n == 0 {
        return Vec::new();
    }

    // Restore the implied on-curve points so the ring strictly alternates:
    // a virtual start when the contour begins off-curve, and a midpoint
    // between every pair of consecutive off-curve points.
    let mut ring: Vec<GlyphPoint> = Vec::with_capacity(n * 2);
    let starts_off = !contour[0].on_curve;
    if starts_off {
        let (first, last) = (contour[0], contour[n - 1]);
        ring.push(GlyphPoint {
            x: (first.x + last.x) * 0.5,
            y: (first.y + last.y) * 0.5,
            on_curve: true,
        });
    }
    for i in 0..n {
        let current = contour[i];
        ring.push(current);
        let next = contour[(i + 1) % n];
        let wraps = i == n - 1;
        if !current.on_curve && !next.on_curve && !(wraps && starts_off) {
            ring.push(GlyphPoint {
                x: (current.x + next.x) * 0.5,
                y: (current.y + next.y) * 0.5,
                on_curve: true,
            });
        }
    }

    // Walk the rewritten ring. Every segment is either a line between two
    // on-curve points or a quadratic (on, off, on).
    let len = ring.len();
    let mut polygon: Vec<Point> = Vec::with_capacity(len * CURVE_RESOLUTION as usize);
    let mut push = |polygon: &mut Vec<Point>, p: Point| {
        if polygon.last() != Some(&p) {
            polygon.push(p);
        }
    };
    let mut i = 0;
    while i < len {
        let a = ring[i];
        let start = Point::new(a.x, a.y);
        let control = ring[(i + 1) % len];
        if control.on_curve {
            push(&mut polygon, start);
            i += 1;
        } else {
            let end = ring[(i + 2) % len];
            push(&mut polygon, start);
            for step in 1..CURVE_RESOLUTION {
                let t = step as f32 / CURVE_RESOLUTION as f32;
                let u = 1.0 - t;
                let x = u * u * a.x + 2.0 * u * t * control.x + t * t * end.x;
                let y = u * u * a.y + 2.0 * u * t * control.y + t * t * end.y;
                push(&mut polygon, Point::new(x, y));
            }
            // The t = 1 sample is the next segment's start point.
            i += 2;
        }
    }
    if polygon.len() > 1 && polygon.last() == polygon.first() {
        polygon.pop();
    }
    polygon
}

/// Cleans a flattened ring and orients it counter-clockwise.
///
/// Cleanup that would leave fewer than three vertices keeps the uncleaned
/// ring instead.
pub fn clean_ring(ring: &[Point]) -> Vec<Point> {
    let mut cleaned = dedup(ring);
    drop_colinear(&mut cleaned);

    let mut result = if cleaned.len() < 3 {
        ring.to_vec()
    } else {
        cleaned
    };
    if signed_area(&result) < 0.0 {
        result.reverse();
    }
    result
}

/// Removes consecutive duplicates, including across the ring seam.
fn dedup(ring: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for &p in ring {
        if !out.last().is_some_and(|&kept| kept.coincident(p, EPSILON)) {
            out.push(p);
        }
    }
    while out.len() > 1 {
        let (first, last) = (out[0], out[out.len() - 1]);
        if first.coincident(last, EPSILON) {
            out.pop();
        } else {
            break;
        }
    }
    out
}

/// Removes vertices whose neighbors are colinear with them, never going
/// below three vertices.
fn drop_colinear(ring: &mut Vec<Point>) {
    let mut changed = true;
    while changed && ring.len() > 3 {
        changed = false;
        let mut i = 0;
        while i < ring.len() && ring.len() > 3 {
            let n = ring.len();
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            if triangle_area(prev, ring[i], next).abs() < EPSILON {
                ring.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }
}
