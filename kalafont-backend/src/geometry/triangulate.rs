//! Fill classification and ear-clipping triangulation.
//!
//! Rings arrive cleaned and counter-clockwise. Containment depth splits
//! them into outers and holes (even-odd fill); each outer is merged with
//! its holes through bridge edges and ear-clipped; triangles that land
//! inside a hole are rejected as a final defensive filter.

use super::{
    centroid, point_in_triangle, ring_contains, signed_area, triangle_area, Point, EPSILON,
};
use crate::error::{Error, Result};

/// Defensive cap on ring nesting depth.
pub const MAX_NESTING_DEPTH: u32 = 32;

/// Triangulates a glyph's rings into one vertex array and one index list.
pub fn triangulate_rings(rings: &[Vec<Point>], glyph_id: u16) -> Result<(Vec<Point>, Vec<u32>)> {
    let n = rings.len();
    if n == 0 {
        return Ok((Vec::new(), Vec::new()));
    }

    // Parent of ring i: the smallest-|area| ring containing i's centroid.
    // Only strictly larger rings qualify, which keeps the relation acyclic
    // even for concentric rings whose centroids coincide.
    let areas: Vec<f32> = rings.iter().map(|r| signed_area(r).abs()).collect();
    let mut parent: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        let c = centroid(&rings[i]);
        let mut best: Option<usize> = None;
        for j in 0..n {
            if j == i || areas[j] <= areas[i] || !ring_contains(&rings[j], c) {
                continue;
            }
            if best.is_none_or(|b| areas[j] < areas[b]) {
                best = Some(j);
            }
        }
        parent[i] = best;
    }

    let mut depth = vec![0u32; n];
    for i in 0..n {
        let mut d = 0;
        let mut link = parent[i];
        while let Some(up) = link {
            d += 1;
            if d > MAX_NESTING_DEPTH {
                return Err(Error::MalformedGlyph {
                    glyph: glyph_id,
                    reason: "ring nesting depth",
                });
            }
            link = parent[up];
        }
        depth[i] = d;
    }

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for outer in 0..n {
        if depth[outer] % 2 != 0 {
            continue; // odd depth: a hole, handled with its outer
        }
        let holes: Vec<&[Point]> = (0..n)
            .filter(|&j| parent[j] == Some(outer) && depth[j] % 2 == 1)
            .map(|j| rings[j].as_slice())
            .collect();

        let merged = if holes.is_empty() {
            rings[outer].clone()
        } else {
            merge_holes(&rings[outer], &holes)
        };
        let local = ear_clip(&merged, glyph_id)?;

        let base = vertices.len() as u32;
        for triangle in local.chunks_exact(3) {
            let (a, b, c) = (
                merged[triangle[0] as usize],
                merged[triangle[1] as usize],
                merged[triangle[2] as usize],
            );
            let center = Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            if holes.iter().any(|hole| ring_contains(hole, center)) {
                continue;
            }
            indices.extend(triangle.iter().map(|&v| v + base));
        }
        vertices.extend_from_slice(&merged);
    }

    Ok((vertices, indices))
}

/// Joins every hole to the outer ring with a pair of bridge edges, producing
/// one simple ring that ear clipping can consume directly.
///
/// Holes are processed right-to-left by their rightmost vertex; each bridge
/// connects that vertex to a visible vertex of the ring built so far.
fn merge_holes(outer: &[Point], holes: &[&[Point]]) -> Vec<Point> {
    let mut order: Vec<usize> = (0..holes.len()).collect();
    let rightmost = |hole: &[Point]| -> usize {
        let mut best = 0;
        for (i, p) in hole.iter().enumerate() {
            if p.x > hole[best].x {
                best = i;
            }
        }
        best
    };
    order.sort_by(|&a, &b| {
        let xa = holes[a][rightmost(holes[a])].x;
        let xb = holes[b][rightmost(holes[b])].x;
        xb.total_cmp(&xa)
    });

    let mut merged = outer.to_vec();
    for &h in &order {
        let hole = holes[h];
        let mi = rightmost(hole);
        let bridge = find_bridge(&merged, hole[mi]);

        // merged[..=bridge], then the hole walked clockwise starting and
        // ending at its rightmost vertex, then back to the bridge vertex.
        let mut next = Vec::with_capacity(merged.len() + hole.len() + 2);
        next.extend_from_slice(&merged[..=bridge]);
        for step in 0..=hole.len() {
            next.push(hole[(mi + hole.len() - (step % hole.len())) % hole.len()]);
        }
        next.extend_from_slice(&merged[bridge..]);
        merged = next;
    }
    merged
}

/// Finds the ring vertex a hole's rightmost vertex can be bridged to: cast a
/// ray towards +x, take the nearest crossed edge, then prefer any reflex
/// vertex inside the triangle between the hole vertex, the intersection and
/// the edge's candidate endpoint (closest angular fit wins).
fn find_bridge(ring: &[Point], from: Point) -> usize {
    let n = ring.len();
    let mut best_x = f32::INFINITY;
    let mut candidate = 0usize;
    let mut found = false;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if (a.y > from.y) == (b.y > from.y) {
            continue;
        }
        let x = a.x + (from.y - a.y) * (b.x - a.x) / (b.y - a.y);
        if x >= from.x - EPSILON && x < best_x {
            best_x = x;
            candidate = if a.x > b.x { i } else { (i + 1) % n };
            found = true;
        }
    }
    if !found {
        // No crossing edge; fall back to the rightmost ring vertex.
        let mut best = 0;
        for i in 0..n {
            if ring[i].x > ring[best].x {
                best = i;
            }
        }
        return best;
    }

    let hit = Point::new(best_x, from.y);
    let mut best_tan = f32::INFINITY;
    for i in 0..n {
        let p = ring[i];
        if p.x < from.x || p.coincident(ring[candidate], EPSILON) {
            continue;
        }
        if !point_in_triangle(p, from, hit, ring[candidate], EPSILON)
            && !point_in_triangle(p, from, ring[candidate], hit, EPSILON)
        {
            continue;
        }
        // A vertex inside the visibility triangle can occlude the bridge;
        // prefer the one closest to the ray.
        let dx = p.x - from.x;
        if dx <= EPSILON {
            continue;
        }
        let tan = (p.y - from.y).abs() / dx;
        if tan < best_tan {
            best_tan = tan;
            candidate = i;
        }
    }
    candidate
}

/// Ear-clipping triangulation of one simple counter-clockwise ring.
///
/// When a pass finds no ear the least significant vertex is dropped; the
/// watchdog bounds the total work and turns exhaustion into
/// `DegenerateGlyph`.
fn ear_clip(ring: &[Point], glyph_id: u16) -> Result<Vec<u32>> {
    let n = ring.len();
    if n < 3 {
        return Ok(Vec::new());
    }

    let mut active: Vec<u32> = (0..n as u32).collect();
    let mut triangles = Vec::with_capacity((n - 2) * 3);
    let mut watchdog = 3 * n;

    while active.len() >= 3 {
        if watchdog == 0 {
            return Err(Error::DegenerateGlyph(glyph_id));
        }
        watchdog -= 1;

        let mut clipped = false;
        for i in 0..active.len() {
            let len = active.len();
            let prev = active[(i + len - 1) % len];
            let cur = active[i];
            let next = active[(i + 1) % len];
            let (a, b, c) = (
                ring[prev as usize],
                ring[cur as usize],
                ring[next as usize],
            );
            if triangle_area(a, b, c) <= EPSILON {
                continue; // reflex or flat corner
            }
            let blocked = active.iter().any(|&j| {
                if j == prev || j == cur || j == next {
                    return false;
                }
                let p = ring[j as usize];
                // Bridge seams duplicate coordinates; a copy of an ear
                // corner never blocks the ear.
                if p.coincident(a, EPSILON) || p.coincident(b, EPSILON) || p.coincident(c, EPSILON)
                {
                    return false;
                }
                point_in_triangle(p, a, b, c, EPSILON)
            });
            if blocked {
                continue;
            }
            triangles.extend([prev, cur, next]);
            active.remove(i);
            clipped = true;
            break;
        }

        if !clipped {
            // Near-colinear remainder: drop the vertex contributing the
            // least area and try again.
            let mut least = 0;
            let mut least_area = f32::INFINITY;
            for i in 0..active.len() {
                let len = active.len();
                let a = ring[active[(i + len - 1) % len] as usize];
                let b = ring[active[i] as usize];
                let c = ring[active[(i + 1) % len] as usize];
                let area = triangle_area(a, b, c).abs();
                if area < least_area {
                    least_area = area;
                    least = i;
                }
            }
            active.remove(least);
        }
    }

    Ok(triangles)
}
