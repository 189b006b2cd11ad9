//! Polygon helpers shared by the region builder and the compositor.

use crate::types::{Point, Region};

/// Calculate the area of a polygon using the shoelace formula.
pub fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = points.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }

    (area / 2.0).abs()
}

/// Mean of the polygon's vertices. `None` for an empty point list.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Point::zero(), |acc, p| acc + *p);
    Some(sum * (1.0 / points.len() as f32))
}

/// A copy of `region` scaled by `factor` about its centroid.
///
/// Factors above 1.0 enlarge the polygon. The input is left untouched.
pub fn scaled_about_centroid(region: &Region, factor: f32) -> Region {
    let Some(c) = centroid(&region.points) else {
        return region.clone();
    };
    Region::new(
        region
            .points
            .iter()
            .map(|p| c + (*p - c) * factor)
            .collect(),
    )
}

/// The part of segment `a`-`b` inside the axis-aligned box `min`..`max`.
///
/// `None` when the segment misses the box or has a non-finite coordinate. A
/// zero-length segment is kept when its point lies in the box.
pub fn clip_segment(a: Point, b: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
        return None;
    }

    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let edges = [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Whether the closed polygon has no two non-adjacent edges that cross.
pub fn is_simple(points: &[Point]) -> bool {
    let n = points.len();
    if n < 4 {
        return true;
    }

    for i in 0..n {
        let a1 = points[i];
        let a2 = points[(i + 1) % n];
        for j in (i + 1)..n {
            // Edges sharing a vertex always touch; skip them.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let b1 = points[j];
            let b2 = points[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

fn cross(o: Point, a: Point, b: Point) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, p1, q2))
        || (d2 == 0.0 && on_segment(q1, p2, q2))
        || (d3 == 0.0 && on_segment(p1, q1, p2))
        || (d4 == 0.0 && on_segment(p1, q2, p2))
}
