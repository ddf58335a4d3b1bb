//! Planar polygon and segment helpers
//!
//! Territories are stored as point rings that are implicitly closed. Helpers
//! that need an explicit closing point say so; degenerate input (fewer than
//! three points) never panics, it yields `false`, `0.0` or the input back.

use glam::Vec2;

use crate::polar_to_cartesian;

/// Ray-casting parity test.
///
/// Points exactly on an edge may land on either side.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Strict interior crossing of segments `a1-a2` and `b1-b2`.
///
/// Parallel or collinear segments never intersect, and touching at an
/// endpoint does not count: trails legitimately meet at their joints.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let den = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if den == 0.0 {
        return false;
    }

    let ua = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / den;
    let ub = ((a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x)) / den;

    ua > 0.0 && ua < 1.0 && ub > 0.0 && ub < 1.0
}

/// Unsigned shoelace area. The ring must be closed (first == last).
pub fn polygon_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    // Accumulate in f64: territories reach thousands of vertices
    let twice: f64 = points
        .windows(2)
        .map(|w| w[0].x as f64 * w[1].y as f64 - w[1].x as f64 * w[0].y as f64)
        .sum();
    (twice.abs() / 2.0) as f32
}

/// Append the first point when the ring is not already closed.
pub fn close_polygon(points: &[Vec2]) -> Vec<Vec2> {
    let mut closed = points.to_vec();
    if points.len() < 3 {
        return closed;
    }
    let (first, last) = (points[0], points[points.len() - 1]);
    if first != last {
        closed.push(first);
    }
    closed
}

/// Vertex average of a ring
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Drop points closer than `sqrt(threshold_sq)` to the last kept point.
///
/// The closing point snaps onto the start instead of being appended next to
/// it. If fewer than three distinct points survive, the closed input is
/// returned unchanged.
pub fn simplify_polygon(points: &[Vec2], threshold_sq: f32) -> Vec<Vec2> {
    let closed = close_polygon(points);
    if closed.len() < 4 {
        return closed;
    }

    let first = closed[0];
    let mut kept = vec![first];
    for &p in &closed[1..closed.len() - 1] {
        let last = kept[kept.len() - 1];
        if p.distance_squared(last) >= threshold_sq {
            kept.push(p);
        }
    }

    let last_idx = kept.len() - 1;
    if last_idx > 0 && kept[last_idx].distance_squared(first) < threshold_sq {
        kept[last_idx] = first;
    } else {
        kept.push(first);
    }

    // kept carries the closing duplicate
    if kept.len() < 4 {
        return closed;
    }
    kept
}

/// Chaikin corner cutting, re-closed after every pass.
pub fn smooth_polygon(points: &[Vec2], iterations: usize) -> Vec<Vec2> {
    let mut current = close_polygon(points);
    if current.len() < 4 {
        return current;
    }

    for _ in 0..iterations {
        let mut next = Vec::with_capacity((current.len() - 1) * 2 + 1);
        for edge in current.windows(2) {
            next.push(edge[0].lerp(edge[1], 0.25));
            next.push(edge[0].lerp(edge[1], 0.75));
        }
        current = close_polygon(&next);
    }
    current
}

/// Regular polygon approximating a circle (open ring, `segments` points)
pub fn circle_polygon(center: Vec2, radius: f32, segments: usize) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let theta = i as f32 / segments as f32 * std::f32::consts::TAU;
            center + polar_to_cartesian(radius, theta)
        })
        .collect()
}

/// Closest point to `p` on segment `a-b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point to `p` on the (implicitly closed) ring boundary
pub fn closest_point_on_polygon(p: Vec2, polygon: &[Vec2]) -> Vec2 {
    match polygon.len() {
        0 => return p,
        1 => return polygon[0],
        _ => {}
    }

    let mut best = polygon[0];
    let mut best_dist = f32::INFINITY;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        let candidate = closest_point_on_segment(p, a, b);
        let dist = candidate.distance_squared(p);
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    }
    best
}

/// True when every coordinate is finite
pub fn all_finite(points: &[Vec2]) -> bool {
    points.iter().all(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_point_in_square() {
        let sq = square();
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &sq));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &sq));
        assert!(!point_in_polygon(Vec2::new(-1.0, -1.0), &sq));
    }

    #[test]
    fn test_point_in_degenerate_polygon() {
        let line = [Vec2::ZERO, Vec2::new(10.0, 10.0)];
        assert!(!point_in_polygon(Vec2::new(5.0, 5.0), &line));
        assert!(!point_in_polygon(Vec2::ZERO, &[]));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upward
        let u = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(9.0, 0.0),
            Vec2::new(9.0, 9.0),
            Vec2::new(6.0, 9.0),
            Vec2::new(6.0, 3.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(3.0, 9.0),
            Vec2::new(0.0, 9.0),
        ];
        assert!(point_in_polygon(Vec2::new(1.5, 6.0), &u));
        assert!(!point_in_polygon(Vec2::new(4.5, 6.0), &u));
        assert!(point_in_polygon(Vec2::new(4.5, 1.5), &u));
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_parallel_segments() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        ));
    }

    #[test]
    fn test_shared_endpoint_is_not_crossing() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_collinear_overlap_is_not_crossing() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(9.0, 0.0),
        ));
    }

    #[test]
    fn test_area_of_closed_square() {
        let closed = close_polygon(&square());
        assert_eq!(closed.len(), 5);
        assert!((polygon_area(&closed) - 100.0).abs() < 1e-3);
        // Orientation does not matter
        let mut reversed = closed.clone();
        reversed.reverse();
        assert!((polygon_area(&reversed) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_area_degenerate() {
        assert_eq!(polygon_area(&[Vec2::ZERO, Vec2::X]), 0.0);
    }

    #[test]
    fn test_close_polygon_noop_cases() {
        let closed = close_polygon(&square());
        assert_eq!(close_polygon(&closed), closed);

        let short = vec![Vec2::ZERO, Vec2::X];
        assert_eq!(close_polygon(&short), short);
    }

    #[test]
    fn test_centroid_of_square() {
        assert_eq!(centroid(&square()), Vec2::new(5.0, 5.0));
        assert_eq!(centroid(&[]), Vec2::ZERO);
    }

    #[test]
    fn test_simplify_drops_near_duplicates() {
        let pts = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.01, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 0.02),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(0.0, 0.05),
        ];
        let out = simplify_polygon(&pts, 0.01);
        assert_eq!(out.first(), out.last());
        // Four corners plus the closing point; the point near the start snapped
        assert_eq!(out.len(), 5);
        assert!((polygon_area(&out) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_simplify_falls_back_on_collapse() {
        let tiny = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.01, 0.0),
            Vec2::new(0.01, 0.01),
        ];
        let out = simplify_polygon(&tiny, 0.01);
        assert_eq!(out, close_polygon(&tiny));
    }

    #[test]
    fn test_smooth_doubles_edges_and_stays_closed() {
        let closed = close_polygon(&square());
        let once = smooth_polygon(&closed, 1);
        assert_eq!(once.len(), 4 * 2 + 1);
        assert_eq!(once.first(), once.last());

        let twice = smooth_polygon(&closed, 2);
        assert_eq!(twice.len(), 16 + 1);
        // Corner cutting only removes area
        let area = polygon_area(&twice);
        assert!(area < 100.0 && area > 70.0);
    }

    #[test]
    fn test_smooth_degenerate_passthrough() {
        let short = vec![Vec2::ZERO, Vec2::X];
        assert_eq!(smooth_polygon(&short, 2), short);
    }

    #[test]
    fn test_circle_area_close_to_analytic() {
        let ring = close_polygon(&circle_polygon(Vec2::ZERO, 5.0, 128));
        let area = polygon_area(&ring);
        assert!((area - PI * 25.0).abs() < 0.1);
    }

    #[test]
    fn test_closest_point_on_square_edge() {
        let p = closest_point_on_polygon(Vec2::new(5.0, -3.0), &square());
        assert!((p - Vec2::new(5.0, 0.0)).length() < 1e-5);

        // Closing edge (last -> first) is considered too
        let p = closest_point_on_polygon(Vec2::new(-2.0, 4.0), &square());
        assert!((p - Vec2::new(0.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_all_finite() {
        assert!(all_finite(&square()));
        assert!(!all_finite(&[Vec2::new(f32::NAN, 0.0)]));
    }

    proptest! {
        #[test]
        fn prop_circle_membership_matches_radius(
            r in 0.0f32..9.0,
            theta in 0.0f32..std::f32::consts::TAU,
        ) {
            let ring = circle_polygon(Vec2::new(3.0, -2.0), 10.0, 64);
            let p = Vec2::new(3.0, -2.0) + polar_to_cartesian(r, theta);
            prop_assert!(point_in_polygon(p, &ring));
        }

        #[test]
        fn prop_far_points_are_outside(
            r in 10.5f32..100.0,
            theta in 0.0f32..std::f32::consts::TAU,
        ) {
            let ring = circle_polygon(Vec2::ZERO, 10.0, 64);
            prop_assert!(!point_in_polygon(polar_to_cartesian(r, theta), &ring));
        }

        #[test]
        fn prop_segment_test_is_symmetric(
            ax in -10.0f32..10.0, ay in -10.0f32..10.0,
            bx in -10.0f32..10.0, by in -10.0f32..10.0,
            cx in -10.0f32..10.0, cy in -10.0f32..10.0,
            dx in -10.0f32..10.0, dy in -10.0f32..10.0,
        ) {
            let (a, b, c, d) = (
                Vec2::new(ax, ay), Vec2::new(bx, by),
                Vec2::new(cx, cy), Vec2::new(dx, dy),
            );
            prop_assert_eq!(segments_intersect(a, b, c, d), segments_intersect(c, d, a, b));
        }
    }
}
