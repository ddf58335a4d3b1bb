//! Trail to territory merging
//!
//! When an agent comes home, its trail is closed into a loop and unioned with
//! the territory. The largest outer ring of the union becomes the candidate,
//! which is simplified, smoothed and only committed if it actually grew.
//!
//! Closing the raw trail (rather than stitching it to the boundary arc between
//! the exit and entry points) can over- or under-capture slightly on concave
//! territories; the union plus the area check keeps the result sane.

use std::panic::{AssertUnwindSafe, catch_unwind};

use geo::{BooleanOps, Coord, LineString, Polygon};
use glam::Vec2;
use thiserror::Error;

use super::geometry::{
    all_finite, close_polygon, polygon_area, simplify_polygon, smooth_polygon,
};

/// Why a merge was abandoned
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    #[error("trail or territory contains a non-finite point")]
    InvalidPoint,
    #[error("polygon union failed: {0}")]
    UnionFailed(String),
    #[error("polygon union produced no usable ring")]
    EmptyUnion,
}

/// One polygon of a union result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnionPolygon {
    /// Closed outer ring
    pub exterior: Vec<Vec2>,
    /// Closed hole rings
    pub interiors: Vec<Vec<Vec2>>,
}

/// 2D polygon union, any boolean-ops backend will do
pub trait PolygonUnion {
    fn union(&self, a: &[Vec2], b: &[Vec2]) -> Result<Vec<UnionPolygon>, MergeError>;
}

/// Union backed by the `geo` crate's boolean ops
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoUnion;

impl GeoUnion {
    fn to_geo(ring: &[Vec2]) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = ring
            .iter()
            .map(|p| Coord {
                x: p.x as f64,
                y: p.y as f64,
            })
            .collect();
        Polygon::new(LineString::new(coords), vec![])
    }

    fn from_geo(ring: &LineString<f64>) -> Vec<Vec2> {
        ring.coords()
            .map(|c| Vec2::new(c.x as f32, c.y as f32))
            .collect()
    }
}

impl PolygonUnion for GeoUnion {
    fn union(&self, a: &[Vec2], b: &[Vec2]) -> Result<Vec<UnionPolygon>, MergeError> {
        let (pa, pb) = (Self::to_geo(a), Self::to_geo(b));
        let result = catch_unwind(AssertUnwindSafe(|| pa.union(&pb))).map_err(|panic| {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "boolean op panicked".to_string());
            MergeError::UnionFailed(msg)
        })?;

        Ok(result
            .into_iter()
            .map(|poly| UnionPolygon {
                exterior: Self::from_geo(poly.exterior()),
                interiors: poly.interiors().iter().map(Self::from_geo).collect(),
            })
            .collect())
    }
}

/// Post-processing applied to a merged ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeParams {
    /// Squared decimation distance
    pub simplify_threshold_sq: f32,
    pub smooth_iterations: usize,
}

/// Result of a merge attempt. The trail is cleared in every case.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// The candidate grew the territory and replaces it
    Committed {
        territory: Vec<Vec2>,
        old_area: f32,
        new_area: f32,
    },
    /// Fewer than three trail points: nothing to merge
    TrailTooShort,
    /// Union succeeded but did not add area
    NoGain { old_area: f32, candidate_area: f32 },
    /// Merge abandoned, territory unchanged
    Failed(MergeError),
}

/// Merge `trail` into `territory`.
pub fn merge_territory(
    territory: &[Vec2],
    trail: &[Vec2],
    union: &dyn PolygonUnion,
    params: &MergeParams,
) -> MergeOutcome {
    if trail.len() < 3 {
        return MergeOutcome::TrailTooShort;
    }
    if !all_finite(trail) || !all_finite(territory) {
        return MergeOutcome::Failed(MergeError::InvalidPoint);
    }

    let closed_territory = close_polygon(territory);
    let old_area = polygon_area(&closed_territory);
    let trail_loop = close_polygon(trail);

    let candidate = match union
        .union(&closed_territory, &trail_loop)
        .and_then(|polys| largest_ring(&polys).ok_or(MergeError::EmptyUnion))
    {
        Ok(ring) => ring,
        Err(err) => return MergeOutcome::Failed(err),
    };

    let candidate = simplify_polygon(&close_polygon(&candidate), params.simplify_threshold_sq);
    let candidate = smooth_polygon(&candidate, params.smooth_iterations);
    if !all_finite(&candidate) {
        return MergeOutcome::Failed(MergeError::InvalidPoint);
    }

    let candidate_area = polygon_area(&candidate);
    if candidate_area > old_area {
        MergeOutcome::Committed {
            territory: candidate,
            old_area,
            new_area: candidate_area,
        }
    } else {
        MergeOutcome::NoGain {
            old_area,
            candidate_area,
        }
    }
}

/// Outer ring with the largest area, ignoring holes and degenerate rings
fn largest_ring(polys: &[UnionPolygon]) -> Option<Vec<Vec2>> {
    polys
        .iter()
        .map(|p| close_polygon(&p.exterior))
        .filter(|ring| ring.len() >= 4)
        .map(|ring| (polygon_area(&ring), ring))
        .filter(|(area, _)| *area > 0.0)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, ring)| ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::{circle_polygon, point_in_polygon};
    use std::f32::consts::PI;

    fn params() -> MergeParams {
        MergeParams {
            simplify_threshold_sq: 0.01,
            smooth_iterations: 2,
        }
    }

    fn seed() -> Vec<Vec2> {
        circle_polygon(Vec2::ZERO, 5.0, 128)
    }

    /// Out of the circle at +x, around a 4x4 box, back in further up
    fn box_trail() -> Vec<Vec2> {
        vec![
            Vec2::new(5.0, 0.0),
            Vec2::new(9.0, 0.0),
            Vec2::new(9.0, 4.0),
            Vec2::new(5.0, 4.0),
            Vec2::new(2.9, 4.0),
        ]
    }

    struct FailingUnion;

    impl PolygonUnion for FailingUnion {
        fn union(&self, _: &[Vec2], _: &[Vec2]) -> Result<Vec<UnionPolygon>, MergeError> {
            Err(MergeError::UnionFailed("backend unavailable".into()))
        }
    }

    struct EmptyUnion;

    impl PolygonUnion for EmptyUnion {
        fn union(&self, _: &[Vec2], _: &[Vec2]) -> Result<Vec<UnionPolygon>, MergeError> {
            Ok(vec![UnionPolygon::default()])
        }
    }

    #[test]
    fn test_short_trail_is_noop() {
        let territory = seed();
        for len in 0..3 {
            let trail: Vec<Vec2> = box_trail().into_iter().take(len).collect();
            let outcome = merge_territory(&territory, &trail, &GeoUnion, &params());
            assert_eq!(outcome, MergeOutcome::TrailTooShort);
        }
    }

    #[test]
    fn test_box_loop_grows_territory() {
        let territory = seed();
        let outcome = merge_territory(&territory, &box_trail(), &GeoUnion, &params());
        match outcome {
            MergeOutcome::Committed {
                territory: merged,
                old_area,
                new_area,
            } => {
                assert!(new_area > old_area);
                assert!((old_area - PI * 25.0).abs() < 0.1);
                // Box adds roughly 4x4 minus the sliver already inside the circle
                assert!(new_area > old_area + 8.0);
                assert_eq!(merged.first(), merged.last());
                assert!(point_in_polygon(Vec2::new(7.0, 2.0), &merged));
                assert!(point_in_polygon(Vec2::ZERO, &merged));
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn test_trail_inside_territory_is_rejected() {
        let territory = seed();
        let trail = vec![
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
        ];
        let outcome = merge_territory(&territory, &trail, &GeoUnion, &params());
        assert!(
            matches!(outcome, MergeOutcome::NoGain { candidate_area, old_area } if candidate_area <= old_area)
        );
    }

    #[test]
    fn test_nan_point_aborts() {
        let mut trail = box_trail();
        trail[2] = Vec2::new(f32::NAN, 4.0);
        let outcome = merge_territory(&seed(), &trail, &GeoUnion, &params());
        assert_eq!(outcome, MergeOutcome::Failed(MergeError::InvalidPoint));
    }

    #[test]
    fn test_union_failure_is_reported_not_raised() {
        let outcome = merge_territory(&seed(), &box_trail(), &FailingUnion, &params());
        assert!(matches!(
            outcome,
            MergeOutcome::Failed(MergeError::UnionFailed(_))
        ));
    }

    #[test]
    fn test_empty_union_is_reported() {
        let outcome = merge_territory(&seed(), &box_trail(), &EmptyUnion, &params());
        assert_eq!(outcome, MergeOutcome::Failed(MergeError::EmptyUnion));
    }

    #[test]
    fn test_disjoint_loop_keeps_largest_ring() {
        // A loop far away from the territory: union has two rings, the bigger wins
        let territory = seed();
        let trail = vec![
            Vec2::new(20.0, 20.0),
            Vec2::new(32.0, 20.0),
            Vec2::new(32.0, 32.0),
            Vec2::new(20.0, 32.0),
        ];
        let outcome = merge_territory(&territory, &trail, &GeoUnion, &params());
        match outcome {
            MergeOutcome::Committed { territory, .. } => {
                assert!(point_in_polygon(Vec2::new(26.0, 26.0), &territory));
                assert!(!point_in_polygon(Vec2::ZERO, &territory));
            }
            other => panic!("expected the 144-unit square to win, got {other:?}"),
        }
    }

    #[test]
    fn test_geo_union_of_overlapping_squares() {
        let a = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(0.0, 0.0),
        ];
        let b: Vec<Vec2> = a.iter().map(|p| *p + Vec2::splat(1.0)).collect();
        let polys = GeoUnion.union(&a, &b).unwrap_or_default();
        assert_eq!(polys.len(), 1);
        let ring = close_polygon(&polys[0].exterior);
        assert!((polygon_area(&ring) - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_committed_merge_is_monotonic_over_repeats() {
        let mut territory = seed();
        let mut area = polygon_area(&close_polygon(&territory));
        let loops = [
            box_trail(),
            vec![
                Vec2::new(0.0, 5.0),
                Vec2::new(0.0, 10.0),
                Vec2::new(-4.0, 10.0),
                Vec2::new(-4.0, 3.0),
            ],
        ];
        for trail in loops {
            if let MergeOutcome::Committed {
                territory: next,
                new_area,
                ..
            } = merge_territory(&territory, &trail, &GeoUnion, &params())
            {
                assert!(new_area > area);
                territory = next;
                area = new_area;
            } else {
                panic!("loop should add area");
            }
        }
    }
}
