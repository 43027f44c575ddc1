// THEORY:
// The `CentroidEstimator` picks an anchor point for each region's label. The
// anchor is the arithmetic mean of the grid samples the region owns, which is
// a cheap stand-in for the true area centroid of a Voronoi cell.
//
// A region can own zero samples (a site tucked between grid corners, or a
// viewport collapsed to nothing). Its anchor then falls back to the site's own
// position, so every region always has somewhere to put its label.
//
// Anchors only move when the viewport or the site layout changes, so they are
// estimated on their own pass, usually at a coarser stride than the render grid.

use crate::config::ConfigError;
use crate::core_modules::geometry::{Coordinate, Point, Viewport};
use crate::core_modules::grid_sampler::{GridSampler, RegionBuckets};
use crate::core_modules::site_partition::{Site, SitePartition};

/// Optional post-process that rounds anchors to the nearest multiple of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap {
    step: Coordinate,
}

impl GridSnap {
    pub fn new(step: Coordinate) -> Result<Self, ConfigError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::InvalidSnap(step));
        }
        Ok(Self { step })
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            (point.x / self.step).round() * self.step,
            (point.y / self.step).round() * self.step,
        )
    }
}

/// One anchor per region, in region index order.
///
/// Anchors for empty buckets are the raw site coordinate. `snap`, when given,
/// is applied to every anchor, fallbacks included.
pub fn compute_centroids(buckets: &RegionBuckets, sites: &[Site], snap: Option<GridSnap>) -> Vec<Point> {
    sites
        .iter()
        .map(|site| {
            let samples = buckets.bucket(site.index);
            let raw = if samples.is_empty() {
                site.position
            } else {
                let (sum_x, sum_y) = samples
                    .iter()
                    .fold((0.0, 0.0), |(sx, sy), s| (sx + s.x, sy + s.y));
                let count = samples.len() as Coordinate;
                Point::new(sum_x / count, sum_y / count)
            };
            match snap {
                Some(snap) => snap.apply(raw),
                None => raw,
            }
        })
        .collect()
}

/// Runs a dedicated sampling pass at `stride` and derives anchors from it.
pub fn estimate_centroids(
    partition: &SitePartition,
    viewport: Viewport,
    stride: Coordinate,
    snap: Option<GridSnap>,
) -> Result<Vec<Point>, ConfigError> {
    let sampler = GridSampler::new(viewport, stride)?;
    let mut buckets = RegionBuckets::new();
    sampler.sample(partition, &mut buckets);
    Ok(compute_centroids(&buckets, partition.sites(), snap))
}
