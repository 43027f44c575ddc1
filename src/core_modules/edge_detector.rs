// THEORY:
// The `EdgeDetector` finds the outline of a region on the sampling grid. It is
// a stateless utility: every function takes one frame's data and answers for
// that frame only.
//
// A grid cell owned by region `r` is an edge cell when any of its four
// axis-aligned neighbours one step away either falls outside the viewport or
// belongs to a different region. The viewport boundary counts as an edge, so a
// region touching the border is always closed.
//
// Two forms of the same test are provided:
// - `is_edge_pixel` re-queries the `SitePartition` for each neighbour. It needs
//   nothing from the frame and is the reference definition.
// - `is_edge_sample` reads neighbour ownership from the frame's `RegionBuckets`
//   lookup table. On a grid whose coordinates are exact (integer steps) it agrees
//   with `is_edge_pixel` cell for cell, without touching the partition.
//
// Outlines are a rendering aid and are only computed for the hovered region.

use crate::core_modules::geometry::{Coordinate, Point, RegionIndex, Viewport};
use crate::core_modules::grid_sampler::{RegionBuckets, Sample};
use crate::core_modules::site_partition::SitePartition;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A grid cell whose right or bottom neighbour belongs to another region.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundarySegment {
    pub sample: Sample,
    /// The divider runs along the cell's right side.
    pub right: bool,
    /// The divider runs along the cell's bottom side.
    pub bottom: bool,
}

pub mod edge_detector {
    use super::*;

    /// Reference edge test: re-queries the partition for every in-viewport neighbour.
    pub fn is_edge_pixel(
        partition: &SitePartition,
        pixel: Point,
        region: RegionIndex,
        viewport: Viewport,
        resolution: Coordinate,
    ) -> bool {
        let neighbors = [
            Point::new(pixel.x - resolution, pixel.y),
            Point::new(pixel.x + resolution, pixel.y),
            Point::new(pixel.x, pixel.y - resolution),
            Point::new(pixel.x, pixel.y + resolution),
        ];

        neighbors.iter().any(|neighbor| {
            !viewport.contains(*neighbor) || partition.nearest(neighbor.x, neighbor.y) != region
        })
    }

    /// Edge test against the frame's lookup table. Cells off the grid are outside the viewport.
    pub fn is_edge_sample(buckets: &RegionBuckets, sample: &Sample, region: RegionIndex) -> bool {
        let (column, row) = (sample.column, sample.row);
        let neighbors = [
            column.checked_sub(1).map(|c| (c, row)),
            Some((column + 1, row)),
            row.checked_sub(1).map(|r| (column, r)),
            Some((column, row + 1)),
        ];

        neighbors.iter().any(|neighbor| match neighbor {
            Some((c, r)) => buckets.region_at(*c, *r) != Some(region),
            None => true,
        })
    }

    /// All edge cells of `region` in this frame, in scan order.
    pub fn edge_pixels(buckets: &RegionBuckets, region: RegionIndex) -> Vec<Sample> {
        buckets
            .bucket(region)
            .iter()
            .filter(|sample| is_edge_sample(buckets, sample, region))
            .copied()
            .collect()
    }

    /// Divider segments between regions across the whole grid.
    ///
    /// Only right and bottom neighbours are inspected, so each shared side is
    /// reported once. The viewport border is not a divider here.
    pub fn boundary_segments(buckets: &RegionBuckets) -> Vec<BoundarySegment> {
        let mut segments = Vec::new();
        for (region, samples) in buckets.iter() {
            for sample in samples {
                let differs = |c: usize, r: usize| {
                    buckets.region_at(c, r).is_some_and(|other| other != region)
                };
                let right = differs(sample.column + 1, sample.row);
                let bottom = differs(sample.column, sample.row + 1);
                if right || bottom {
                    segments.push(BoundarySegment {
                        sample: *sample,
                        right,
                        bottom,
                    });
                }
            }
        }
        segments
    }
}
