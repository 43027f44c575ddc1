// THEORY:
// The `GridSampler` turns the implicit regions of a `SitePartition` into
// something a renderer can paint. It walks the viewport on a fixed-step grid,
// asks the partition who owns each grid corner, and sorts the answers into
// per-region buckets.
//
// Key architectural principles:
// 1.  **Deterministic Scan**: grid corners are `(column * resolution, row * resolution)`
//     for every corner strictly inside the viewport. A trailing partial cell whose
//     corner would land on or past the far edge is not sampled. Columns are the
//     outer loop and rows the inner one.
// 2.  **Lazy and Restartable**: `points()` returns a fresh iterator every call,
//     so the same sampler can drive several passes without allocating.
// 3.  **No Memory Between Frames**: `sample` clears every bucket before it fills
//     them. After a pass the bucket sizes add up to exactly the number of grid
//     corners visited.
// 4.  **Same-Pass Lookup**: while bucketing, the sampler also records the owner of
//     each grid cell in a dense table. Neighbour queries during edge detection read
//     that table instead of asking the partition again.

use crate::config::ConfigError;
use crate::core_modules::geometry::{Coordinate, Point, RegionIndex, Viewport};
use crate::core_modules::site_partition::SitePartition;

/// Upper bound on grid lines along one axis.
const MAX_AXIS_STEPS: usize = 1 << 24;
/// Upper bound on grid corners in one pass.
const MAX_SAMPLES: usize = 1 << 28;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A grid-aligned query point together with the region that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    pub x: Coordinate,
    pub y: Coordinate,
    /// The column of this sample on the sampling grid.
    pub column: usize,
    /// The row of this sample on the sampling grid.
    pub row: usize,
    pub region: RegionIndex,
}

impl Sample {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A grid corner before classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub x: Coordinate,
    pub y: Coordinate,
    pub column: usize,
    pub row: usize,
}

/// Walks a viewport on a fixed-step grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSampler {
    viewport: Viewport,
    resolution: Coordinate,
    columns: usize,
    rows: usize,
}

impl GridSampler {
    /// Creates a sampler for `viewport` with grid step `resolution`.
    /// A viewport smaller than one step along an axis yields no samples; that is not an error.
    pub fn new(viewport: Viewport, resolution: Coordinate) -> Result<Self, ConfigError> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(ConfigError::InvalidResolution(resolution));
        }
        if !viewport.width.is_finite() || !viewport.height.is_finite() {
            return Err(ConfigError::NonFiniteViewport);
        }
        if viewport.width < 0.0 || viewport.height < 0.0 {
            return Err(ConfigError::NegativeViewport);
        }

        let too_large = ConfigError::GridTooLarge {
            width: viewport.width,
            height: viewport.height,
            resolution,
        };
        let (Some(columns), Some(rows)) = (
            Self::steps_within(viewport.width, resolution),
            Self::steps_within(viewport.height, resolution),
        ) else {
            return Err(too_large);
        };
        match columns.checked_mul(rows) {
            Some(total) if total <= MAX_SAMPLES => {}
            _ => return Err(too_large),
        }

        Ok(Self {
            viewport,
            resolution,
            columns,
            rows,
        })
    }

    /// Counts the grid corners `k * step` with `k * step < extent`, or `None`
    /// past `MAX_AXIS_STEPS`.
    fn steps_within(extent: Coordinate, step: Coordinate) -> Option<usize> {
        if extent <= 0.0 {
            return Some(0);
        }
        let ratio = (extent / step).ceil();
        if ratio >= MAX_AXIS_STEPS as Coordinate {
            return None;
        }
        let mut count = ratio as usize;
        // Correct for rounding in the division; the corner test is authoritative.
        while count > 0 && (count - 1) as Coordinate * step >= extent {
            count -= 1;
        }
        while (count as Coordinate) * step < extent {
            count += 1;
        }
        Some(count)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resolution(&self) -> Coordinate {
        self.resolution
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of grid corners one pass visits.
    pub fn sample_count(&self) -> usize {
        self.columns * self.rows
    }

    /// The viewport coordinate of grid line `index` along either axis.
    pub fn coordinate(&self, index: usize) -> Coordinate {
        index as Coordinate * self.resolution
    }

    /// A fresh raster scan over all grid corners.
    pub fn points(&self) -> GridPoints {
        GridPoints {
            sampler: *self,
            column: 0,
            row: 0,
        }
    }

    /// Classifies every grid corner and rebuilds `buckets` from empty.
    pub fn sample(&self, partition: &SitePartition, buckets: &mut RegionBuckets) {
        buckets.reset(partition.len(), self);

        for point in self.points() {
            let region = partition.nearest(point.x, point.y);
            buckets.push(Sample {
                x: point.x,
                y: point.y,
                column: point.column,
                row: point.row,
                region,
            });
        }

        tracing::trace!(
            samples = buckets.total_samples(),
            columns = self.columns,
            rows = self.rows,
            "grid pass complete"
        );
    }
}

/// Iterator over the grid corners of a `GridSampler`, columns outermost.
#[derive(Debug, Clone)]
pub struct GridPoints {
    sampler: GridSampler,
    column: usize,
    row: usize,
}

impl Iterator for GridPoints {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.sampler.rows == 0 || self.column >= self.sampler.columns {
            return None;
        }

        let point = GridPoint {
            x: self.sampler.coordinate(self.column),
            y: self.sampler.coordinate(self.row),
            column: self.column,
            row: self.row,
        };

        self.row += 1;
        if self.row >= self.sampler.rows {
            self.row = 0;
            self.column += 1;
        }

        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.sampler.rows == 0 || self.column >= self.sampler.columns {
            0
        } else {
            (self.sampler.columns - self.column) * self.sampler.rows - self.row
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridPoints {}

/// Per-region samples for one grid pass, plus a cell-to-region table for the same pass.
#[derive(Debug, Clone, Default)]
pub struct RegionBuckets {
    buckets: Vec<Vec<Sample>>,
    /// Owner of each cell, indexed `column * rows + row`.
    lookup: Vec<RegionIndex>,
    columns: usize,
    rows: usize,
}

impl RegionBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every bucket, keeping allocations, and sizes the lookup for `sampler`.
    fn reset(&mut self, region_count: usize, sampler: &GridSampler) {
        self.buckets.resize_with(region_count, Vec::new);
        self.buckets.truncate(region_count);
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.columns = sampler.columns();
        self.rows = sampler.rows();
        self.lookup.clear();
        self.lookup.reserve(sampler.sample_count());
    }

    fn push(&mut self, sample: Sample) {
        self.lookup.push(sample.region);
        self.buckets[sample.region].push(sample);
    }

    /// The samples owned by `region`, in scan order. Unknown regions are empty.
    pub fn bucket(&self, region: RegionIndex) -> &[Sample] {
        self.buckets.get(region).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates `(region, samples)` for every region, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (RegionIndex, &[Sample])> {
        self.buckets.iter().enumerate().map(|(i, b)| (i, b.as_slice()))
    }

    pub fn region_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn total_samples(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The owner of grid cell `(column, row)` from this pass, if the cell exists.
    pub fn region_at(&self, column: usize, row: usize) -> Option<RegionIndex> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.lookup.get(column * self.rows + row).copied()
    }
}
