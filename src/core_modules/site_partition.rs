// THEORY:
// The `SitePartition` is the leaf of the whole engine. It owns the immutable
// list of sites and answers one question: which site is nearest to a point?
// Every other stage (sampling, centroids, edges, hover) is built on that
// single query, so its rules are strict:
//
// 1.  **Total**: any real-valued point gets an answer, inside the viewport or not.
//     An empty partition cannot be constructed, so there is always a site to return.
// 2.  **Lowest index wins**: sites are scanned in index order and a later site only
//     replaces the current best when it is strictly closer. Equidistant and
//     coincident sites therefore resolve to the lowest index.
// 3.  **Linear scan**: the site count stays single-digit, so an O(N) scan per
//     query is all that is needed.

use crate::config::ConfigError;
use crate::core_modules::geometry::{Coordinate, Point, RegionIndex, Viewport};
use rand::Rng;

/// A fixed 2D point defining one region's identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Position of this site in the partition's enumeration order.
    pub index: RegionIndex,
    pub position: Point,
}

/// Holds the sites and answers nearest-site queries.
#[derive(Debug, Clone)]
pub struct SitePartition {
    sites: Vec<Site>,
}

impl SitePartition {
    /// Builds a partition from site positions. Indices follow the input order.
    pub fn new<I>(positions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut sites = Vec::new();
        for (index, position) in positions.into_iter().enumerate() {
            if !position.is_finite() {
                return Err(ConfigError::NonFiniteSite { index });
            }
            sites.push(Site { index, position });
        }

        if sites.is_empty() {
            return Err(ConfigError::NoSites);
        }

        Ok(Self { sites })
    }

    /// Returns the index of the site nearest to `(x, y)`.
    pub fn nearest(&self, x: Coordinate, y: Coordinate) -> RegionIndex {
        let query = Point::new(x, y);
        let mut closest_index = 0;
        let mut closest_dist = Coordinate::INFINITY;

        for site in &self.sites {
            let dist = site.position.distance_squared(&query);
            if dist < closest_dist {
                closest_dist = dist;
                closest_index = site.index;
            }
        }

        closest_index
    }

    pub fn nearest_to(&self, point: Point) -> RegionIndex {
        self.nearest(point.x, point.y)
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// The number of sites, which is also the number of regions.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Always false: construction rejects an empty site list.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Draws `count` site positions uniformly inside the viewport, keeping `margin`
/// away from every edge. When an axis is shorter than twice the margin the margin
/// shrinks to half that axis, which collapses the range to the axis midpoint.
pub fn place_sites<R: Rng>(
    count: usize,
    viewport: Viewport,
    margin: Coordinate,
    rng: &mut R,
) -> Vec<Point> {
    (0..count)
        .map(|_| {
            Point::new(
                sample_axis(viewport.width, margin, rng),
                sample_axis(viewport.height, margin, rng),
            )
        })
        .collect()
}

fn sample_axis<R: Rng>(extent: Coordinate, margin: Coordinate, rng: &mut R) -> Coordinate {
    let extent = extent.max(0.0);
    let margin = margin.max(0.0).min(extent / 2.0);
    let low = margin;
    let high = extent - margin;
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn partition(points: &[(f64, f64)]) -> SitePartition {
        SitePartition::new(points.iter().copied().map(Point::from)).unwrap()
    }

    #[test]
    fn returns_the_closest_site() {
        let p = partition(&[(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        assert_eq!(p.nearest(10.0, 10.0), 0);
        assert_eq!(p.nearest(90.0, 5.0), 1);
        assert_eq!(p.nearest(5.0, 80.0), 2);
    }

    #[test]
    fn equidistant_query_goes_to_the_lower_index() {
        let p = partition(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(p.nearest(5.0, 0.0), 0);

        // Same layout listed the other way round: still the lower index.
        let p = partition(&[(10.0, 0.0), (0.0, 0.0)]);
        assert_eq!(p.nearest(5.0, 0.0), 0);
    }

    #[test]
    fn coincident_sites_resolve_to_the_first() {
        let p = partition(&[(50.0, 50.0), (20.0, 20.0), (20.0, 20.0)]);
        assert_eq!(p.nearest(19.0, 21.0), 1);
        assert_eq!(p.nearest(20.0, 20.0), 1);
    }

    #[test]
    fn single_site_owns_everything() {
        let p = partition(&[(3.0, 7.0)]);
        for &(x, y) in &[(0.0, 0.0), (-1e9, 4.0), (1e12, -1e12), (3.0, 7.0)] {
            assert_eq!(p.nearest(x, y), 0);
        }
    }

    #[test]
    fn answers_queries_outside_the_viewport() {
        let p = partition(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(p.nearest(-500.0, 0.0), 0);
        assert_eq!(p.nearest(500.0, -30.0), 1);
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let p = partition(&[(12.5, 40.0), (80.0, 33.0), (55.0, 90.0), (10.0, 95.0)]);
        let first = p.nearest(47.0, 61.0);
        for _ in 0..100 {
            assert_eq!(p.nearest(47.0, 61.0), first);
        }
    }

    #[test]
    fn empty_site_list_is_rejected() {
        let err = SitePartition::new(std::iter::empty()).unwrap_err();
        assert_eq!(err, ConfigError::NoSites);
    }

    #[test]
    fn non_finite_site_is_rejected() {
        let err = SitePartition::new(vec![Point::new(1.0, 1.0), Point::new(f64::NAN, 0.0)]).unwrap_err();
        assert_eq!(err, ConfigError::NonFiniteSite { index: 1 });
    }

    #[test]
    fn placed_sites_respect_the_margin() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let viewport = Viewport::new(800.0, 600.0);
        let sites = place_sites(50, viewport, 100.0, &mut rng);
        assert_eq!(sites.len(), 50);
        for site in sites {
            assert!(site.x >= 100.0 && site.x < 700.0, "x out of range: {}", site.x);
            assert!(site.y >= 100.0 && site.y < 500.0, "y out of range: {}", site.y);
        }
    }

    #[test]
    fn placement_in_a_narrow_viewport_collapses_to_the_midpoint() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let viewport = Viewport::new(120.0, 0.0);
        for site in place_sites(5, viewport, 100.0, &mut rng) {
            assert_eq!(site.x, 60.0);
            assert_eq!(site.y, 0.0);
        }
    }

    #[test]
    fn placement_is_reproducible_for_a_seed() {
        let viewport = Viewport::new(640.0, 480.0);
        let a = place_sites(6, viewport, 50.0, &mut ChaCha8Rng::seed_from_u64(42));
        let b = place_sites(6, viewport, 50.0, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
