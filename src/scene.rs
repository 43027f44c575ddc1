// THEORY:
// The `scene` module is the top-level API of the engine. A `Scene` is the one
// owned value that carries all per-widget state (sites, viewport, buckets,
// anchors, hover and colours) and threads it through each frame, so nothing
// lives in globals and every mutation is visible at a call site.
//
// A frame runs the stages strictly in this order:
//   1. apply pending press-and-hold ticks (re-colour the region under the pointer)
//   2. rebuild the render-grid buckets from empty
//   3. feed the latest pointer position to the hover tracker
//   4. outline the hovered region, and only that region
//   5. collect the dividers between regions
// and returns a `FrameReport` for an external renderer.
//
// A resize re-synchronises the scene: sites stay where they are, anchors are
// re-estimated and the label sink is notified again. The next frame then samples
// the new viewport. Resizes happen between frames, never during one.

use crate::config::{ConfigError, SceneConfig};
use crate::core_modules::centroid_estimator::{GridSnap, estimate_centroids};
use crate::core_modules::edge_detector::BoundarySegment;
use crate::core_modules::edge_detector::edge_detector;
use crate::core_modules::geometry::{Coordinate, Point, RegionIndex, Viewport};
use crate::core_modules::grid_sampler::{GridSampler, RegionBuckets, Sample};
use crate::core_modules::hold_timer::{HoldTick, HoldTimer};
use crate::core_modules::hover_tracker::{HoverState, HoverTracker, HoverTransition, SeededPhase};
use crate::core_modules::navigation::{LabelPlacement, LabelSink, Navigator};
use crate::core_modules::palette::{Color, Palette};
use crate::core_modules::site_partition::{SitePartition, place_sites};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;

/// Everything an external renderer needs to paint one frame.
#[derive(Debug)]
pub struct FrameReport<'a> {
    /// Frames since the scene was created, from 1.
    pub frame: u64,
    pub viewport: Viewport,
    pub resolution: Coordinate,
    /// Render-grid cells by owning region.
    pub buckets: &'a RegionBuckets,
    /// Label anchors by region.
    pub centroids: &'a [Point],
    pub hover: HoverState,
    pub transition: HoverTransition,
    /// Hover animation phase in degrees.
    pub phase: f64,
    /// Outline cells of the hovered region. Empty when nothing is hovered.
    pub hovered_edges: Vec<Sample>,
    pub boundaries: Vec<BoundarySegment>,
    /// Fill colour per region, with the hovered region already mapped from `phase`.
    pub colors: Vec<Color>,
}

/// The outcome of pressing on a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub region: RegionIndex,
    /// The target handed to the navigator, if the region has one.
    pub target: Option<String>,
}

/// One interactive nearest-site partition over a viewport.
pub struct Scene {
    config: SceneConfig,
    viewport: Viewport,
    partition: SitePartition,
    sampler: GridSampler,
    snap: Option<GridSnap>,
    buckets: RegionBuckets,
    centroids: Vec<Point>,
    hover: HoverTracker,
    palette: Palette,
    hold_timer: HoldTimer,
    hold_ticks: mpsc::UnboundedReceiver<HoldTick>,
    navigator: Box<dyn Navigator + Send>,
    label_sink: Box<dyn LabelSink + Send>,
    pointer: Option<Point>,
    frame_count: u64,
}

impl Scene {
    /// Validates `config`, places the sites and computes the first set of label anchors.
    pub fn new(
        config: SceneConfig,
        viewport: Viewport,
        navigator: Box<dyn Navigator + Send>,
        label_sink: Box<dyn LabelSink + Send>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let sampler = GridSampler::new(viewport, config.resolution)?;
        let snap = config.label_snap.map(GridSnap::new).transpose()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        let positions = match &config.sites {
            Some(sites) => sites.clone(),
            None => place_sites(config.site_count, viewport, config.margin, &mut rng),
        };
        let partition = SitePartition::new(positions)?;

        let palette = Palette::new(partition.len(), ChaCha8Rng::seed_from_u64(rng.random()));
        let hover = HoverTracker::new(config.hue_drift, Box::new(SeededPhase::new(rng.random())));
        let (hold_timer, hold_ticks) = HoldTimer::new(config.hold_interval);

        let centroids = estimate_centroids(&partition, viewport, config.centroid_stride, snap)?;

        tracing::info!(
            sites = partition.len(),
            width = viewport.width,
            height = viewport.height,
            resolution = config.resolution,
            seeded = config.seed.is_some(),
            "scene created"
        );

        let mut scene = Self {
            config,
            viewport,
            partition,
            sampler,
            snap,
            buckets: RegionBuckets::new(),
            centroids,
            hover,
            palette,
            hold_timer,
            hold_ticks,
            navigator,
            label_sink,
            pointer: None,
            frame_count: 0,
        };
        scene.publish_labels();
        Ok(scene)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn partition(&self) -> &SitePartition {
        &self.partition
    }

    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    pub fn buckets(&self) -> &RegionBuckets {
        &self.buckets
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn hovered(&self) -> Option<RegionIndex> {
        self.hover.hovered()
    }

    pub fn phase(&self) -> f64 {
        self.hover.phase()
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn is_holding(&self) -> bool {
        self.hold_timer.is_running()
    }

    /// Records the pointer position the next frame will use.
    pub fn set_pointer(&mut self, pointer: Option<Point>) {
        self.pointer = pointer;
    }

    /// The pointer left the viewport: hovering stops immediately.
    pub fn pointer_left(&mut self) -> HoverTransition {
        self.pointer = None;
        let phase = self.hover.phase();
        let transition = self.hover.leave();
        self.keep_hover_color(transition, phase);
        transition
    }

    pub fn touch_started(&mut self, touch: Point) {
        self.set_pointer(Some(touch));
    }

    pub fn touch_moved(&mut self, touch: Point) {
        self.set_pointer(Some(touch));
    }

    pub fn touch_ended(&mut self) -> HoverTransition {
        self.pointer_left()
    }

    /// Runs one frame with the latest pointer position.
    pub fn frame(&mut self) -> FrameReport<'_> {
        self.frame_count += 1;
        self.apply_hold_ticks();

        self.sampler.sample(&self.partition, &mut self.buckets);
        let shown_phase = self.hover.phase();
        let transition = self.hover.update(self.pointer, self.viewport, &self.partition);
        self.keep_hover_color(transition, shown_phase);
        let hover = self.hover.state();
        let phase = self.hover.phase();

        let hovered_edges = match hover.region() {
            Some(region) => edge_detector::edge_pixels(&self.buckets, region),
            None => Vec::new(),
        };
        let boundaries = edge_detector::boundary_segments(&self.buckets);

        let mut colors = self.palette.colors().to_vec();
        if let Some(slot) = hover.region().and_then(|region| colors.get_mut(region)) {
            *slot = Color::from_phase(phase);
        }

        tracing::trace!(
            frame = self.frame_count,
            samples = self.buckets.total_samples(),
            hovered = ?hover.region(),
            edges = hovered_edges.len(),
            "frame rendered"
        );

        FrameReport {
            frame: self.frame_count,
            viewport: self.viewport,
            resolution: self.sampler.resolution(),
            buckets: &self.buckets,
            centroids: &self.centroids,
            hover,
            transition,
            phase,
            hovered_edges,
            boundaries,
            colors,
        }
    }

    /// Re-synchronises the scene with a new viewport size.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), ConfigError> {
        let sampler = GridSampler::new(viewport, self.config.resolution)?;
        let centroids = estimate_centroids(&self.partition, viewport, self.config.centroid_stride, self.snap)?;

        self.viewport = viewport;
        self.sampler = sampler;
        self.centroids = centroids;

        tracing::info!(width = viewport.width, height = viewport.height, "scene resized");
        self.publish_labels();
        Ok(())
    }

    /// Activates the region under `pointer`: dispatches its target, re-colours it
    /// and starts the press-and-hold timer. Presses outside the viewport do nothing.
    pub fn press(&mut self, pointer: Point) -> Option<Activation> {
        if !self.viewport.contains(pointer) {
            return None;
        }
        self.pointer = Some(pointer);

        let region = self.partition.nearest_to(pointer);
        let target = self
            .config
            .labels
            .get(region)
            .and_then(|label| label.target.clone());

        if let Some(target) = &target {
            tracing::debug!(region, target_uri = %target, "dispatching navigation");
            self.navigator.navigate(target);
        }

        self.palette.reroll(region);
        self.hold_timer.start();

        Some(Activation { region, target })
    }

    /// Ends a press; the hold timer stops.
    pub fn release(&mut self) {
        self.hold_timer.stop();
    }

    /// Applies every hold tick delivered since the last frame. Returns how many were applied.
    pub fn apply_hold_ticks(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(tick) = self.hold_ticks.try_recv() {
            applied += 1;
            if let Some(pointer) = self.pointer.filter(|p| self.viewport.contains(*p)) {
                let region = self.partition.nearest_to(pointer);
                self.palette.reroll(region);
                tracing::trace!(sequence = tick.sequence, region, "hold tick");
            }
        }
        applied
    }

    /// A region the hover just left keeps the colour it was last painted with.
    fn keep_hover_color(&mut self, transition: HoverTransition, shown_phase: f64) {
        let region = match transition {
            HoverTransition::Switched { from, .. } | HoverTransition::Left(from) => from,
            HoverTransition::Entered(_) | HoverTransition::Unchanged => return,
        };
        self.palette.set(region, Color::from_phase(shown_phase));
    }

    fn publish_labels(&mut self) {
        let placements: Vec<LabelPlacement> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(index, position)| {
                let label = self.config.labels.get(index);
                LabelPlacement {
                    index,
                    position: *position,
                    label: label.map(|l| l.label.clone()),
                    target: label.and_then(|l| l.target.clone()),
                }
            })
            .collect();
        self.label_sink.place_labels(&placements);
    }
}
