// THEORY:
// This file is the main entry point for the `voronoi_nav` library crate.
// The public surface is the `Scene` (in `scene`) together with its
// configuration. A scene owns a fixed set of sites, partitions the viewport
// into nearest-site regions every frame, and reports what an external
// renderer needs: per-region cell buckets, label anchors, the hovered
// region's outline and its animation phase.
//
// The algorithms themselves live in `core_modules`, one module per stage,
// so they can be exercised and tested in isolation from the scene.

pub mod config;
pub mod core_modules;
pub mod scene;

pub use config::{ConfigError, SceneConfig};
pub use scene::{Activation, FrameReport, Scene};

// Re-export key data structures for the public API.
pub use core_modules::geometry::{Point, RegionIndex, Viewport};
pub use core_modules::hover_tracker::{HoverState, HoverTransition};
pub use core_modules::navigation::{LabelPlacement, LabelSink, Navigator, RegionLabel};
