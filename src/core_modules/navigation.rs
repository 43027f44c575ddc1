// THEORY:
// Regions double as navigation links. This module holds the per-region label
// table and the two seams through which the engine talks to the page around it:
//
// - A `Navigator` receives the target of an activated region and performs the
//   actual view transition. The engine only decides which target to hand over.
// - A `LabelSink` is told where each region's label belongs whenever the anchors
//   are recomputed. The engine never owns presentation elements itself.

use crate::core_modules::geometry::{Point, RegionIndex};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The text shown on a region and where activating it leads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionLabel {
    pub label: String,
    /// An opaque navigation target (anchor, route or URI). `None` makes the region inert.
    pub target: Option<String>,
}

impl RegionLabel {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: Some(target.into()),
        }
    }

    pub fn inert(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: None,
        }
    }
}

/// The stock six-entry label table.
pub fn default_labels() -> Vec<RegionLabel> {
    vec![
        RegionLabel::new("about", "#about"),
        RegionLabel::new("work", "#work"),
        RegionLabel::new("play", "#play"),
        RegionLabel::new("contact", "contact-form"),
        RegionLabel::new("tools", "#tools"),
        RegionLabel::new("photos", "#photos"),
    ]
}

/// Where one region's label goes after an anchor recomputation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelPlacement {
    pub index: RegionIndex,
    pub position: Point,
    pub label: Option<String>,
    pub target: Option<String>,
}

/// Performs the view transition for an activated region.
pub trait Navigator {
    fn navigate(&mut self, target: &str);
}

/// Receives label anchors each time they are recomputed.
pub trait LabelSink {
    fn place_labels(&mut self, placements: &[LabelPlacement]);
}

/// A `Navigator` that only records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&mut self, target: &str) {
        tracing::info!(target_uri = target, "navigation requested");
    }
}

/// Collects every target it is asked to navigate to.
impl Navigator for Vec<String> {
    fn navigate(&mut self, target: &str) {
        self.push(target.to_string());
    }
}

/// Keeps only the most recent set of placements.
impl LabelSink for Vec<LabelPlacement> {
    fn place_labels(&mut self, placements: &[LabelPlacement]) {
        self.clear();
        self.extend_from_slice(placements);
    }
}
