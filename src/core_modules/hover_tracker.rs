// THEORY:
// The `HoverTracker` adds memory to pointer handling. A single pointer sample
// only says which region is under the cursor right now; the tracker turns the
// stream of samples into a state machine with two states, `Idle` and
// `Hovering(region)`, and reports each transition.
//
// Key architectural principles:
// 1.  **Valid State Only**: the hovered index is always either absent or a region
//     index produced by the partition, so it is always in `[0, N)`.
// 2.  **Out of Bounds Means Idle**: a missing pointer, a pointer outside the
//     viewport, or an explicit leave signal all return the tracker to `Idle`.
// 3.  **Phase Is Not Identity**: the tracker carries one animation phase in degrees.
//     While hovering it drifts by a fixed amount every frame. Whenever the hovered
//     region changes it also jumps by a pseudo-random amount. The phase is never
//     reset, so moving back into a region continues the animation.
// 4.  **Injectable Randomness**: jumps come from a `PhaseSource`, seedable by default
//     and replaceable in tests.

use crate::core_modules::geometry::{Point, RegionIndex, Viewport};
use crate::core_modules::site_partition::SitePartition;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Degrees in one full turn of the hue wheel.
pub const FULL_TURN: f64 = 360.0;

/// Produces the pseudo-random phase jump applied on a region change.
pub trait PhaseSource {
    /// A jump in `[0, 360)` degrees.
    fn next_jump(&mut self) -> f64;
}

/// The default `PhaseSource`, reproducible when seeded.
#[derive(Debug, Clone)]
pub struct SeededPhase {
    rng: ChaCha8Rng,
}

impl SeededPhase {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
        }
    }
}

impl PhaseSource for SeededPhase {
    fn next_jump(&mut self) -> f64 {
        self.rng.random_range(0.0..FULL_TURN)
    }
}

/// Which region, if any, the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(RegionIndex),
}

impl HoverState {
    pub fn region(&self) -> Option<RegionIndex> {
        match self {
            HoverState::Idle => None,
            HoverState::Hovering(region) => Some(*region),
        }
    }
}

/// What one update did to the hover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTransition {
    Unchanged,
    Entered(RegionIndex),
    Switched { from: RegionIndex, to: RegionIndex },
    Left(RegionIndex),
}

/// Maps the pointer stream to a hovered region and an animation phase.
pub struct HoverTracker {
    state: HoverState,
    /// Current animation phase in degrees, always in `[0, 360)`.
    phase: f64,
    /// Phase advance applied every frame spent hovering.
    drift_per_frame: f64,
    source: Box<dyn PhaseSource + Send>,
}

impl HoverTracker {
    pub fn new(drift_per_frame: f64, source: Box<dyn PhaseSource + Send>) -> Self {
        Self {
            state: HoverState::Idle,
            phase: 0.0,
            drift_per_frame,
            source,
        }
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn hovered(&self) -> Option<RegionIndex> {
        self.state.region()
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Feeds one frame's pointer position. `None` means no pointer this frame.
    pub fn update(
        &mut self,
        pointer: Option<Point>,
        viewport: Viewport,
        partition: &SitePartition,
    ) -> HoverTransition {
        let target = pointer
            .filter(|p| viewport.contains(*p))
            .map(|p| partition.nearest(p.x, p.y));

        let transition = match (self.state, target) {
            (HoverState::Idle, None) => HoverTransition::Unchanged,
            (HoverState::Hovering(from), None) => HoverTransition::Left(from),
            (HoverState::Idle, Some(to)) => HoverTransition::Entered(to),
            (HoverState::Hovering(from), Some(to)) if from == to => HoverTransition::Unchanged,
            (HoverState::Hovering(from), Some(to)) => HoverTransition::Switched { from, to },
        };

        match transition {
            HoverTransition::Entered(_) | HoverTransition::Switched { .. } => {
                let jump = self.source.next_jump();
                self.advance(jump);
            }
            HoverTransition::Unchanged | HoverTransition::Left(_) => {}
        }

        self.state = match target {
            Some(region) => HoverState::Hovering(region),
            None => HoverState::Idle,
        };

        if let HoverState::Hovering(_) = self.state {
            self.advance(self.drift_per_frame);
        }

        if transition != HoverTransition::Unchanged {
            tracing::debug!(?transition, phase = self.phase, "hover transition");
        }
        transition
    }

    /// Explicit "pointer left the viewport" signal.
    pub fn leave(&mut self) -> HoverTransition {
        match self.state {
            HoverState::Idle => HoverTransition::Unchanged,
            HoverState::Hovering(from) => {
                self.state = HoverState::Idle;
                tracing::debug!(region = from, "hover left");
                HoverTransition::Left(from)
            }
        }
    }

    fn advance(&mut self, degrees: f64) {
        self.phase = (self.phase + degrees).rem_euclid(FULL_TURN);
        // rem_euclid can round up to exactly 360 for tiny negative inputs.
        if self.phase >= FULL_TURN {
            self.phase = 0.0;
        }
    }
}
