//! Pipe pairs: the obstacle stream.
//!
//! Each pair is two vertically aligned pipes with a navigable gap. The gap
//! start is drawn once at spawn and never changes; pairs scroll left at a
//! fixed velocity, get marked `passed` once behind the lead bird, and are
//! dropped once fully off screen.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bird::Bird;
use super::mask::{PIPE_HEIGHT, PIPE_WIDTH, SpriteMasks};
use super::params::Params;

/// A top/bottom pipe pair with a gap between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipePair {
    /// Horizontal position of the pair's left edge.
    pub x: f32,
    /// Y coordinate where the gap starts (bottom edge of the top pipe).
    pub gap_y: f32,
    /// Y coordinate of the top pipe's top edge (negative: extends off screen).
    pub top: f32,
    /// Y coordinate of the bottom pipe's top edge.
    pub bottom: f32,
    /// Whether the lead bird has already passed this pair.
    pub passed: bool,
}

impl PipePair {
    /// Spawns a pair at `x` with a gap start drawn uniformly from
    /// `[gap_min, gap_max]`.
    pub fn spawn(x: f32, params: &Params, rng: &mut impl Rng) -> Self {
        let gap_y = rng.random_range(params.gap_min..params.gap_max);
        Self {
            x,
            gap_y,
            top: gap_y - PIPE_HEIGHT as f32,
            bottom: gap_y + params.pipe_gap,
            passed: false,
        }
    }

    /// Moves the pair left by the horizontal velocity.
    pub fn advance(&mut self, params: &Params) {
        self.x -= params.pipe_velocity;
    }

    /// True once the pair's right edge has scrolled past the left boundary.
    pub fn is_offscreen(&self) -> bool {
        self.x + (PIPE_WIDTH as f32) < 0.0
    }

    /// True once this not-yet-passed pair sits behind the lead bird.
    pub fn has_been_passed(&self, lead_x: f32) -> bool {
        !self.passed && self.x < lead_x
    }

    /// Marks the pair as passed. Happens at most once per pair.
    pub fn mark_passed(&mut self) {
        self.passed = true;
    }

    /// Silhouette-overlap test between the bird and either pipe of the pair.
    pub fn collide(&self, bird: &Bird, masks: &SpriteMasks) -> bool {
        let dx = (self.x - bird.x).round() as i32;
        let bird_y = bird.y.round() as i32;
        let top_offset = (dx, self.top.round() as i32 - bird_y);
        let bottom_offset = (dx, self.bottom.round() as i32 - bird_y);

        masks.bird.overlap(&masks.pipe, top_offset)
            || masks.bird.overlap(&masks.pipe, bottom_offset)
    }

    /// Center point of the gap, used by the sensor-line overlay.
    pub fn gap_center(&self) -> (f32, f32) {
        (
            self.x + PIPE_WIDTH as f32 / 2.0,
            self.gap_y + (self.bottom - self.gap_y) / 2.0,
        )
    }
}
