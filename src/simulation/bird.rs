//! Bird state, kinematics, and bounds checks.
//!
//! Birds fall under gravity and ascend on a fixed jump impulse. Vertical
//! displacement per tick follows `d = v0*t + 0.5*g*t^2` with `t` counted in
//! ticks since the last jump, so a jump restarts the kinematic arc.

use serde::{Deserialize, Serialize};

use super::mask::BIRD_HEIGHT;
use super::params::Params;

/// Maximum upward tilt angle in degrees (cosmetic).
pub const MAX_ROTATION: f32 = 25.0;
/// Tilt change per tick while falling, in degrees (cosmetic).
pub const ROT_VEL: f32 = 20.0;

/// One simulated bird.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    /// Horizontal position, fixed for the whole run.
    pub x: f32,
    /// Vertical position of the sprite's top edge.
    pub y: f32,
    /// Vertical velocity set at the last jump.
    pub vel: f32,
    /// Ticks since the last jump.
    pub tick_count: u32,
    /// Height recorded at the last jump.
    pub height: f32,
    /// Tilt angle in degrees (cosmetic, not used for collision).
    pub tilt: f32,
}

impl Bird {
    /// Creates a bird at the given spawn position.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vel: 0.0,
            tick_count: 0,
            height: y,
            tilt: 0.0,
        }
    }

    /// Starts a new upward arc: sets the jump impulse, resets the tick
    /// counter, and records the current height.
    pub fn jump(&mut self, params: &Params) {
        self.vel = params.jump_impulse;
        self.tick_count = 0;
        self.height = self.y;
    }

    /// Advances one tick of vertical motion and returns the applied
    /// displacement.
    ///
    /// Negative displacements get an extra fixed boost for a snappier ascent;
    /// the result is then clamped to the terminal-velocity magnitude, so
    /// `|displacement| <= terminal_velocity` always holds.
    pub fn advance(&mut self, params: &Params) -> f32 {
        self.tick_count += 1;

        let t = self.tick_count as f32;
        let mut displacement = self.vel * t + 0.5 * params.gravity * t * t;

        if displacement < 0.0 {
            displacement -= params.ascent_boost;
        }
        displacement = displacement.clamp(-params.terminal_velocity, params.terminal_velocity);

        self.y += displacement;
        self.update_tilt(displacement);
        displacement
    }

    /// True if the bird has hit the floor or flown above the ceiling margin.
    pub fn out_of_bounds(&self, floor_y: f32, ceiling_y: f32) -> bool {
        self.y + BIRD_HEIGHT as f32 >= floor_y || self.y < ceiling_y
    }

    // Tilt up while ascending or still above the last jump height, nose down
    // while falling. Purely cosmetic.
    fn update_tilt(&mut self, displacement: f32) {
        if displacement < 0.0 || self.y < self.height + 50.0 {
            if self.tilt < MAX_ROTATION {
                self.tilt = MAX_ROTATION;
            }
        } else if self.tilt > -90.0 {
            self.tilt -= ROT_VEL;
        }
    }
}
