use serde::{Deserialize, Serialize};

use crate::error::TrainingError;

/// Simulation parameters that control the game world and fitness accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Window width in pixels.
    pub win_width: f32,
    /// Window height in pixels.
    pub win_height: f32,
    /// Y coordinate of the floor surface.
    pub floor_y: f32,
    /// Upper bound for bird positions (small negative margin above the window).
    pub ceiling_y: f32,
    /// Target frames (ticks) per second when rendering.
    pub fps: u32,
    /// Bird spawn x position (fixed for the whole run).
    pub spawn_x: f32,
    /// Bird spawn y position.
    pub spawn_y: f32,
    /// Downward acceleration per tick squared.
    pub gravity: f32,
    /// Velocity set on jump (negative = upward).
    pub jump_impulse: f32,
    /// Maximum displacement magnitude per tick.
    pub terminal_velocity: f32,
    /// Extra displacement subtracted while ascending. Tuned game-feel
    /// constant; changing it changes evolved behavior.
    pub ascent_boost: f32,
    /// Controller output above this value triggers a jump.
    pub jump_threshold: f32,
    /// Horizontal pipe velocity in pixels per tick.
    pub pipe_velocity: f32,
    /// Vertical gap size between the top and bottom pipe.
    pub pipe_gap: f32,
    /// Minimum gap start height.
    pub gap_min: f32,
    /// Maximum gap start height.
    pub gap_max: f32,
    /// X position of the first pipe of every generation.
    pub first_pipe_x: f32,
    /// Fitness reward per tick survived.
    pub survival_reward: f64,
    /// Fitness reward to every survivor when a pipe is passed.
    pub pass_reward: f64,
    /// Fitness penalty applied once on elimination.
    pub collision_penalty: f64,
    /// Score at which a generation is cut short (survivors keep their fitness).
    pub score_checkpoint: u32,
    /// Draw sensor lines from each bird to the targeted gap.
    pub draw_lines: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            win_width: 600.0,
            win_height: 800.0,
            floor_y: 730.0,
            ceiling_y: -50.0,
            fps: 30,
            spawn_x: 230.0,
            spawn_y: 350.0,
            gravity: 3.0,
            jump_impulse: -10.5,
            terminal_velocity: 16.0,
            ascent_boost: 2.0,
            jump_threshold: 0.5,
            pipe_velocity: 5.0,
            pipe_gap: 200.0,
            gap_min: 50.0,
            gap_max: 450.0,
            first_pipe_x: 700.0,
            survival_reward: 0.1,
            pass_reward: 5.0,
            collision_penalty: 1.0,
            score_checkpoint: 20,
            draw_lines: false,
        }
    }
}

impl Params {
    /// Checks the parameter set for consistency.
    ///
    /// Runs once at startup, before any generation; an inconsistent set is a
    /// fatal configuration error.
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.gap_min >= self.gap_max {
            return Err(TrainingError::Config(format!(
                "gap range is empty: [{}, {}]",
                self.gap_min, self.gap_max
            )));
        }
        if self.gap_max + self.pipe_gap > self.win_height {
            return Err(TrainingError::Config(format!(
                "gap can extend below the window: {} + {} > {}",
                self.gap_max, self.pipe_gap, self.win_height
            )));
        }
        if self.floor_y > self.win_height {
            return Err(TrainingError::Config(format!(
                "floor lies below the window: {} > {}",
                self.floor_y, self.win_height
            )));
        }
        if self.terminal_velocity <= 0.0 {
            return Err(TrainingError::Config(format!(
                "terminal velocity must be positive, got {}",
                self.terminal_velocity
            )));
        }
        if self.pipe_velocity <= 0.0 {
            return Err(TrainingError::Config(format!(
                "pipe velocity must be positive, got {}",
                self.pipe_velocity
            )));
        }
        if self.gravity <= 0.0 {
            return Err(TrainingError::Config(format!(
                "gravity must be positive, got {}",
                self.gravity
            )));
        }
        Ok(())
    }
}
