//! Render/input boundary between the tick loop and the outside world.
//!
//! The simulation assumes no semantic feedback from the frontend beyond the
//! quit signal; a headless run omits rendering entirely and executes ticks as
//! fast as possible.

use crate::simulation::bird::Bird;
use crate::simulation::params::Params;
use crate::simulation::pipe::PipePair;

/// Everything a frontend needs to draw one tick.
pub struct FrameView<'a> {
    /// Live birds, in slot order.
    pub birds: &'a [&'a Bird],
    /// All on-screen pipe pairs.
    pub pipes: &'a [PipePair],
    /// Index of the pipe controllers are currently steered toward.
    pub pipe_target: usize,
    /// Obstacles passed this generation.
    pub score: u32,
    /// Generation number being evaluated.
    pub generation: u64,
    /// Simulation parameters, for geometry.
    pub params: &'a Params,
}

/// One render/input backend driven once per tick.
///
/// The simulation is single-threaded, so the futures involved never need to
/// be `Send`.
#[allow(async_fn_in_trait)]
pub trait Frontend {
    /// True if the user asked to quit; ends the generation without a winner.
    fn poll_quit(&mut self) -> bool;

    /// Renders the current tick.
    fn draw(&mut self, frame: &FrameView<'_>);

    /// Frame pacing; awaited once per tick after drawing.
    async fn present(&mut self);
}

/// No-op frontend for headless training and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Frontend for Headless {
    fn poll_quit(&mut self) -> bool {
        false
    }

    fn draw(&mut self, _frame: &FrameView<'_>) {}

    async fn present(&mut self) {}
}
