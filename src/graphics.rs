//! Macroquad frontend: draws the simulation as simple shapes.

use macroquad::prelude::*;

use crate::frontend::{FrameView, Frontend};
use crate::simulation::mask::{BIRD_HEIGHT, BIRD_WIDTH, PIPE_HEIGHT, PIPE_WIDTH};

const SKY: Color = Color::new(0.44, 0.75, 0.89, 1.0);
const PIPE_GREEN: Color = Color::new(0.22, 0.65, 0.24, 1.0);
const GROUND: Color = Color::new(0.87, 0.72, 0.44, 1.0);
const GROUND_STRIPE: Color = Color::new(0.76, 0.60, 0.33, 1.0);
const BIRD_YELLOW: Color = Color::new(0.98, 0.84, 0.25, 1.0);

/// Renders frames in a macroquad window; quitting is requested with Escape.
pub struct WindowFrontend {
    // Two stripe offsets cycling left for the scrolling-floor effect.
    floor_x1: f32,
    floor_x2: f32,
    target_fps: u32,
    frame_start: f64,
}

impl WindowFrontend {
    /// Creates the frontend. The window itself is opened by the macroquad
    /// entry point, not here.
    pub fn new(win_width: f32, target_fps: u32) -> Self {
        Self {
            floor_x1: 0.0,
            floor_x2: win_width,
            target_fps,
            frame_start: get_time(),
        }
    }
}

impl Frontend for WindowFrontend {
    fn poll_quit(&mut self) -> bool {
        is_key_pressed(KeyCode::Escape)
    }

    fn draw(&mut self, frame: &FrameView<'_>) {
        let params = frame.params;
        clear_background(SKY);

        for pipe in frame.pipes {
            draw_rectangle(pipe.x, pipe.top, PIPE_WIDTH as f32, PIPE_HEIGHT as f32, PIPE_GREEN);
            draw_rectangle(
                pipe.x,
                pipe.bottom,
                PIPE_WIDTH as f32,
                PIPE_HEIGHT as f32,
                PIPE_GREEN,
            );
        }

        // Scrolling floor.
        self.floor_x1 -= params.pipe_velocity;
        self.floor_x2 -= params.pipe_velocity;
        if self.floor_x1 + params.win_width < 0.0 {
            self.floor_x1 = self.floor_x2 + params.win_width;
        }
        if self.floor_x2 + params.win_width < 0.0 {
            self.floor_x2 = self.floor_x1 + params.win_width;
        }
        let floor_h = params.win_height - params.floor_y;
        draw_rectangle(0.0, params.floor_y, params.win_width, floor_h, GROUND);
        for x in [self.floor_x1, self.floor_x2] {
            draw_rectangle(x, params.floor_y, params.win_width / 2.0, 8.0, GROUND_STRIPE);
        }

        for bird in frame.birds {
            let cx = bird.x + BIRD_WIDTH as f32 / 2.0;
            let cy = bird.y + BIRD_HEIGHT as f32 / 2.0;

            if params.draw_lines {
                if let Some(pipe) = frame.pipes.get(frame.pipe_target) {
                    let px = pipe.x + PIPE_WIDTH as f32 / 2.0;
                    draw_line(cx, cy, px, pipe.gap_y, 3.0, RED);
                    draw_line(cx, cy, px, pipe.bottom, 3.0, RED);
                }
            }
            draw_circle(cx, cy, BIRD_HEIGHT as f32 / 2.0, BIRD_YELLOW);
        }

        draw_stats(frame);
    }

    async fn present(&mut self) {
        next_frame().await;

        // Cap the tick rate; vsync alone can run faster than the target.
        let target = 1.0 / f64::from(self.target_fps.max(1));
        let elapsed = get_time() - self.frame_start;
        if elapsed < target {
            std::thread::sleep(std::time::Duration::from_secs_f64(target - elapsed));
        }
        self.frame_start = get_time();
    }
}

fn draw_stats(frame: &FrameView<'_>) {
    let params = frame.params;
    let score = format!("Score: {}", frame.score);
    let size = measure_text(&score, None, 40, 1.0);
    draw_text(&score, params.win_width - size.width - 15.0, 40.0, 40.0, WHITE);
    draw_text(&format!("Gen: {}", frame.generation), 10.0, 40.0, 40.0, WHITE);
    draw_text(&format!("Alive: {}", frame.birds.len()), 10.0, 80.0, 40.0, WHITE);
}
