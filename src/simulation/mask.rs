//! Silhouette masks for shape-accurate collision tests.
//!
//! Collisions are decided by overlapping per-pixel silhouettes at their
//! relative offsets, not by bounding boxes. The bird silhouette is the
//! ellipse inscribed in its sprite rectangle; pipes are solid rectangles.
//! Dimensions match the original sprite sheet at 2x scale.

/// Bird sprite width in pixels.
pub const BIRD_WIDTH: u32 = 68;
/// Bird sprite height in pixels.
pub const BIRD_HEIGHT: u32 = 48;
/// Pipe sprite width in pixels.
pub const PIPE_WIDTH: u32 = 104;
/// Pipe sprite height in pixels.
pub const PIPE_HEIGHT: u32 = 640;

/// A binary silhouette, row-major.
#[derive(Debug, Clone)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// A fully solid rectangular mask.
    pub fn rect(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    /// The solid ellipse inscribed in a `width` x `height` rectangle.
    pub fn ellipse(width: u32, height: u32) -> Self {
        let rx = f64::from(width) / 2.0;
        let ry = f64::from(height) / 2.0;
        let mut bits = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            for col in 0..width {
                // Sample at pixel centers.
                let dx = (f64::from(col) + 0.5 - rx) / rx;
                let dy = (f64::from(row) + 0.5 - ry) / ry;
                bits.push(dx * dx + dy * dy <= 1.0);
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True if the pixel at (`col`, `row`) is solid.
    pub fn get(&self, col: u32, row: u32) -> bool {
        self.bits[(row * self.width + col) as usize]
    }

    /// Tests whether any solid pixel of `other`, placed with its top-left
    /// corner at `offset` relative to this mask's top-left corner, overlaps a
    /// solid pixel of this mask.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (dx, dy) = offset;

        // Intersection of the two rectangles in this mask's coordinates.
        let left = dx.max(0);
        let top = dy.max(0);
        let right = (dx + other.width as i32).min(self.width as i32);
        let bottom = (dy + other.height as i32).min(self.height as i32);
        if left >= right || top >= bottom {
            return false;
        }

        for y in top..bottom {
            for x in left..right {
                if self.get(x as u32, y as u32)
                    && other.get((x - dx) as u32, (y - dy) as u32)
                {
                    return true;
                }
            }
        }
        false
    }
}

/// The silhouette set shared by every collision test in a run.
#[derive(Debug, Clone)]
pub struct SpriteMasks {
    /// Bird silhouette (ellipse).
    pub bird: Mask,
    /// Pipe silhouette, used for both the top and bottom pipe.
    pub pipe: Mask,
}

impl Default for SpriteMasks {
    fn default() -> Self {
        Self {
            bird: Mask::ellipse(BIRD_WIDTH, BIRD_HEIGHT),
            pipe: Mask::rect(PIPE_WIDTH, PIPE_HEIGHT),
        }
    }
}
