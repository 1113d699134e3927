//! Opaque-pixel masks for exact collision tests
//!
//! Every drawable entity carries a bitmask of its opaque pixels. Collision is
//! a mask intersection in screen space, never a bounding-box test: the avatar
//! and pipe silhouettes are rounded/rotated, and a box test reports hits at
//! empty rectangle corners.

use glam::IVec2;

/// Corner rounding radius on pipe heads (pixels)
const PIPE_CORNER_RADIUS: f32 = 12.0;

/// Row-major bitmask of opaque pixels, LSB-first within each 64-bit word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteMask {
    width: u32,
    height: u32,
    words_per_row: u32,
    bits: Vec<u64>,
}

impl SpriteMask {
    /// Build a mask by sampling a predicate at every pixel
    pub fn from_fn(width: u32, height: u32, opaque: impl Fn(u32, u32) -> bool) -> Self {
        let words_per_row = width.div_ceil(64).max(1);
        let mut bits = vec![0u64; (words_per_row * height) as usize];
        for y in 0..height {
            for x in 0..width {
                if opaque(x, y) {
                    let idx = (y * words_per_row + x / 64) as usize;
                    bits[idx] |= 1u64 << (x % 64);
                }
            }
        }
        Self {
            width,
            height,
            words_per_row,
            bits,
        }
    }

    /// Fully opaque rectangle
    pub fn filled(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) is opaque; out-of-bounds reads are clear
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let word = self.bits[(y * self.words_per_row + x / 64) as usize];
        word >> (x % 64) & 1 != 0
    }

    #[inline]
    fn word(&self, y: u32, w: u32) -> u64 {
        if w >= self.words_per_row {
            0
        } else {
            self.bits[(y * self.words_per_row + w) as usize]
        }
    }

    /// 64 bits of row `y` starting at pixel `x0` (bit j = pixel x0 + j)
    fn window(&self, y: u32, x0: u32) -> u64 {
        let w = x0 / 64;
        let s = x0 % 64;
        let lo = self.word(y, w) >> s;
        if s == 0 {
            lo
        } else {
            lo | self.word(y, w + 1) << (64 - s)
        }
    }

    /// Test whether two masks placed at the given screen positions share any
    /// opaque pixel
    pub fn overlaps(&self, pos: IVec2, other: &SpriteMask, other_pos: IVec2) -> bool {
        let x_lo = pos.x.max(other_pos.x);
        let x_hi = (pos.x + self.width as i32).min(other_pos.x + other.width as i32);
        let y_lo = pos.y.max(other_pos.y);
        let y_hi = (pos.y + self.height as i32).min(other_pos.y + other.height as i32);
        if x_lo >= x_hi || y_lo >= y_hi {
            return false;
        }

        for y in y_lo..y_hi {
            let mut x = x_lo;
            while x < x_hi {
                let a = self.window((y - pos.y) as u32, (x - pos.x) as u32);
                let b = other.window((y - other_pos.y) as u32, (x - other_pos.x) as u32);
                let span = (x_hi - x).min(64) as u32;
                let valid = if span == 64 { !0 } else { (1u64 << span) - 1 };
                if a & b & valid != 0 {
                    return true;
                }
                x += 64;
            }
        }
        false
    }
}

/// Silhouette descriptors the masks are derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteShape {
    /// Avatar body: ellipse inscribed in `width` x `height`, rotated
    /// clockwise by `rotation` degrees (screen coordinates, y down)
    Avatar {
        width: u32,
        height: u32,
        rotation: f32,
    },
    /// One pipe half: full-width head cap with rounded corners on the mouth
    /// side, narrower body centered under it. `mouth_down` for the top half
    /// (its opening faces the gap below).
    Pipe {
        width: u32,
        height: u32,
        head_height: u32,
        body_width: u32,
        mouth_down: bool,
    },
    /// Solid strip (the ground band)
    Band { width: u32, height: u32 },
}

impl SpriteShape {
    /// Mask dimensions for this shape
    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            SpriteShape::Avatar {
                width,
                height,
                rotation,
            } => {
                // AABB of the rotated ellipse
                let (a, b) = (width as f32 / 2.0, height as f32 / 2.0);
                let (sin, cos) = rotation.to_radians().sin_cos();
                let rx = ((a * cos).powi(2) + (b * sin).powi(2)).sqrt();
                let ry = ((a * sin).powi(2) + (b * cos).powi(2)).sqrt();
                ((2.0 * rx).ceil() as u32, (2.0 * ry).ceil() as u32)
            }
            SpriteShape::Pipe { width, height, .. } | SpriteShape::Band { width, height } => {
                (width, height)
            }
        }
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        match *self {
            SpriteShape::Avatar {
                width,
                height,
                rotation,
            } => {
                let (a, b) = (width as f32 / 2.0, height as f32 / 2.0);
                let (bw, bh) = self.bounds();
                let px = x as f32 + 0.5 - bw as f32 / 2.0;
                let py = y as f32 + 0.5 - bh as f32 / 2.0;
                // Inverse-rotate the sample point into the unrotated ellipse
                let (sin, cos) = rotation.to_radians().sin_cos();
                let u = px * cos + py * sin;
                let v = -px * sin + py * cos;
                (u / a).powi(2) + (v / b).powi(2) <= 1.0
            }
            SpriteShape::Pipe {
                width,
                height,
                head_height,
                body_width,
                mouth_down,
            } => {
                let head_height = head_height.min(height);
                // Head occupies the mouth end, body the rest
                let in_head = if mouth_down {
                    y >= height - head_height
                } else {
                    y < head_height
                };
                if in_head {
                    let local_y = if mouth_down { height - 1 - y } else { y };
                    rounded_cap_contains(x, local_y, width, head_height)
                } else {
                    let margin = (width.saturating_sub(body_width)) / 2;
                    x >= margin && x < width - margin
                }
            }
            SpriteShape::Band { .. } => true,
        }
    }
}

/// Rounded-rect test for a pipe head; `y` is measured from the mouth edge
fn rounded_cap_contains(x: u32, y: u32, width: u32, height: u32) -> bool {
    let r = PIPE_CORNER_RADIUS.min(width as f32 / 2.0).min(height as f32);
    let fx = x as f32 + 0.5;
    let fy = y as f32 + 0.5;
    if fy >= r {
        return true;
    }
    if fx < r {
        return (fx - r).powi(2) + (fy - r).powi(2) <= r * r;
    }
    if fx > width as f32 - r {
        return (fx - (width as f32 - r)).powi(2) + (fy - r).powi(2) <= r * r;
    }
    true
}

/// A shape together with its derived mask
///
/// The mask is a cached attribute of the shape: `set_shape` replaces both at
/// once so they can never desync.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    shape: SpriteShape,
    mask: SpriteMask,
}

impl Sprite {
    pub fn new(shape: SpriteShape) -> Self {
        let (w, h) = shape.bounds();
        let mask = SpriteMask::from_fn(w, h, |x, y| shape.contains(x, y));
        Self { shape, mask }
    }

    /// Replace the shape, recomputing the cached mask
    pub fn set_shape(&mut self, shape: SpriteShape) {
        if shape != self.shape {
            *self = Self::new(shape);
        }
    }

    #[inline]
    pub fn shape(&self) -> &SpriteShape {
        &self.shape
    }

    #[inline]
    pub fn mask(&self) -> &SpriteMask {
        &self.mask
    }

    /// Mask dimensions (pixels)
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.mask.width, self.mask.height)
    }
}
