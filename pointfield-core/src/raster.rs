//! RGBA8 pixel buffer and the particle compositing pass

use rayon::prelude::*;

use crate::engine::Particle;
use crate::error::{Result, SimError};

pub const BYTES_PER_PIXEL: usize = 4;

/// Opaque black, the color every pixel is reset to at the start of a frame
pub const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Base intensity every particle adds to each color channel
const CHANNEL_BASE: f32 = 25.0;
/// Extra intensity spread across the surface by position
const CHANNEL_SPAN: f32 = 65.0;

/// Row-major RGBA8 surface, `(row * width + col) * 4` addresses a pixel.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

/// What the compositing pass did with the particle set this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub painted: usize,
    pub skipped: usize,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let pixels = allocate(width, height)?;
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Wrap an existing RGBA8 byte buffer. Its length must be `width * height * 4`.
    pub fn from_bytes(pixels: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if pixels.len() != expected {
            return Err(SimError::BufferMismatch {
                what: "pixel buffer",
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Reallocate for a new surface size. Contents are reset to the clear color.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        self.pixels = allocate(width, height)?;
        self.width = width;
        self.height = height;
        log::debug!("pixel buffer resized to {}x{}", width, height);
        Ok(())
    }

    /// RGBA of the pixel at `(col, row)`, or `None` outside the surface
    pub fn pixel(&self, col: usize, row: usize) -> Option<[u8; 4]> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let i = self.index(col, row);
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[i..i + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> usize {
        (row * self.width + col) * BYTES_PER_PIXEL
    }

    /// Reset every pixel to opaque black on the calling thread.
    pub fn clear(&mut self) {
        self.clear_with(false);
    }

    /// Reset every pixel to opaque black, optionally across the rayon pool.
    pub fn clear_with(&mut self, parallel: bool) {
        if parallel {
            self.pixels
                .par_chunks_exact_mut(BYTES_PER_PIXEL)
                .for_each(|px| px.copy_from_slice(&CLEAR_COLOR));
        } else {
            for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
                px.copy_from_slice(&CLEAR_COLOR);
            }
        }
    }

    /// Clear, then paint every particle that lands on the surface, all on the
    /// calling thread.
    pub fn composite(&mut self, particles: &[Particle]) -> FrameStats {
        self.composite_with(particles, false)
    }

    /// Clear, then paint every particle that lands on the surface.
    ///
    /// Channels add up and saturate at 255, so denser areas get brighter.
    /// Particles with a non-finite position, or whose floored position falls
    /// outside `[0, width) x [0, height)`, are skipped. `parallel` only
    /// affects the clear; painting is always serial.
    pub fn composite_with(&mut self, particles: &[Particle], parallel: bool) -> FrameStats {
        self.clear_with(parallel);

        let width = self.width as f32;
        let height = self.height as f32;
        let mut stats = FrameStats::default();

        for particle in particles {
            let (x, y) = (particle.pos.x, particle.pos.y);
            let (col, row) = (x.floor(), y.floor());

            // `floor` keeps NaN, and NaN fails every comparison below
            if !(col >= 0.0 && col < width && row >= 0.0 && row < height) {
                stats.skipped += 1;
                continue;
            }

            let rx = x / width;
            let ry = y / height;
            let i = self.index(col as usize, row as usize);
            let px = &mut self.pixels[i..i + BYTES_PER_PIXEL];

            px[0] = accumulate(px[0], CHANNEL_BASE + CHANNEL_SPAN * rx);
            px[1] = accumulate(px[1], CHANNEL_BASE + CHANNEL_SPAN * ry);
            px[2] = accumulate(px[2], CHANNEL_BASE + CHANNEL_SPAN * (1.0 - rx));
            px[3] = 255;
            stats.painted += 1;
        }

        stats
    }
}

/// Add `amount` to an 8-bit channel, saturating at 255. Halves round to the
/// even neighbour, the way a clamped byte canvas stores them.
#[inline]
fn accumulate(channel: u8, amount: f32) -> u8 {
    (f32::from(channel) + amount)
        .round_ties_even()
        .clamp(0.0, 255.0) as u8
}

/// Byte length of a `width` x `height` RGBA8 surface.
fn byte_len(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(SimError::InvalidSurface {
            width: width as f32,
            height: height as f32,
        });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(|| SimError::InvalidConfig(format!("surface {width}x{height} is too large")))
}

fn allocate(width: usize, height: usize) -> Result<Vec<u8>> {
    let len = byte_len(width, height)?;

    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|source| SimError::Allocation {
            what: "pixel buffer",
            bytes: len,
            source,
        })?;
    pixels.extend(std::iter::repeat(CLEAR_COLOR).take(len / BYTES_PER_PIXEL).flatten());
    Ok(pixels)
}
