mod color;
mod grid;
mod noise;
mod patterns;

use crate::params::ParameterSnapshot;
use glam::{Vec2, Vec3};
use rayon::prelude::*;
use std::time::{Duration, Instant};

pub use color::{grayscale, hsv_to_rgb, luminance};
pub use grid::{aspect_correct, cells_per_unit, grid_cell, pitch, Grid, CELLS_AT_FULL_DENSITY};
pub use patterns::{generator, Cell, Dot, Generator};

/// Largest clock step per poll. Longer gaps (stalls, resume) are not replayed.
pub const MAX_FRAME_DT: Duration = Duration::from_millis(250);

/// Per-frame surface and time. Dimensions are never below one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    pub width: f32,
    pub height: f32,
    /// Animation clock in seconds: the sum of frame steps times the speed
    /// in effect for each step, every step capped at `MAX_FRAME_DT`. Stops
    /// while paused.
    pub time: f32,
}

impl FrameContext {
    pub fn new(width: f32, height: f32, time: f32) -> Self {
        Self {
            width: floor_dim(width),
            height: floor_dim(height),
            time: if time.is_finite() { time } else { 0.0 },
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

fn floor_dim(v: f32) -> f32 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn opaque(rgb: Vec3) -> Self {
        Self {
            r: rgb.x,
            g: rgb.y,
            b: rgb.z,
            a: 1.0,
        }
    }

    pub fn rgb(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    pub fn to_u8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Color of the surface at device-pixel position `pos`. Pure: the same
/// arguments always give the same color.
pub fn render_pixel(pos: Vec2, ctx: &FrameContext, params: &ParameterSnapshot) -> Rgba {
    let grid = Grid::new(params.density, ctx.size());
    let generator = patterns::generator(params.pattern);
    shade(pos, ctx, params, &grid, generator)
}

fn shade(
    pos: Vec2,
    ctx: &FrameContext,
    params: &ParameterSnapshot,
    grid: &Grid,
    generator: Generator,
) -> Rgba {
    let p = grid::aspect_correct(pos, ctx.size());
    let shading = grid::Shading {
        dot_size: params.dot_size,
        bloom_intensity: params.bloom_intensity,
        bloom_radius: params.bloom_radius,
    };
    let lit = grid::shade_point(p, ctx, grid, generator, shading);
    let value = lit.value(params.bloom_intensity) * params.brightness * 0.5;
    let rgb = grid::colorize(value, lit.tint, params.color_hue, params.color_enabled);
    if rgb.is_finite() {
        Rgba::opaque(rgb)
    } else {
        Rgba::BLACK
    }
}

/// Fills `out` (RGBA8, `width * height * 4` bytes) with one frame, rows in
/// parallel. A zero-sized surface or mismatched buffer becomes a black frame.
pub fn render_frame(width: usize, height: usize, ctx: &FrameContext, params: &ParameterSnapshot, out: &mut [u8]) {
    let need = width.saturating_mul(height).saturating_mul(4);
    if width == 0 || height == 0 {
        fill_black(out);
        return;
    }
    if out.len() != need {
        log::warn!(
            "frame buffer mismatch ({}x{} needs {} bytes, got {}); painting black",
            width,
            height,
            need,
            out.len()
        );
        fill_black(out);
        return;
    }

    let grid = Grid::new(params.density, ctx.size());
    let generator = patterns::generator(params.pattern);
    let params = *params;

    out.par_chunks_mut(width * 4).enumerate().for_each(|(y, row)| {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let pos = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            px.copy_from_slice(&shade(pos, ctx, &params, &grid, generator).to_u8());
        }
    });
}

fn fill_black(out: &mut [u8]) {
    for px in out.chunks_mut(4) {
        px.fill(0);
        if px.len() == 4 {
            px[3] = 255;
        }
    }
}

/// Monotonic animation clock. Time advances by wall-clock delta times speed,
/// so changing speed changes the rate without jumping the animation.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last: Option<Instant>,
    elapsed: f64,
    paused: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: None,
            elapsed: 0.0,
            paused: false,
        }
    }

    /// Advances to `now` and returns the scaled elapsed seconds.
    pub fn tick(&mut self, now: Instant, speed: f32) -> f32 {
        if !self.paused {
            if let Some(last) = self.last {
                let dt = now.saturating_duration_since(last).min(MAX_FRAME_DT);
                let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
                self.elapsed += dt.as_secs_f64() * speed as f64;
            }
            self.last = Some(now);
        }
        self.elapsed as f32
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.last = None;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the frame clock and the output image.
pub struct DotGridEngine {
    clock: FrameClock,
    front: Vec<u8>,
    w: usize,
    h: usize,
}

impl DotGridEngine {
    pub fn new() -> Self {
        Self {
            clock: FrameClock::new(),
            front: Vec::new(),
            w: 0,
            h: 0,
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        if w == self.w && h == self.h {
            return;
        }
        log::debug!("engine resize {}x{} -> {}x{}", self.w, self.h, w, h);
        self.w = w;
        self.h = h;
        let n = w.saturating_mul(h).saturating_mul(4);
        self.front.clear();
        self.front.resize(n, 0);
    }

    pub fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    pub fn time(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn pause(&mut self) {
        log::debug!("frame clock paused at t={:.3}", self.clock.elapsed());
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        log::debug!("frame clock resumed");
        self.clock.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Renders the frame for `now`. `params` is taken by value: the frame sees
    /// exactly this snapshot however the caller's model changes meanwhile.
    pub fn render(&mut self, now: Instant, params: ParameterSnapshot) -> &[u8] {
        let t = self.clock.tick(now, params.speed);
        let ctx = FrameContext::new(self.w as f32, self.h as f32, t);
        render_frame(self.w, self.h, &ctx, &params, &mut self.front);
        &self.front
    }
}

impl Default for DotGridEngine {
    fn default() -> Self {
        Self::new()
    }
}
