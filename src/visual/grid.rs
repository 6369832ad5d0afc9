//! Shared dot-grid geometry: cell lookup, dot mask and bloom halo.

use super::patterns::{Cell, Dot, Generator};
use super::FrameContext;
use crate::params::DENSITY_RANGE;
use glam::{IVec2, Vec2, Vec3};

/// Cells across the short axis of the surface at density 1.0.
pub const CELLS_AT_FULL_DENSITY: f32 = 40.0;
/// Largest dot displacement a generator may request, in cell units.
pub const MAX_SHIFT: f32 = 0.35;

const HALO_GAIN: f32 = 0.35;
const CORE_FLOOR: f32 = 0.35;

/// Cells per unit of the short surface axis. Density is floored so the pitch
/// is never infinite.
pub fn cells_per_unit(density: f32) -> f32 {
    let d = if density.is_finite() { density } else { DENSITY_RANGE.0 };
    CELLS_AT_FULL_DENSITY * d.max(DENSITY_RANGE.0)
}

/// Distance between neighbouring dot centers, in short-axis units.
pub fn pitch(density: f32) -> f32 {
    1.0 / cells_per_unit(density)
}

/// Maps a device-pixel position to centered, aspect-corrected coordinates:
/// the surface center is the origin and the short axis spans [-0.5, 0.5].
pub fn aspect_correct(pos: Vec2, size: Vec2) -> Vec2 {
    let size = size.max(Vec2::ONE);
    (pos - size * 0.5) / size.min_element()
}

/// Grid cell index under a device-pixel position, for an unwarped grid.
pub fn grid_cell(pos: Vec2, size: Vec2, density: f32) -> IVec2 {
    Grid::new(density, size).locate(aspect_correct(pos, size)).0
}

#[derive(Clone, Copy, Debug)]
pub struct Grid {
    pub cells: f32,
    /// Half-width of the anti-aliasing band, in cell units.
    pub aa: f32,
}

impl Grid {
    pub fn new(density: f32, size: Vec2) -> Self {
        let cells = cells_per_unit(density);
        let px = cells / size.max(Vec2::ONE).min_element();
        Self {
            cells,
            aa: (px * 0.75).max(1e-3),
        }
    }

    /// Cell index and offset from the cell center (cell units, [-0.5, 0.5)).
    /// Offset by half a cell so the origin is a cell center.
    pub fn locate(&self, p: Vec2) -> (IVec2, Vec2) {
        let g = p * self.cells + 0.5;
        let id = g.floor();
        (id.as_ivec2(), g - id - 0.5)
    }

    pub fn center(&self, id: IVec2) -> Vec2 {
        id.as_vec2() / self.cells
    }

    pub fn cell(&self, id: IVec2) -> Cell {
        Cell {
            id,
            center: self.center(id),
            cells: self.cells,
        }
    }
}

/// Shading knobs pulled out of the parameter snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Shading {
    pub dot_size: f32,
    pub bloom_intensity: f32,
    pub bloom_radius: f32,
}

/// Light gathered at one point: core dot light, halo and the hue offset of
/// whatever dominates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lit {
    pub core: f32,
    pub halo: f32,
    pub tint: f32,
}

impl Lit {
    /// Pre-brightness intensity.
    pub fn value(&self, bloom_intensity: f32) -> f32 {
        self.core + HALO_GAIN * bloom_intensity * self.halo
    }
}

#[inline]
pub(crate) fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Dot mask for one dot at distance `d` (cell units).
#[inline]
fn dot_mask(level: f32, dot_size: f32, d: f32, aa: f32) -> f32 {
    let radius = 0.5 * dot_size * level;
    if radius <= 0.0 {
        return 0.0;
    }
    1.0 - smoothstep(radius - aa, radius + aa, d)
}

#[inline]
fn halo(level: f32, dot_size: f32, d: f32, bloom_radius: f32) -> f32 {
    let weight = smoothstep(0.15, 0.45, level);
    if weight <= 0.0 {
        return 0.0;
    }
    let sigma = 0.06 + 0.22 * bloom_radius;
    let outside = (d - 0.5 * dot_size * level).max(0.0) / sigma;
    weight * (-outside * outside).exp()
}

/// Gathers light from the 3x3 cells around a warped point so shifted dots and
/// halos can cross cell borders.
pub fn gather(grid: &Grid, q: Vec2, generator: Generator, t: f32, shading: Shading) -> Lit {
    let (id, local) = grid.locate(q);

    let mut core = 0.0f32;
    let mut glow = 0.0f32;
    let mut tint_acc = 0.0f32;
    let mut tint_w = 1e-4f32;
    let mut own_tint = 0.0f32;

    for dy in -1..=1 {
        for dx in -1..=1 {
            let offset = IVec2::new(dx, dy);
            let dot = sanitize((generator.field)(grid.cell(id + offset), t));
            if dx == 0 && dy == 0 {
                own_tint = dot.tint;
            }
            let d = (local - (offset.as_vec2() + dot.shift)).length();

            let lit = dot_mask(dot.level, shading.dot_size, d, grid.aa) * (CORE_FLOOR + (1.0 - CORE_FLOOR) * dot.level);
            let h = if shading.bloom_intensity > 0.0 {
                halo(dot.level, shading.dot_size, d, shading.bloom_radius)
            } else {
                0.0
            };

            core = core.max(lit);
            glow += h;
            let w = lit + h;
            tint_acc += dot.tint * w;
            tint_w += w;
        }
    }

    let tint = if tint_w > 1e-3 { tint_acc / tint_w } else { own_tint };
    Lit {
        core,
        halo: glow,
        tint,
    }
}

fn sanitize(dot: Dot) -> Dot {
    let level = if dot.level.is_finite() {
        dot.level.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let shift = if dot.shift.is_finite() {
        dot.shift.clamp_length_max(MAX_SHIFT)
    } else {
        Vec2::ZERO
    };
    let tint = if dot.tint.is_finite() { dot.tint } else { 0.0 };
    Dot { level, shift, tint }
}

/// Final color before alpha: hue from `color_hue + tint`, grayscale by
/// luminance when color is off. Channels are clamped to [0, 1].
pub fn colorize(value: f32, tint: f32, color_hue: f32, color_enabled: bool) -> Vec3 {
    use super::color::{grayscale, hsv_to_rgb};

    if !value.is_finite() || value <= 0.0 {
        return Vec3::ZERO;
    }
    let hue = (color_hue + tint).rem_euclid(1.0);
    let rgb = hsv_to_rgb(hue, 0.85, value).clamp(Vec3::ZERO, Vec3::ONE);
    if color_enabled { rgb } else { grayscale(rgb) }
}

/// Shades one aspect-corrected point of a frame.
pub fn shade_point(p: Vec2, ctx: &FrameContext, grid: &Grid, generator: Generator, shading: Shading) -> Lit {
    let q = (generator.warp)(p, ctx.time, grid);
    if !q.is_finite() {
        return Lit::default();
    }
    gather(grid, q, generator, ctx.time, shading)
}
