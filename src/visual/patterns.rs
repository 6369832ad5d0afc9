//! The thirteen dot-grid pattern generators.
//!
//! A generator is a pair of pure functions: a coordinate `warp` applied before
//! gridding and a `field` evaluated at each cell center. Fields return a level
//! in [0, 1]; the shading stage turns it into a dot.

use super::grid::{smoothstep, Grid};
use super::noise::{hash2, noise_gradient, value_noise};
use crate::params::Pattern;
use glam::{IVec2, Vec2};
use std::f32::consts::{PI, TAU};

#[derive(Clone, Copy, Debug)]
pub struct Cell {
    pub id: IVec2,
    /// Cell center in (warped) pattern space.
    pub center: Vec2,
    pub cells: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dot {
    pub level: f32,
    /// Dot center displacement from the cell center, in cell units.
    pub shift: Vec2,
    /// Hue offset added to the base hue.
    pub tint: f32,
}

pub type WarpFn = fn(Vec2, f32, &Grid) -> Vec2;
pub type FieldFn = fn(Cell, f32) -> Dot;

#[derive(Clone, Copy)]
pub struct Generator {
    pub warp: WarpFn,
    pub field: FieldFn,
}

const fn plain(field: FieldFn) -> Generator {
    Generator {
        warp: identity,
        field,
    }
}

/// Indexed by `Pattern::index()`.
const GENERATORS: [Generator; Pattern::COUNT] = [
    plain(wave),
    plain(pulse),
    plain(spiral),
    plain(flicker),
    plain(cellular),
    Generator {
        warp: flow_warp,
        field: flow,
    },
    plain(gravity),
    plain(fractal),
    Generator {
        warp: kaleido_warp,
        field: kaleidoscope,
    },
    plain(magnetic),
    plain(growth),
    Generator {
        warp: tunnel_warp,
        field: tunnel,
    },
    plain(interference),
];

pub fn generator(pattern: Pattern) -> Generator {
    GENERATORS[pattern.index()]
}

fn identity(p: Vec2, _t: f32, _grid: &Grid) -> Vec2 {
    p
}

#[inline]
fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

// Traveling sine wave across the grid.
fn wave(c: Cell, t: f32) -> Dot {
    let p = c.center;
    let phase = (p.x * 1.6 + p.y * 0.9) * TAU - t * 2.2;
    let cross = 0.85 + 0.15 * (p.y * TAU * 2.0 + t).cos();
    Dot {
        level: 0.5 + 0.5 * phase.sin() * cross,
        shift: Vec2::ZERO,
        tint: 0.06 * (phase * 0.5).sin(),
    }
}

fn pulse(c: Cell, t: f32) -> Dot {
    let r = c.center.length();
    // Wobbling phase keeps the rings moving outward while the period breathes.
    let phase = t * TAU / 1.4 + 0.8 * (t * 0.35).sin();
    let ring = 0.5 + 0.5 * (r * 18.0 - phase).cos();
    Dot {
        level: ring * ring * ring * (1.0 - r * 0.9).clamp(0.25, 1.0),
        shift: Vec2::ZERO,
        tint: -0.12 * r,
    }
}

fn spiral(c: Cell, t: f32) -> Dot {
    let p = c.center;
    let r = p.length();
    let a = p.y.atan2(p.x);
    let phase = a * 3.0 + r * TAU * 4.0 - t * 2.0;
    Dot {
        level: (0.5 + 0.5 * phase.sin()) * smoothstep(0.0, 0.06, r).max(0.4),
        shift: Vec2::ZERO,
        tint: 0.1 * a.sin(),
    }
}

// Per-cell random flicker, cross-faded between hash frames.
fn flicker(c: Cell, t: f32) -> Dot {
    let step = t * 4.0;
    let k = step.floor();
    let f = step - k;
    let k = k as i32 as u32;
    let h0 = hash2(c.id.x, c.id.y, k);
    let h1 = hash2(c.id.x, c.id.y, k.wrapping_add(1));
    let mix = h0 + (h1 - h0) * smoothstep(0.0, 1.0, f);
    Dot {
        level: smoothstep(0.3, 1.0, mix),
        shift: Vec2::ZERO,
        tint: (hash2(c.id.x, c.id.y, 0xC0FF_EE00) - 0.5) * 0.2,
    }
}

// Voronoi distance to animated seeds: bright near seeds and along borders.
fn cellular(c: Cell, t: f32) -> Dot {
    const SEEDS_PER_UNIT: f32 = 3.5;
    let g = c.center * SEEDS_PER_UNIT;
    let base = g.floor();
    let (bx, by) = (base.x as i32, base.y as i32);

    let mut d1 = f32::MAX;
    let mut d2 = f32::MAX;
    let mut nearest = 0.0f32;
    for j in -1..=1 {
        for i in -1..=1 {
            let (sx, sy) = (bx.wrapping_add(i), by.wrapping_add(j));
            let phase = hash2(sx, sy, 37) * TAU;
            let jitter = Vec2::new(
                (hash2(sx, sy, 11) - 0.5) * 0.5 + 0.2 * (t * 0.9 + phase).sin(),
                (hash2(sx, sy, 23) - 0.5) * 0.5 + 0.2 * (t * 0.7 + phase).cos(),
            );
            let seed = base + Vec2::new(i as f32, j as f32) + 0.5 + jitter;
            let d = (g - seed).length();
            if d < d1 {
                d2 = d1;
                d1 = d;
                nearest = hash2(sx, sy, 53);
            } else if d < d2 {
                d2 = d;
            }
        }
    }

    let core = 1.0 - smoothstep(0.05, 0.7, d1);
    let border = (1.0 - smoothstep(0.0, 0.08, d2 - d1)) * 0.6;
    Dot {
        level: core.max(border),
        shift: Vec2::ZERO,
        tint: (nearest - 0.5) * 0.25,
    }
}

#[inline]
fn flow_curl(p: Vec2, t: f32) -> Vec2 {
    let g = noise_gradient(p * 2.2 + Vec2::new(0.12, 0.07) * t, 5);
    Vec2::new(g.y, -g.x)
}

// Displace along the curl of a drifting noise field before gridding.
fn flow_warp(p: Vec2, t: f32, _grid: &Grid) -> Vec2 {
    p + flow_curl(p, t) * 0.05
}

fn flow(c: Cell, t: f32) -> Dot {
    let n = value_noise(c.center * 3.0 - Vec2::splat(t * 0.1), 9);
    Dot {
        level: smoothstep(0.3, 0.8, n),
        shift: flow_curl(c.center, t).clamp_length_max(1.0) * 0.3,
        tint: 0.15 * (n - 0.5),
    }
}

fn masses(t: f32) -> [Vec2; 3] {
    [
        Vec2::new(0.30 * (t * 0.7).cos(), 0.22 * (t * 0.9).sin()),
        Vec2::new(0.26 * (t * 0.5 + 2.1).cos(), 0.28 * (t * 0.6 + 1.3).sin()),
        Vec2::new(0.18 * (4.0 - t * 1.1).cos(), 0.16 * (0.5 - t * 0.8).sin()),
    ]
}

// Dots lean toward orbiting masses and brighten near them.
fn gravity(c: Cell, t: f32) -> Dot {
    let mut pull = Vec2::ZERO;
    let mut potential = 0.0f32;
    for m in masses(t) {
        let d = m - c.center;
        let r2 = d.length_squared();
        pull += d / (r2 + 0.01);
        potential += 0.012 / (r2 + 0.012);
    }
    Dot {
        level: (0.12 + 0.88 * potential).min(1.0),
        shift: pull * 0.05,
        tint: -0.15 * potential.min(1.0),
    }
}

// Kali-style fold iteration with an orbit trap.
fn fractal(c: Cell, t: f32) -> Dot {
    let mut q = rotate(c.center, t * 0.12) * 2.4;
    let k = Vec2::new(0.82 + 0.08 * (t * 0.31).sin(), 0.58 + 0.07 * (t * 0.23).cos());
    let mut trap = f32::MAX;
    let mut acc = 0.0f32;
    for _ in 0..7 {
        q = q.abs() / q.length_squared().max(0.04) - k;
        let len = q.length();
        trap = trap.min(len);
        acc += (-2.0 * len).exp();
    }
    Dot {
        level: (1.0 - trap * 1.5).clamp(0.0, 1.0),
        shift: Vec2::ZERO,
        tint: 0.05 * acc,
    }
}

// Fold the angle into mirrored wedges before gridding.
fn kaleido_warp(p: Vec2, t: f32, _grid: &Grid) -> Vec2 {
    const WEDGES: f32 = 6.0;
    let sector = TAU / WEDGES;
    let r = p.length();
    let a = (p.y.atan2(p.x) + t * 0.15).rem_euclid(sector);
    let a = (a - sector * 0.5).abs();
    Vec2::from_angle(a) * r
}

fn kaleidoscope(c: Cell, t: f32) -> Dot {
    let w = wave(c, t).level;
    let p = pulse(c, t).level;
    Dot {
        level: (w * p * 1.6 + 0.25 * w).min(1.0),
        shift: Vec2::ZERO,
        tint: 0.3 * c.center.length(),
    }
}

fn charges(t: f32) -> [(f32, Vec2); 4] {
    let a = rotate(Vec2::new(-0.18, 0.0), t * 0.25);
    let b = rotate(Vec2::new(0.18, 0.0), t * 0.25);
    let da = Vec2::from_angle(t * 0.6) * 0.05;
    let db = Vec2::from_angle(-t * 0.4 + PI * 0.5) * 0.05;
    [(1.0, a + da), (-1.0, a - da), (1.0, b + db), (-1.0, b - db)]
}

// Field lines of two rotating dipoles via the 2D stream function.
fn magnetic(c: Cell, t: f32) -> Dot {
    let mut psi = 0.0f32;
    let mut field = Vec2::ZERO;
    for (q, s) in charges(t) {
        let d = c.center - s;
        psi += q * d.y.atan2(d.x);
        field += q * d / (d.length_squared() + 0.002);
    }
    // Integer multiplier keeps cos continuous across the atan2 branch cut.
    let lines = 0.5 + 0.5 * (psi * 3.0).cos();
    let strength = (field.length() * 0.08).min(1.0);
    Dot {
        level: lines * lines * (0.35 + 0.65 * strength),
        shift: field.normalize_or_zero() * 0.2,
        tint: 0.1 * psi.sin(),
    }
}

// Noisy regions expanding from seeds, each on its own life cycle.
fn growth(c: Cell, t: f32) -> Dot {
    const SEEDS: i32 = 6;
    const CYCLE: f32 = 9.0;
    let mut level = 0.0f32;
    let mut tint = 0.0f32;
    for k in 0..SEEDS {
        let seed = Vec2::new(
            (hash2(k, 1, 101) - 0.5) * 0.8,
            (hash2(k, 3, 101) - 0.5) * 0.6,
        );
        let age = (t / CYCLE + hash2(k, 2, 101)).fract();
        let radius = 0.04 + 0.42 * age.sqrt();
        let wobble = value_noise(c.center * 7.0 + Vec2::splat(k as f32 * 13.0), 3) - 0.5;
        let d = (c.center - seed).length() * (1.0 + 0.45 * wobble);
        let inside = 1.0 - smoothstep(radius - 0.03, radius, d);
        let front = 1.0 - smoothstep(0.0, 0.035, (d - radius).abs());
        let lvl = (inside * 0.45 + front * 0.9) * (1.0 - age * age);
        if lvl > level {
            level = lvl;
            tint = (hash2(k, 4, 101) - 0.5) * 0.3;
        }
    }
    Dot {
        level,
        shift: Vec2::ZERO,
        tint,
    }
}

const TUNNEL_DEPTH: f32 = 0.07;
const TUNNEL_RATE: f32 = 0.15;

#[inline]
fn tunnel_ring(cells: f32) -> f32 {
    (cells * 1.5).round().max(6.0)
}

// Polar inverse-radius mapping: x wraps around the ring, y is depth.
fn tunnel_warp(p: Vec2, t: f32, grid: &Grid) -> Vec2 {
    let r = p.length().max(0.02);
    let a = p.y.atan2(p.x);
    let u = a / TAU * tunnel_ring(grid.cells) / grid.cells;
    Vec2::new(u, TUNNEL_DEPTH / r + t * TUNNEL_RATE)
}

fn tunnel(c: Cell, t: f32) -> Dot {
    let z = c.center.y;
    let r = TUNNEL_DEPTH / (z - t * TUNNEL_RATE).max(1e-3);
    let fog = smoothstep(0.02, 0.25, r);
    let turns = c.center.x * c.cells / tunnel_ring(c.cells) * TAU;
    let bands = 0.5 + 0.5 * (z * TAU * 1.5).sin();
    let spokes = 0.6 + 0.4 * (turns * 3.0 + t).cos();
    Dot {
        level: bands * spokes * fog,
        shift: Vec2::ZERO,
        tint: 0.15 * (z * 2.0).sin(),
    }
}

// Sum of three circular wave sources.
fn interference(c: Cell, t: f32) -> Dot {
    let s1 = Vec2::new(-0.24 + 0.04 * (t * 0.3).sin(), -0.05);
    let s2 = Vec2::new(0.24, 0.05 + 0.04 * (t * 0.37).cos());
    let s3 = Vec2::new(0.0, 0.3 * (t * 0.21).sin());
    let w = ((c.center - s1).length() * TAU * 5.0 - t * 3.0).sin()
        + ((c.center - s2).length() * TAU * 5.3 - t * 3.0).sin()
        + 0.6 * ((c.center - s3).length() * TAU * 4.5 - t * 2.4).sin();
    let n = w / 2.6;
    let v = 0.5 + 0.5 * n;
    Dot {
        level: v * v,
        shift: Vec2::ZERO,
        tint: 0.08 * n,
    }
}
