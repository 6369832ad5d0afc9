use glam::Vec2;

/// Integer lattice hash in [0, 1].
#[inline]
pub(crate) fn hash2(x: i32, y: i32, seed: u32) -> f32 {
    let mut n = (x as u32).wrapping_mul(374_761_393)
        ^ (y as u32).wrapping_mul(668_265_263)
        ^ seed.wrapping_mul(0x9E37_79B9);
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n = n ^ (n >> 16);
    ((n & 0x00FF_FFFF) as f32) / 16_777_215.0
}

/// Smoothly interpolated lattice noise in [0, 1].
pub(crate) fn value_noise(p: Vec2, seed: u32) -> f32 {
    let i = p.floor();
    let f = p - i;
    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);
    let (ix, iy) = (i.x as i32, i.y as i32);

    let a = hash2(ix, iy, seed);
    let b = hash2(ix.wrapping_add(1), iy, seed);
    let c = hash2(ix, iy.wrapping_add(1), seed);
    let d = hash2(ix.wrapping_add(1), iy.wrapping_add(1), seed);

    let top = a + (b - a) * u.x;
    let bottom = c + (d - c) * u.x;
    top + (bottom - top) * u.y
}

/// Central-difference gradient of [`value_noise`].
pub(crate) fn noise_gradient(p: Vec2, seed: u32) -> Vec2 {
    const E: f32 = 0.01;
    let dx = value_noise(p + Vec2::new(E, 0.0), seed) - value_noise(p - Vec2::new(E, 0.0), seed);
    let dy = value_noise(p + Vec2::new(0.0, E), seed) - value_noise(p - Vec2::new(0.0, E), seed);
    Vec2::new(dx, dy) / (2.0 * E)
}
