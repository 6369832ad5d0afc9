use glam::Vec3;

/// Rec. 709 luma weights.
pub const LUMA: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// `h` wraps; `v` may exceed 1 and is left for the caller to clamp.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = h.rem_euclid(1.0) * 6.0;
    let i = h.floor() as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    match i.rem_euclid(6) {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}

#[inline]
pub fn luminance(rgb: Vec3) -> f32 {
    rgb.dot(LUMA)
}

/// Zero-saturation color with the same luminance.
#[inline]
pub fn grayscale(rgb: Vec3) -> Vec3 {
    Vec3::splat(luminance(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hues() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let g = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!((g - Vec3::new(0.0, 1.0, 0.0)).abs().max_element() < 1e-5);
        // Hue 1.0 wraps back to red.
        assert!((hsv_to_rgb(1.0, 1.0, 1.0) - Vec3::new(1.0, 0.0, 0.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn white_keeps_unit_luminance() {
        assert!((luminance(Vec3::ONE) - 1.0).abs() < 1e-6);
        assert_eq!(grayscale(Vec3::ONE), Vec3::ONE * luminance(Vec3::ONE));
    }
}
