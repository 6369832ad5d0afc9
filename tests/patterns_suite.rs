use dot_grid::params::{ParameterModel, ParameterSnapshot, Pattern};
use dot_grid::visual::{
    grid_cell, luminance, pitch, render_frame, render_pixel, DotGridEngine, FrameContext,
};
use glam::Vec2;
use std::collections::HashSet;
use std::time::{Duration, Instant};

fn params_for(pattern: Pattern) -> ParameterSnapshot {
    let mut model = ParameterModel::new();
    model.select_pattern(pattern);
    model.snapshot()
}

fn frame(w: usize, h: usize, t: f32, params: &ParameterSnapshot) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    let ctx = FrameContext::new(w as f32, h as f32, t);
    render_frame(w, h, &ctx, params, &mut buf);
    buf
}

fn random_params(rng: &mut fastrand::Rng) -> ParameterSnapshot {
    let all = Pattern::all();
    let mut model = ParameterModel::new();
    model.select_pattern(all[rng.usize(..all.len())]);
    model.set_density(rng.f32() * 1.6 - 0.3);
    model.set_dot_size(rng.f32() * 1.4 - 0.2);
    model.set_speed(rng.f32() * 3.0);
    model.set_color_hue(rng.f32() * 8.0 - 4.0);
    model.set_color_enabled(rng.bool());
    model.set_bloom_intensity(rng.f32() * 12.0 - 2.0);
    model.set_bloom_radius(rng.f32() * 12.0 - 2.0);
    model.set_brightness(rng.f32() * 12.0 - 2.0);
    model.snapshot()
}

#[test]
fn every_pixel_is_finite_opaque_and_in_range() {
    let mut rng = fastrand::Rng::with_seed(0x5EED_D075);
    for _ in 0..400 {
        let params = random_params(&mut rng);
        let w = rng.f32() * 400.0;
        let h = rng.f32() * 400.0;
        let t = match rng.u8(..4) {
            0 => 0.0,
            1 => rng.f32() * 10.0,
            2 => rng.f32() * 5_000.0,
            _ => 1.0e6 + rng.f32() * 1.0e6,
        };
        let ctx = FrameContext::new(w, h, t);
        let pos = Vec2::new(rng.f32() * (w + 20.0) - 10.0, rng.f32() * (h + 20.0) - 10.0);
        let px = render_pixel(pos, &ctx, &params);
        assert!(px.is_finite(), "{:?} at {pos} t={t}: {px:?}", params.pattern);
        assert_eq!(px.a, 1.0);
        for c in [px.r, px.g, px.b] {
            assert!((0.0..=1.0).contains(&c), "{:?}: {px:?}", params.pattern);
        }
    }
}

#[test]
fn every_pattern_renders_finite_frames_over_time() {
    for pattern in Pattern::all() {
        let params = params_for(pattern);
        for t in [0.0, 0.5, 7.3, 123.4, 9_876.5] {
            let ctx = FrameContext::new(48.0, 32.0, t);
            for y in 0..32 {
                for x in 0..48 {
                    let px = render_pixel(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), &ctx, &params);
                    assert!(px.is_finite(), "{pattern:?} t={t} ({x},{y})");
                }
            }
        }
    }
}

#[test]
fn non_finite_time_is_treated_as_zero() {
    let params = ParameterSnapshot::default();
    let pos = Vec2::new(10.0, 7.0);
    let zero = render_pixel(pos, &FrameContext::new(40.0, 30.0, 0.0), &params);
    for t in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        assert_eq!(render_pixel(pos, &FrameContext::new(40.0, 30.0, t), &params), zero);
    }
}

#[test]
fn wave_center_golden_color() {
    let ctx = FrameContext::new(100.0, 100.0, 0.0);
    let center = Vec2::new(50.0, 50.0);

    let px = render_pixel(center, &ctx, &ParameterSnapshot::default());
    assert!((px.r - 0.154).abs() < 0.01, "{px:?}");
    assert!((px.g - 1.0).abs() < 0.01, "{px:?}");
    assert!((px.b - 1.0).abs() < 0.01, "{px:?}");

    let no_bloom = ParameterSnapshot {
        bloom_intensity: 0.0,
        ..ParameterSnapshot::default()
    };
    let px = render_pixel(center, &ctx, &no_bloom);
    assert!((px.r - 0.101).abs() < 0.01, "{px:?}");
    assert!((px.g - 0.675).abs() < 0.01, "{px:?}");
    assert!((px.b - 0.675).abs() < 0.01, "{px:?}");
}

#[test]
fn rendering_is_idempotent() {
    for pattern in Pattern::all() {
        let params = params_for(pattern);
        let a = frame(40, 24, 3.25, &params);
        let b = frame(40, 24, 3.25, &params);
        assert_eq!(a, b, "{pattern:?}");
        let ctx = FrameContext::new(40.0, 24.0, 3.25);
        let pos = Vec2::new(13.5, 9.5);
        assert_eq!(render_pixel(pos, &ctx, &params), render_pixel(pos, &ctx, &params));
    }
}

#[test]
fn frame_matches_per_pixel_evaluation() {
    let params = params_for(Pattern::Magnetic);
    let buf = frame(21, 13, 2.0, &params);
    let ctx = FrameContext::new(21.0, 13.0, 2.0);
    for (i, px) in buf.chunks_exact(4).enumerate() {
        let (x, y) = (i % 21, i / 21);
        let expect = render_pixel(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), &ctx, &params).to_u8();
        assert_eq!(px, expect.as_slice(), "({x},{y})");
    }
}

#[test]
fn zero_size_surface_does_not_panic() {
    let params = ParameterSnapshot::default();
    let mut empty: Vec<u8> = Vec::new();
    render_frame(0, 0, &FrameContext::new(0.0, 0.0, 1.0), &params, &mut empty);
    render_frame(0, 10, &FrameContext::new(0.0, 10.0, 1.0), &params, &mut empty);

    let ctx = FrameContext::new(0.0, 0.0, 1.0);
    assert_eq!(ctx.size(), Vec2::ONE);
    assert!(render_pixel(Vec2::ZERO, &ctx, &params).is_finite());

    let mut engine = DotGridEngine::new();
    engine.resize(0, 7);
    assert!(engine.render(Instant::now(), params).is_empty());
}

#[test]
fn mismatched_buffer_paints_black() {
    let mut buf = vec![7u8; 10 * 4];
    render_frame(4, 4, &FrameContext::new(4.0, 4.0, 0.0), &ParameterSnapshot::default(), &mut buf);
    for px in buf.chunks_exact(4) {
        assert_eq!(px, [0, 0, 0, 255]);
    }
}

#[test]
fn all_patterns_are_pairwise_distinct() {
    let frames: Vec<_> = Pattern::all()
        .into_iter()
        .map(|p| (p, frame(64, 64, 1.7, &params_for(p))))
        .collect();
    for (i, (pa, a)) in frames.iter().enumerate() {
        for (pb, b) in &frames[i + 1..] {
            let differing = a
                .chunks_exact(4)
                .zip(b.chunks_exact(4))
                .filter(|(x, y)| x.iter().zip(y.iter()).any(|(u, v)| u.abs_diff(*v) > 8))
                .count();
            assert!(differing > 64 * 64 / 20, "{pa:?} vs {pb:?}: {differing} px differ");
        }
    }
}

#[test]
fn denser_grid_means_smaller_pitch_and_more_cells() {
    let size = Vec2::new(200.0, 120.0);
    let mut last_pitch = f32::INFINITY;
    let mut last_count = 0usize;
    for density in [0.2, 0.4, 0.6, 0.8, 1.0] {
        let p = pitch(density);
        assert!(p < last_pitch, "pitch({density}) = {p}");
        last_pitch = p;

        let mut cells = HashSet::new();
        for y in 0..120 {
            for x in 0..200 {
                cells.insert(grid_cell(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), size, density));
            }
        }
        assert!(cells.len() > last_count, "density {density}: {} cells", cells.len());
        last_count = cells.len();
    }
}

#[test]
fn grayscale_is_luminance_of_colored_output() {
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..300 {
        let colored = ParameterSnapshot {
            color_enabled: true,
            ..random_params(&mut rng)
        };
        let gray = ParameterSnapshot {
            color_enabled: false,
            ..colored
        };
        let ctx = FrameContext::new(90.0, 60.0, rng.f32() * 50.0);
        let pos = Vec2::new(rng.f32() * 90.0, rng.f32() * 60.0);
        let c = render_pixel(pos, &ctx, &colored);
        let g = render_pixel(pos, &ctx, &gray);
        assert!((g.r - g.g).abs() < 1e-6 && (g.g - g.b).abs() < 1e-6, "{g:?}");
        assert!((g.r - luminance(c.rgb())).abs() < 1e-5, "{c:?} vs {g:?}");
    }
}

#[test]
fn gaps_between_dots_are_black_without_bloom() {
    let params = ParameterSnapshot {
        bloom_intensity: 0.0,
        ..ParameterSnapshot::default()
    };
    let buf = frame(256, 256, 0.0, &params);
    assert!(buf.chunks_exact(4).all(|px| px[3] == 255));
    assert!(buf.chunks_exact(4).any(|px| px == [0, 0, 0, 255]));
    assert!(buf.chunks_exact(4).any(|px| px[1] > 100));
}

#[test]
fn zero_brightness_is_black() {
    for pattern in Pattern::all() {
        let params = ParameterSnapshot {
            brightness: 0.0,
            ..params_for(pattern)
        };
        let buf = frame(24, 16, 4.0, &params);
        assert!(buf.chunks_exact(4).all(|px| px == [0, 0, 0, 255]), "{pattern:?}");
    }
}

#[test]
fn engine_frame_depends_on_clock_not_wall_time() {
    let params = ParameterSnapshot::default();
    let t0 = Instant::now();
    let mut a = DotGridEngine::new();
    let mut b = DotGridEngine::new();
    a.resize(32, 20);
    b.resize(32, 20);

    a.render(t0, params);
    b.render(t0 + Duration::from_secs(3), params);
    let step = Duration::from_millis(100);
    let fa = a.render(t0 + step, params).to_vec();
    let fb = b.render(t0 + Duration::from_secs(3) + step, params).to_vec();
    assert_eq!(fa, fb);
    assert!((a.time() - 0.1).abs() < 1e-4);
}

#[test]
fn paused_engine_holds_the_frame() {
    let params = ParameterSnapshot::default();
    let t0 = Instant::now();
    let mut engine = DotGridEngine::new();
    engine.resize(16, 16);
    engine.render(t0, params);
    let before = engine.render(t0 + Duration::from_millis(80), params).to_vec();
    engine.pause();
    assert!(engine.is_paused());
    let during = engine.render(t0 + Duration::from_secs(2), params).to_vec();
    assert_eq!(before, during);
    engine.resume();
    assert!(!engine.is_paused());
}

#[test]
fn larger_dots_light_more_pixels() {
    let mut last = 0usize;
    for dot_size in [0.2, 0.4, 0.6, 0.8, 1.0] {
        let params = ParameterSnapshot {
            dot_size,
            bloom_intensity: 0.0,
            ..ParameterSnapshot::default()
        };
        let buf = frame(256, 256, 0.0, &params);
        let lit = buf.chunks_exact(4).filter(|px| px[..3] != [0, 0, 0]).count();
        assert!(lit > last, "dot_size {dot_size}: {lit} lit, previous {last}");
        last = lit;
    }
}

#[test]
fn wider_bloom_adds_energy() {
    let mut last = 0u64;
    for bloom_radius in [0.0, 1.0, 2.0, 4.0] {
        let params = ParameterSnapshot {
            bloom_radius,
            brightness: 1.0,
            ..ParameterSnapshot::default()
        };
        let buf = frame(256, 256, 0.0, &params);
        let energy: u64 = buf
            .chunks_exact(4)
            .map(|px| px[..3].iter().map(|&c| c as u64).sum::<u64>())
            .sum();
        assert!(energy > last, "bloom_radius {bloom_radius}: {energy}, previous {last}");
        last = energy;
    }
}
