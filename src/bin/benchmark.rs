use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use dot_grid::config::ParamArgs;
use dot_grid::params::{ParameterModel, Pattern};
use dot_grid::visual::{render_frame, FrameContext};

#[derive(Parser, Debug, Clone)]
#[command(name = "benchmark", about = "Per-pattern CPU render timing")]
struct Cli {
    #[arg(long, default_value_t = 120)]
    frames: usize,

    #[arg(long, default_value_t = 160)]
    w: usize,

    #[arg(long, default_value_t = 88)]
    h: usize,

    /// Fail when any pattern renders only black or exceeds `--max-ms`.
    #[arg(long, default_value_t = false)]
    ci_smoke: bool,

    #[arg(long, default_value_t = 20.0)]
    max_ms: f64,

    /// Also render this many randomized parameter sets and check every pixel is opaque.
    #[arg(long, default_value_t = 24)]
    sweep: usize,

    #[arg(long, default_value_t = 0xD07_6A1D)]
    seed: u64,

    #[command(flatten)]
    params: ParamArgs,
}

fn bench_patterns(args: &Cli) -> Result<()> {
    let n = args.w.saturating_mul(args.h).saturating_mul(4);
    let mut buf = vec![0u8; n];
    let mut total_time = Duration::ZERO;
    let mut total_frames = 0usize;
    let mut black = Vec::<&'static str>::new();
    let mut slow = Vec::<(&'static str, f64)>::new();

    println!(
        "CPU benchmark: patterns={} frames/pattern={} size={}x{} threads={}",
        Pattern::COUNT,
        args.frames,
        args.w,
        args.h,
        rayon::current_num_threads()
    );

    for (idx, pattern) in Pattern::all().into_iter().enumerate() {
        let mut model = args.params.to_model();
        model.select_pattern(pattern);
        if let Some(speed) = args.params.speed {
            model.set_speed(speed);
        }
        let params = model.snapshot();

        let start = Instant::now();
        let mut lit = 0usize;
        for f in 0..args.frames {
            let t = f as f32 / 60.0 * params.speed;
            let ctx = FrameContext::new(args.w as f32, args.h as f32, t);
            render_frame(args.w, args.h, &ctx, &params, &mut buf);
            if buf.chunks_exact(4).any(|p| p[0] != 0 || p[1] != 0 || p[2] != 0) {
                lit += 1;
            }
        }

        let elapsed = start.elapsed();
        total_time += elapsed;
        total_frames += args.frames;
        let ms = elapsed.as_secs_f64() * 1000.0 / args.frames.max(1) as f64;
        println!(
            "{:>2}. {:<14} {:>8.3} ms/frame  lit={:>3}/{}",
            idx,
            pattern.label(),
            ms,
            lit,
            args.frames
        );
        if lit == 0 {
            black.push(pattern.label());
        }
        if ms > args.max_ms {
            slow.push((pattern.label(), ms));
        }
    }

    let avg_ms = total_time.as_secs_f64() * 1000.0 / total_frames.max(1) as f64;
    let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };
    println!("CPU summary: {:>8.3} ms/frame avg  {:>7.2} FPS", avg_ms, fps);

    if args.ci_smoke {
        if !black.is_empty() || !slow.is_empty() {
            eprintln!("CI smoke: FAIL");
            if !black.is_empty() {
                eprintln!("  black patterns: {}", black.join(", "));
            }
            for (name, ms) in slow {
                eprintln!("  slow pattern: {} ({:.3} ms/frame > {:.3})", name, ms, args.max_ms);
            }
            bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }
    Ok(())
}

/// Randomized parameter sets, including out-of-range values the model must clamp.
fn sweep_params(args: &Cli) -> Result<()> {
    if args.sweep == 0 {
        return Ok(());
    }
    let mut rng = fastrand::Rng::with_seed(args.seed);
    let mut buf = vec![0u8; args.w.saturating_mul(args.h).saturating_mul(4)];
    let all = Pattern::all();

    let start = Instant::now();
    for _ in 0..args.sweep {
        let mut model = ParameterModel::new();
        model.select_pattern(all[rng.usize(..all.len())]);
        model.set_density(rng.f32() * 1.6 - 0.3);
        model.set_dot_size(rng.f32() * 1.4 - 0.2);
        model.set_speed(rng.f32() * 3.0);
        model.set_color_hue(rng.f32() * 6.0 - 3.0);
        model.set_color_enabled(rng.bool());
        model.set_bloom_intensity(rng.f32() * 10.0 - 1.0);
        model.set_bloom_radius(rng.f32() * 10.0 - 1.0);
        model.set_brightness(rng.f32() * 10.0 - 1.0);
        let params = model.snapshot();

        let t = rng.f32() * 600.0;
        let ctx = FrameContext::new(args.w as f32, args.h as f32, t);
        render_frame(args.w, args.h, &ctx, &params, &mut buf);
        if buf.chunks_exact(4).any(|p| p[3] != 255) {
            bail!("non-opaque pixel for {:?} at t={:.2}", params, t);
        }
    }
    println!(
        "Param sweep: {} frames ok in {:.1} ms (seed={:#x})",
        args.sweep,
        start.elapsed().as_secs_f64() * 1000.0,
        args.seed
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();
    if args.w == 0 || args.h == 0 {
        bail!("--w and --h must be >= 1");
    }
    bench_patterns(&args)?;
    sweep_params(&args)
}
