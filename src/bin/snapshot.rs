use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use dot_grid::config::ParamArgs;
use dot_grid::params::{ParameterSnapshot, Pattern};
use dot_grid::visual::{render_frame, FrameContext};

const DEFAULT_OUTPUT: &str = "snapshot.ppm";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "snapshot",
    version,
    about = "Render dot-grid frames to binary PPM images"
)]
pub(crate) struct Cli {
    #[arg(long, default_value_t = 640)]
    pub(crate) width: usize,

    #[arg(long, default_value_t = 360)]
    pub(crate) height: usize,

    /// Animation time in seconds (already speed-scaled).
    #[arg(long, default_value_t = 0.0)]
    pub(crate) time: f32,

    /// Output file, or directory when `--all` is set.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub(crate) out: PathBuf,

    /// Render every pattern into `<out>/<pattern>.ppm`.
    #[arg(long, default_value_t = false)]
    pub(crate) all: bool,

    #[command(flatten)]
    pub(crate) params: ParamArgs,
}

pub(crate) fn validate_args(args: &Cli) -> Result<()> {
    if args.width == 0 {
        bail!("--width must be >= 1");
    }
    if args.height == 0 {
        bail!("--height must be >= 1");
    }
    if !args.time.is_finite() || args.time < 0.0 {
        bail!("--time must be a finite number >= 0");
    }
    if args.all && args.params.pattern.is_some() {
        bail!("--all renders every pattern; drop --pattern");
    }
    Ok(())
}

pub(crate) fn pattern_slug(p: Pattern) -> String {
    p.to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_else(|| format!("pattern-{}", p.index()))
}

/// Jobs as (pattern parameters, output path).
pub(crate) fn plan_outputs(args: &Cli) -> Vec<(ParameterSnapshot, PathBuf)> {
    if !args.all {
        return vec![(args.params.to_model().snapshot(), args.out.clone())];
    }
    Pattern::all()
        .into_iter()
        .map(|p| {
            let mut model = args.params.to_model();
            model.select_pattern(p);
            if let Some(speed) = args.params.speed {
                model.set_speed(speed);
            }
            let path = args.out.join(format!("{}.ppm", pattern_slug(p)));
            (model.snapshot(), path)
        })
        .collect()
}

/// Binary PPM (P6): header then RGB triplets, alpha dropped.
pub(crate) fn encode_ppm(width: usize, height: usize, rgba: &[u8]) -> Vec<u8> {
    let mut out = format!("P6\n{} {}\n255\n", width, height).into_bytes();
    out.reserve(width * height * 3);
    for px in rgba.chunks_exact(4).take(width * height) {
        out.extend_from_slice(&px[..3]);
    }
    out
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();
    run(args)
}

fn run(args: Cli) -> Result<()> {
    validate_args(&args)?;

    if args.all {
        fs::create_dir_all(&args.out)
            .with_context(|| format!("create output directory {}", args.out.display()))?;
    } else if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }

    let mut rgba = vec![0u8; args.width * args.height * 4];
    for (params, path) in plan_outputs(&args) {
        let ctx = FrameContext::new(args.width as f32, args.height as f32, args.time);
        render_frame(args.width, args.height, &ctx, &params, &mut rgba);
        write_ppm(&path, args.width, args.height, &rgba)?;
        log::info!(
            "wrote {} ({}, {}x{}, t={:.2})",
            path.display(),
            params.pattern.label(),
            args.width,
            args.height,
            args.time
        );
    }
    Ok(())
}

fn write_ppm(path: &Path, width: usize, height: usize, rgba: &[u8]) -> Result<()> {
    let mut file =
        fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    file.write_all(&encode_ppm(width, height, rgba))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
