use crate::params::{ParameterModel, Pattern};
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "dot-grid", version, about = "Animated procedural dot-grid patterns in the terminal")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[command(flatten)]
    pub params: ParamArgs,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Write logs here (RUST_LOG controls the filter). Nothing is logged otherwise.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Parameter model seeded from the command line.
    pub fn initial_model(&self) -> ParameterModel {
        self.params.to_model()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    Kitty,
}

/// Parameter flags shared by the viewer and the tools. Values are clamped by
/// the model, never rejected.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    #[arg(long, value_enum)]
    pub pattern: Option<Pattern>,

    #[arg(long, allow_negative_numbers = true)]
    pub density: Option<f32>,

    #[arg(long, allow_negative_numbers = true)]
    pub dot_size: Option<f32>,

    /// Defaults to the selected pattern's own speed.
    #[arg(long, allow_negative_numbers = true)]
    pub speed: Option<f32>,

    #[arg(long, allow_negative_numbers = true)]
    pub hue: Option<f32>,

    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    #[arg(long, allow_negative_numbers = true)]
    pub bloom_intensity: Option<f32>,

    #[arg(long, allow_negative_numbers = true)]
    pub bloom_radius: Option<f32>,

    #[arg(long, allow_negative_numbers = true)]
    pub brightness: Option<f32>,
}

impl ParamArgs {
    /// Builds a model from defaults plus these flags. Pattern goes first so an
    /// explicit `--speed` survives the pattern's speed reset.
    pub fn to_model(&self) -> ParameterModel {
        let mut model = ParameterModel::new();
        if let Some(p) = self.pattern {
            model.select_pattern(p);
        }
        if let Some(v) = self.density {
            model.set_density(v);
        }
        if let Some(v) = self.dot_size {
            model.set_dot_size(v);
        }
        if let Some(v) = self.speed {
            model.set_speed(v);
        }
        if let Some(v) = self.hue {
            model.set_color_hue(v);
        }
        if self.no_color {
            model.set_color_enabled(false);
        }
        if let Some(v) = self.bloom_intensity {
            model.set_bloom_intensity(v);
        }
        if let Some(v) = self.bloom_radius {
            model.set_bloom_radius(v);
        }
        if let Some(v) = self.brightness {
            model.set_brightness(v);
        }
        model
    }
}
