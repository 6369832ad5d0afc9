#[allow(dead_code)]
#[path = "../src/bin/snapshot.rs"]
mod snapshot;

use clap::Parser;
use dot_grid::config::{Config, RendererMode};
use dot_grid::params::{ParameterSnapshot, Pattern, DENSITY_RANGE};
use std::collections::HashSet;
use std::path::PathBuf;

fn parse_snapshot(args: &[&str]) -> snapshot::Cli {
    let argv = std::iter::once("snapshot").chain(args.iter().copied());
    snapshot::Cli::try_parse_from(argv).expect("parse args")
}

fn parse_config(args: &[&str]) -> Config {
    let argv = std::iter::once("dot-grid").chain(args.iter().copied());
    Config::try_parse_from(argv).expect("parse args")
}

#[test]
fn snapshot_defaults_are_valid() {
    let cli = parse_snapshot(&[]);
    assert_eq!(cli.out, PathBuf::from("snapshot.ppm"));
    assert!(!cli.all);
    assert!(snapshot::validate_args(&cli).is_ok());
}

#[test]
fn snapshot_rejects_bad_sizes_and_time() {
    let cli = parse_snapshot(&["--width", "0"]);
    assert!(snapshot::validate_args(&cli).is_err());
    let cli = parse_snapshot(&["--height", "0"]);
    assert!(snapshot::validate_args(&cli).is_err());
    let cli = parse_snapshot(&["--time=-1"]);
    assert!(snapshot::validate_args(&cli).is_err());
    let cli = parse_snapshot(&["--all", "--pattern", "wave"]);
    assert!(snapshot::validate_args(&cli).is_err());
}

#[test]
fn snapshot_all_plans_one_file_per_pattern() {
    let cli = parse_snapshot(&["--all", "--out", "shots", "--density", "0.3"]);
    let jobs = snapshot::plan_outputs(&cli);
    assert_eq!(jobs.len(), Pattern::COUNT);

    let patterns: HashSet<_> = jobs.iter().map(|(p, _)| p.pattern).collect();
    assert_eq!(patterns.len(), Pattern::COUNT);
    for (params, path) in &jobs {
        assert_eq!(params.density, 0.3);
        assert_eq!(params.speed, params.pattern.default_speed());
        assert!(path.starts_with("shots"));
    }
    assert!(jobs.iter().any(|(_, p)| p == &PathBuf::from("shots/flow-field.ppm")));
}

#[test]
fn snapshot_speed_flag_survives_pattern_defaults() {
    let cli = parse_snapshot(&["--pattern", "spiral", "--speed", "0.4"]);
    let jobs = snapshot::plan_outputs(&cli);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].0.pattern, Pattern::Ripple);
    assert!((jobs[0].0.speed - 0.4).abs() < 1e-6);
}

#[test]
fn ppm_encoding_drops_alpha() {
    let rgba = [1, 2, 3, 255, 4, 5, 6, 0];
    let ppm = snapshot::encode_ppm(2, 1, &rgba);
    let header = b"P6\n2 1\n255\n";
    assert_eq!(&ppm[..header.len()], header);
    assert_eq!(&ppm[header.len()..], &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn pattern_slugs_follow_cli_names() {
    assert_eq!(snapshot::pattern_slug(Pattern::Wave), "wave");
    assert_eq!(snapshot::pattern_slug(Pattern::FlowField), "flow-field");
}

#[test]
fn viewer_config_defaults() {
    let cfg = parse_config(&[]);
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.fps, 60);
    assert!(cfg.sync_updates);
    assert!(cfg.log_file.is_none());
    assert_eq!(cfg.initial_model().snapshot(), ParameterSnapshot::default());
}

#[test]
fn viewer_flags_go_through_the_model() {
    let cfg = parse_config(&[
        "--renderer",
        "kitty",
        "--pattern",
        "kaleido",
        "--density",
        "5",
        "--hue",
        "1.25",
        "--brightness",
        "-2",
        "--no-color",
    ]);
    assert_eq!(cfg.renderer, RendererMode::Kitty);
    let p = cfg.initial_model().snapshot();
    assert_eq!(p.pattern, Pattern::Kaleidoscope);
    assert_eq!(p.speed, Pattern::Kaleidoscope.default_speed());
    assert_eq!(p.density, DENSITY_RANGE.1);
    assert!((p.color_hue - 0.25).abs() < 1e-6);
    assert_eq!(p.brightness, 0.0);
    assert!(!p.color_enabled);
}

#[test]
fn renderer_aliases_parse() {
    for name in ["half-block", "halfblock", "hb"] {
        assert_eq!(parse_config(&["--renderer", name]).renderer, RendererMode::HalfBlock);
    }
    assert!(Config::try_parse_from(["dot-grid", "--renderer", "braille"]).is_err());
    assert!(Config::try_parse_from(["dot-grid", "--pattern", "nope"]).is_err());
}
