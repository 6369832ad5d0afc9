use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = dot_grid::config::Config::parse();
    dot_grid::app::run(cfg)
}
