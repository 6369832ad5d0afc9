pub mod app;
pub mod config;
pub mod params;
pub mod render;
pub mod settings;
pub mod terminal;
pub mod visual;
