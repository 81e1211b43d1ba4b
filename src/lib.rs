// Virtual tattoo try-on: composite tattoo artwork over a live camera feed
// or a photo, move/scale/rotate it with the mouse, and export a PNG.

pub mod app;
pub mod camera;
pub mod catalog;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod error;
pub mod export;
pub mod gamma;
pub mod overlay;
pub mod scene;
pub mod source;
pub mod transform;
pub mod types;
