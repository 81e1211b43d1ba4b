// Command-line flags. Anything given here overrides the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, check_surface_size};
use crate::scene::Variant;
use crate::source::SourceMode;

/// Parse and validate surface size (WIDTHxHEIGHT format)
fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("Invalid size '{s}'. Use WIDTHxHEIGHT (e.g., 640x480)"))?;
    let width: u32 = w.parse().map_err(|_| format!("Invalid width '{w}' in size"))?;
    let height: u32 = h.parse().map_err(|_| format!("Invalid height '{h}' in size"))?;
    check_surface_size(width, height)?;
    Ok((width, height))
}

/// tattoo-tryon: place tattoo artwork on a live camera feed or a photo
#[derive(Parser, Debug, Default)]
#[command(name = "tattoo-tryon")]
#[command(version, about = "Virtual tattoo try-on")]
#[command(after_help = "KEYS:
    1-9        add tattoo (or click a thumbnail)
    C          camera background
    P / O      photo background, pick a file
    S          save tattoo-tryon.png
    Tab        select next tattoo (studio)
    Del        remove selected tattoo (studio)
    = / -      scale        [ / ]  rotate
    , / .      opacity      K / L  skew
    Esc        quit")]
pub struct Args {
    /// Config file (default: platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Editor variant
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Starting background
    #[arg(long, value_enum)]
    pub mode: Option<SourceMode>,

    /// Photo to start with (implies --mode photo)
    #[arg(long)]
    pub photo: Option<PathBuf>,

    /// Camera device index
    #[arg(long)]
    pub camera: Option<u32>,

    /// Directory of tattoo PNGs to use instead of the built-in set
    #[arg(long)]
    pub tattoo_dir: Option<PathBuf>,

    /// Where exports are written
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Drawing surface size, WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    pub size: Option<(u32, u32)>,
}

impl Args {
    /// Fold CLI overrides into the loaded config.
    pub fn apply(&self, mut cfg: Config) -> Config {
        if let Some(v) = self.variant {
            cfg.editor.variant = v;
        }
        if let Some(m) = self.mode {
            cfg.editor.mode = m;
        }
        if self.photo.is_some() {
            cfg.editor.mode = SourceMode::Photo;
        }
        if let Some(i) = self.camera {
            cfg.camera.index = i;
        }
        if let Some(dir) = &self.tattoo_dir {
            cfg.assets.tattoo_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            cfg.export.output_dir = dir.clone();
        }
        if let Some((w, h)) = self.size {
            cfg.surface.width = w;
            cfg.surface.height = h;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("10x10").is_err());
        assert!(parse_size("9000x600").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "tattoo-tryon",
            "--variant",
            "simple",
            "--photo",
            "body.jpg",
            "--size",
            "320x240",
            "--camera",
            "2",
        ]);
        let cfg = args.apply(Config::default());
        assert_eq!(cfg.editor.variant, Variant::Simple);
        assert_eq!(cfg.editor.mode, SourceMode::Photo);
        assert_eq!((cfg.surface.width, cfg.surface.height), (320, 240));
        assert_eq!(cfg.camera.index, 2);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["tattoo-tryon"]);
        assert_eq!(args.apply(Config::default()), Config::default());
    }
}
