// Configuration file handling.
//
// Loads `config.toml` from the platform config directory
// (`~/.config/tattoo-tryon/config.toml` on Linux) or a custom path.
// Every key is optional; CLI flags override whatever the file says.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::scene::Variant;
use crate::source::SourceMode;
use crate::types::Size;

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Drawing surface size; the exported PNG has exactly these dimensions.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self { width: 640, height: 480 }
    }
}

/// Smallest and largest surface side accepted from the config file or `--size`.
pub const MIN_SURFACE_SIDE: u32 = 64;
pub const MAX_SURFACE_SIDE: u32 = 4096;

impl SurfaceConfig {
    pub fn size(&self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Reject sizes the window can't open or the frame buffer can't hold.
    pub fn validate(&self) -> Result<(), String> {
        check_surface_size(self.width, self.height)
    }
}

pub fn check_surface_size(width: u32, height: u32) -> Result<(), String> {
    if width < MIN_SURFACE_SIDE || height < MIN_SURFACE_SIDE {
        return Err(format!("Surface must be at least {MIN_SURFACE_SIDE}x{MIN_SURFACE_SIDE}, got {width}x{height}"));
    }
    if width > MAX_SURFACE_SIDE || height > MAX_SURFACE_SIDE {
        return Err(format!(
            "Surface exceeds maximum supported ({MAX_SURFACE_SIDE}x{MAX_SURFACE_SIDE}), got {width}x{height}"
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, width: 640, height: 480, fps: 30 }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub variant: Variant,
    /// Background the window starts with.
    pub mode: SourceMode,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct AssetsConfig {
    /// Unset means the artwork built into the binary.
    pub tattoo_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { output_dir: PathBuf::from(".") }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::ConfigRead { path: path.clone(), source: e })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::ConfigParse { path: path.clone(), source: e })?;
        config
            .surface
            .validate()
            .map_err(|reason| Error::ConfigInvalid { path: path.clone(), reason })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("tattoo-tryon").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("tattoo-tryon.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.surface.size(), Size { width: 640, height: 480 });
        assert_eq!(cfg.editor.variant, Variant::Studio);
        assert_eq!(cfg.editor.mode, SourceMode::Camera);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
[surface]
width = 800

[editor]
variant = "simple"
mode = "photo"

[export]
output_dir = "/tmp/out"
"#
        )
        .unwrap();

        let cfg = Config::load(Some(f.path())).unwrap();
        assert_eq!(cfg.surface.width, 800);
        assert_eq!(cfg.surface.height, 480);
        assert_eq!(cfg.editor.variant, Variant::Simple);
        assert_eq!(cfg.editor.mode, SourceMode::Photo);
        assert_eq!(cfg.camera, CameraConfig::default());
        assert_eq!(cfg.export.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.assets.tattoo_dir, None);
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "[surface]\nwidth = \"wide\"").unwrap();
        let err = Config::load(Some(f.path())).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_out_of_range_surface_is_rejected() {
        for body in ["[surface]\nwidth = 0\nheight = 200000", "[surface]\nwidth = 100000", "[surface]\nheight = 10"] {
            let mut f = NamedTempFile::new().unwrap();
            writeln!(f, "{body}").unwrap();
            let err = Config::load(Some(f.path())).unwrap_err();
            assert!(matches!(err, Error::ConfigInvalid { .. }), "{body}: {err}");
        }
    }

    #[test]
    fn test_surface_bounds_are_inclusive() {
        assert!(check_surface_size(MIN_SURFACE_SIDE, MAX_SURFACE_SIDE).is_ok());
        assert!(check_surface_size(MIN_SURFACE_SIDE - 1, 480).is_err());
        assert!(check_surface_size(640, MAX_SURFACE_SIDE + 1).is_err());
    }
}
