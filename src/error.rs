// One error type for the whole app.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed

    /// A photo or tattoo image could not be opened or decoded.
    #[error("Could not decode '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Writing the composited PNG failed.
    #[error("Export to '{}' failed: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read config file '{}': {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid config file '{}': {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Tattoo assets error: {0}")]
    Assets(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_init_display() {
        let err = Error::CameraInit("Open stream: busy".to_string());
        assert_eq!(err.to_string(), "Camera init error: Open stream: busy");
    }

    #[test]
    fn test_config_read_display_names_path() {
        let err = Error::ConfigRead {
            path: PathBuf::from("/tmp/tryon.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/tryon.toml"));
        assert!(msg.contains("denied"));
    }
}
