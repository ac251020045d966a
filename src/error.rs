// Error types, one enum per concern.
// `Error` is fatal (the loop stops), the others are reported and the viewer carries on.
use std::path::PathBuf;

/// Faults that end the render loop.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String), // creating the window failed
    #[error("window update error: {0}")]
    WindowUpdate(String), // pushing the buffer to the window failed
    #[error("camera init error: {0}")]
    CameraInit(String), // opening/starting the camera failed
    #[error("camera frame error: {0}")]
    CameraFrame(String), // grabbing/decoding a frame failed
}

/// Reaction lookup failures. All of them mean "no overlay this time".
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("reaction not found, tried: {}", display_paths(.attempted))]
    NotFound { attempted: Vec<PathBuf> },

    #[error("failed to decode '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to open '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("animation '{}' has no frames", .path.display())]
    NoFrames { path: PathBuf },
}

impl MediaError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MediaError::NotFound { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Platform window calls (frame, fullscreen, topmost, opacity, transparency).
#[derive(thiserror::Error, Debug)]
pub enum ChromeError {
    #[error("{0} is not supported by this window backend")]
    Unsupported(&'static str),
    #[error("window recreate failed: {0}")]
    Recreate(String),
    #[cfg(target_os = "windows")]
    #[error("window system call failed: {0}")]
    Platform(String),
}

/// Startup check of the reactions folder.
#[derive(thiserror::Error, Debug)]
pub enum InventoryError {
    #[error("folder not found: {}", .dir.display())]
    Missing { dir: PathBuf, cwd: PathBuf },
    #[error("no images found in folder '{}'", .dir.display())]
    Empty { dir: PathBuf },
    #[error("cannot read folder '{}': {source}", .dir.display())]
    Unreadable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
