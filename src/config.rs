// Command line -> Config, resolved once at startup.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::overlay::FrameCadence;
use crate::transform::Orientation;

#[derive(Parser, Debug)]
#[command(name = "blink", version, about = "Just a little webcam viewer")]
pub struct Args {
    /// Folder with reaction images (<key>.png, <key>.gif or <key>.webp).
    #[arg(long)]
    pub reactions: Option<PathBuf>,

    /// Camera index.
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Requested capture resolution.
    #[arg(long, default_value = "640x480", value_parser = parse_size)]
    pub capture_size: (u32, u32),

    /// Requested capture frame rate.
    #[arg(long, default_value_t = 30)]
    pub capture_fps: u32,

    /// Initial window size.
    #[arg(long, default_value = "500x500", value_parser = parse_size)]
    pub window_size: (u32, u32),

    /// Window size used for fullscreen.
    #[arg(long, default_value = "1920x1080", value_parser = parse_size)]
    pub screen_size: (u32, u32),

    /// Render loop frame rate cap.
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Animated reaction frame rate cap (0 = one frame per render).
    #[arg(long, default_value_t = 30)]
    pub animation_fps: u32,

    /// Rotate camera frames by 90 degrees.
    #[arg(long, value_enum, default_value_t = Orientation::None)]
    pub rotate: Orientation,

    /// Initial zoom, clamped to [1, 5].
    #[arg(long, default_value_t = 1.0)]
    pub zoom: f32,

    /// Start in circle-view.
    #[arg(long)]
    pub circle: bool,

    /// Start always-on-top.
    #[arg(long)]
    pub on_top: bool,

    /// Start without the window frame.
    #[arg(long)]
    pub borderless: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub reactions_dir: PathBuf,
    pub camera_index: u32,
    pub capture_size: (u32, u32),
    pub capture_fps: u32,
    pub window_size: (usize, usize),
    pub screen_size: (usize, usize),
    pub target_fps: usize,
    pub animation_cadence: FrameCadence,
    pub orientation: Orientation,
    pub zoom: f32,
    pub circle_view: bool,
    pub always_on_top: bool,
    pub borderless: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Self {
        let reactions_dir = args.reactions.unwrap_or_else(default_reactions_dir);
        Self {
            reactions_dir,
            camera_index: args.camera,
            capture_size: args.capture_size,
            capture_fps: args.capture_fps.max(1),
            window_size: (args.window_size.0 as usize, args.window_size.1 as usize),
            screen_size: (args.screen_size.0 as usize, args.screen_size.1 as usize),
            target_fps: args.fps.max(1) as usize,
            animation_cadence: FrameCadence::from_fps(args.animation_fps),
            orientation: args.rotate,
            zoom: args.zoom,
            circle_view: args.circle,
            always_on_top: args.on_top,
            borderless: args.borderless,
        }
    }
}

/// Parse `WxH` (e.g. `640x480`). Both sides must be non-zero.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("size must be non-zero, got '{s}'"));
    }
    Ok((w, h))
}

/// Reactions folder when none is given: next to the executable if present
/// (inside the app bundle on macOS), else `reactions` in the working directory.
pub fn default_reactions_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(bundled_reactions_dir))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("reactions"))
}

#[cfg(target_os = "macos")]
fn bundled_reactions_dir(exe_dir: &Path) -> Option<PathBuf> {
    // Foo.app/Contents/MacOS/blink -> Foo.app/Contents/Resources/reactions
    exe_dir.parent().map(|contents| contents.join("Resources").join("reactions"))
}

#[cfg(not(target_os = "macos"))]
fn bundled_reactions_dir(exe_dir: &Path) -> Option<PathBuf> {
    Some(exe_dir.join("reactions"))
}
