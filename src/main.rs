// Blink: a little webcam viewer.
// • Live camera fills the window, cropped (never letterboxed) to its aspect ratio.
// • Up/Down zoom, V masks the view to a circle, Space hides the window frame.
// • Reaction keys pop a picture or GIF into the top-right corner for five seconds.
// • ESC quits.

mod app;
mod camera;
mod chrome;
mod composite;
mod config;
mod draw;
mod error;
mod input;
mod inventory;
mod media;
mod overlay;
mod transform;
mod types;

use anyhow::Context as _;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use app::Viewer;
use camera::CameraCapture;
use chrome::WindowChrome;
use config::{Args, Config};
use draw::Drawer;

const TITLE: &str = "Blink";

fn main() -> anyhow::Result<()> {
    let config = Config::from_args(Args::parse());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blink=info")),
        )
        .init();

    // The folder is checked before anything else opens; a bad folder never reaches the loop.
    let files = match inventory::check_reactions(&config.reactions_dir) {
        Ok(files) => files,
        Err(e) => {
            error!("{e}");
            eprintln!("{}", inventory::remedy(&e));
            return Ok(());
        }
    };
    println!("{}", inventory::banner(&config.reactions_dir, &files));

    let (cw, ch) = config.capture_size;
    let mut cam = CameraCapture::new(config.camera_index, cw, ch, config.capture_fps)
        .context("could not open webcam")?;
    info!(resolution = ?cam.resolution(), "capture ready");

    let mut drawer = Drawer::new(
        TITLE,
        config.window_size,
        config.screen_size,
        config.target_fps,
        config.borderless,
        config.always_on_top,
    )
    .context("could not open window")?;
    if config.circle_view {
        if let Err(e) = drawer.set_transparent(true) {
            warn!("circle view: {e}");
        }
    }

    let mut viewer = Viewer::new(&config);

    // Camera and window are released on drop whichever way the loop ends.
    if let Err(e) = app::run(&mut cam, &mut drawer, &mut viewer) {
        error!("{e}");
        return Err(e).context("render loop stopped");
    }
    Ok(())
}
