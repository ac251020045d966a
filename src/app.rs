// The viewer state and the render loop.
// One tick: capture -> transform -> composite -> present -> drain input. Nothing else
// touches ViewState or the overlay session, so no locking anywhere.

use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::camera::FrameSource;
use crate::chrome::WindowChrome;
use crate::composite::Compositor;
use crate::config::Config;
use crate::draw::ViewerWindow;
use crate::error::{ChromeError, Error};
use crate::input::{Action, action_for};
use crate::media::{MediaLoader, ReactionKey};
use crate::overlay::{OverlayKind, OverlayScheduler};
use crate::transform::FramePipeline;
use crate::types::{FrameBuffer, OPACITY_STEP, RawFrame, ViewState, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Viewer {
    pub view: ViewState,
    overlays: OverlayScheduler,
    loader: MediaLoader,
    pipeline: FramePipeline,
    compositor: Compositor,
    // Last presented image; shown again when a tick cannot be rendered.
    surface: FrameBuffer,
}

impl Viewer {
    pub fn new(config: &Config) -> Self {
        let mut view = ViewState::default();
        view.set_zoom(config.zoom);
        view.circle_view = config.circle_view;
        view.always_on_top = config.always_on_top;
        view.frame_visible = !config.borderless;

        Self {
            view,
            overlays: OverlayScheduler::new(config.animation_cadence),
            loader: MediaLoader::new(&config.reactions_dir),
            pipeline: FramePipeline::new(config.orientation),
            compositor: Compositor::new(),
            surface: FrameBuffer::new(0, 0),
        }
    }

    /// Render one camera frame at `target` size and return what should be presented.
    pub fn render(&mut self, raw: RawFrame, target: (u32, u32), now: Instant) -> &FrameBuffer {
        let Some(frame) = self.pipeline.transform(raw, &self.view, target) else {
            trace!(?target, "degenerate crop, keeping previous frame");
            return &self.surface;
        };

        // Circle-view and reactions do not mix: the mask wins.
        let overlay = if self.view.circle_view { None } else { self.overlays.current_overlay(now) };
        let animated = overlay.is_some_and(|o| o.kind == OverlayKind::Animated);

        self.compositor.compose(frame, overlay, &mut self.surface);
        if animated {
            self.overlays.advance(now);
        }
        &self.surface
    }

    /// Apply one input action.
    pub fn dispatch(&mut self, action: Action, chrome: &mut dyn WindowChrome, now: Instant) -> Flow {
        debug!(?action, "input");
        match action {
            Action::Quit => return Flow::Quit,
            Action::ToggleFrame => {
                self.view.frame_visible = !self.view.frame_visible;
                if let Err(e) = chrome.set_borderless(!self.view.frame_visible) {
                    self.view.frame_visible = !self.view.frame_visible;
                    report_chrome("window frame", &e);
                }
            }
            Action::ToggleFullscreen => {
                self.view.fullscreen = !self.view.fullscreen;
                if let Err(e) = chrome.set_fullscreen(self.view.fullscreen) {
                    self.view.fullscreen = !self.view.fullscreen;
                    report_chrome("fullscreen", &e);
                }
            }
            Action::ToggleOnTop => {
                self.view.always_on_top = !self.view.always_on_top;
                if let Err(e) = chrome.set_always_on_top(self.view.always_on_top) {
                    self.view.always_on_top = !self.view.always_on_top;
                    report_chrome("always on top", &e);
                }
            }
            Action::OpacityUp | Action::OpacityDown => {
                let before = self.view.opacity();
                let step = if action == Action::OpacityUp { OPACITY_STEP } else { -OPACITY_STEP };
                self.view.opacity_by(step);
                if let Err(e) = chrome.set_opacity(self.view.opacity()) {
                    self.view.set_opacity(before);
                    report_chrome("opacity", &e);
                }
            }
            Action::ZoomIn => self.view.zoom_by(ZOOM_STEP),
            Action::ZoomOut => self.view.zoom_by(-ZOOM_STEP),
            Action::ZoomReset => self.view.set_zoom(ZOOM_MIN),
            Action::ZoomMax => self.view.set_zoom(ZOOM_MAX),
            Action::ToggleCircle => {
                self.view.circle_view = !self.view.circle_view;
                // Without a see-through window the mask still crops, just over black.
                if let Err(e) = chrome.set_transparent(self.view.circle_view) {
                    report_chrome("circle view transparency", &e);
                }
            }
            Action::React(key) => self.react(key, now),
        }
        Flow::Continue
    }

    /// Load the reaction for `key` and show it. On failure the current overlay stays.
    pub fn react(&mut self, key: ReactionKey, now: Instant) {
        match self.loader.load(key) {
            Ok(media) => {
                debug!(key = %key.as_char(), frames = media.frame_count(), "reaction");
                self.overlays.activate(media, now);
            }
            Err(e) if e.is_not_found() => warn!(key = %key.as_char(), "{e}"),
            Err(e) => warn!(key = %key.as_char(), "reaction failed: {e}"),
        }
    }

    #[cfg(test)]
    pub fn overlay_active(&self, now: Instant) -> bool {
        self.overlays.is_active(now)
    }
}

fn report_chrome(what: &str, err: &ChromeError) {
    warn!("{what}: {err}");
}

/// Drive ticks until the window closes, Escape/quit is pressed, or capture fails.
/// A capture or present failure is returned to the caller.
pub fn run<S, W>(source: &mut S, window: &mut W, viewer: &mut Viewer) -> Result<(), Error>
where
    S: FrameSource,
    W: ViewerWindow,
{
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    while window.is_open() {
        let raw = source.next_frame()?;

        let (w, h) = window.size();
        let now = Instant::now();
        let surface = viewer.render(raw, (w as u32, h as u32), now);
        window.present(surface)?;

        for key in window.keys_pressed() {
            let Some(action) = action_for(key) else { continue };
            if viewer.dispatch(action, window, Instant::now()) == Flow::Quit {
                info!("quit requested");
                return Ok(());
            }
        }

        frames_this_second += 1;
        let elapsed = now.duration_since(last_fps_time);
        if elapsed >= Duration::from_secs(1) {
            debug!(fps = frames_this_second as f32 / elapsed.as_secs_f32(), "render rate");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }
    info!("window closed");
    Ok(())
}
