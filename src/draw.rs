// The minifb window: presents FrameBuffers, reports its size and pressed keys,
// and implements the window chrome by recreating itself with new options.

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::{debug, warn};

use crate::chrome::WindowChrome;
use crate::error::{ChromeError, Error};
use crate::types::{FrameBuffer, OPACITY_MAX};

/// What the render loop needs from a window.
pub trait ViewerWindow: WindowChrome {
    fn is_open(&self) -> bool;
    fn size(&self) -> (usize, usize);
    fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error>;
    fn keys_pressed(&self) -> Vec<Key>;
}

/// Options a window is (re)created with.
#[derive(Clone, Copy, Debug, Default)]
struct Chrome {
    borderless: bool,
    fullscreen: bool,
    topmost: bool,
    // Per-pixel alpha from the buffer reaches the desktop (circle-view).
    transparent: bool,
}

pub struct Drawer {
    window: Window,
    title: String,
    chrome: Chrome,
    target_fps: usize,
    // Size to return to when leaving fullscreen.
    windowed_size: (usize, usize),
    screen_size: (usize, usize),
    // Survives window recreation.
    opacity: f32,
}

impl Drawer {
    /// Open a resizable window.
    pub fn new(
        title: &str,
        size: (usize, usize),
        screen_size: (usize, usize),
        target_fps: usize,
        borderless: bool,
        topmost: bool,
    ) -> Result<Self, Error> {
        let chrome = Chrome { borderless, topmost, ..Chrome::default() };
        let window = open_window(title, size, chrome, target_fps).map_err(Error::WindowInit)?;
        Ok(Self {
            window,
            title: title.to_string(),
            chrome,
            target_fps,
            windowed_size: size,
            screen_size,
            opacity: OPACITY_MAX,
        })
    }

    /// Replace the window with one built from `chrome` at `size`.
    fn recreate(&mut self, chrome: Chrome, size: (usize, usize)) -> Result<(), ChromeError> {
        let window = open_window(&self.title, size, chrome, self.target_fps)
            .map_err(ChromeError::Recreate)?;
        debug!(?chrome, ?size, "window recreated");
        self.window = window;
        self.chrome = chrome;
        if self.opacity < OPACITY_MAX {
            // A fresh window starts opaque.
            if let Err(e) = self.apply_opacity(self.opacity) {
                warn!("opacity lost on recreate: {e}");
                self.opacity = OPACITY_MAX;
            }
        }
        Ok(())
    }

    #[cfg(target_os = "windows")]
    fn apply_opacity(&mut self, opacity: f32) -> Result<(), ChromeError> {
        layered::set_alpha(self.window.get_window_handle(), alpha_byte(opacity))
    }

    #[cfg(not(target_os = "windows"))]
    fn apply_opacity(&mut self, _opacity: f32) -> Result<(), ChromeError> {
        Err(ChromeError::Unsupported("window opacity"))
    }
}

/// Opacity in [0, 1] as the 0..=255 alpha the window system takes.
#[cfg(any(target_os = "windows", test))]
fn alpha_byte(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn window_options(chrome: Chrome) -> WindowOptions {
    let frameless = chrome.borderless || chrome.fullscreen || chrome.transparent;
    WindowOptions {
        borderless: frameless,
        title: !frameless,
        resize: !chrome.fullscreen,
        topmost: chrome.topmost,
        transparency: chrome.transparent,
        ..WindowOptions::default()
    }
}

fn open_window(
    title: &str,
    size: (usize, usize),
    chrome: Chrome,
    target_fps: usize,
) -> Result<Window, String> {
    let opts = window_options(chrome);
    // A frameless window gets no caption either.
    let caption = if opts.title { title } else { "" };
    let mut window =
        Window::new(caption, size.0.max(1), size.1.max(1), opts).map_err(|e| e.to_string())?;
    window.set_target_fps(target_fps);
    Ok(window)
}

impl ViewerWindow for Drawer {
    /// Returns false when the user closes the window (so we can stop the loop).
    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window shows `framebuffer` stretched to its client area; with
    /// transparency on, zero-alpha pixels show whatever is behind the window.
    fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        if framebuffer.pixels.is_empty() {
            // Nothing rendered yet; still pump window events.
            self.window.update();
            return Ok(());
        }
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    fn keys_pressed(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::No)
    }
}

impl WindowChrome for Drawer {
    fn set_borderless(&mut self, borderless: bool) -> Result<(), ChromeError> {
        if self.chrome.borderless == borderless {
            return Ok(());
        }
        let size = self.window.get_size();
        self.recreate(Chrome { borderless, ..self.chrome }, size)
    }

    // minifb has no real fullscreen; emulate with a frameless window at screen size.
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), ChromeError> {
        if self.chrome.fullscreen == fullscreen {
            return Ok(());
        }
        let size = if fullscreen {
            self.windowed_size = self.window.get_size();
            self.screen_size
        } else {
            self.windowed_size
        };
        self.recreate(Chrome { fullscreen, ..self.chrome }, size)
    }

    fn set_always_on_top(&mut self, on_top: bool) -> Result<(), ChromeError> {
        self.window.topmost(on_top);
        self.chrome.topmost = on_top;
        Ok(())
    }

    fn set_opacity(&mut self, opacity: f32) -> Result<(), ChromeError> {
        self.apply_opacity(opacity)?;
        self.opacity = opacity;
        Ok(())
    }

    // minifb cannot make a macOS window see-through; the mask then reads as black.
    #[cfg(target_os = "macos")]
    fn set_transparent(&mut self, _transparent: bool) -> Result<(), ChromeError> {
        Err(ChromeError::Unsupported("window transparency"))
    }

    #[cfg(not(target_os = "macos"))]
    fn set_transparent(&mut self, transparent: bool) -> Result<(), ChromeError> {
        if self.chrome.transparent == transparent {
            return Ok(());
        }
        let size = self.window.get_size();
        self.recreate(Chrome { transparent, ..self.chrome }, size)
    }
}

#[cfg(target_os = "windows")]
mod layered {
    use std::ffi::c_void;

    use windows::Win32::Foundation::{COLORREF, HWND};
    use windows::Win32::UI::WindowsAndMessaging::{
        GWL_EXSTYLE, GetWindowLongW, LWA_ALPHA, SetLayeredWindowAttributes, SetWindowLongW,
        WS_EX_LAYERED,
    };

    use crate::error::ChromeError;

    /// Whole-window alpha through the layered-window attributes.
    pub fn set_alpha(handle: *mut c_void, alpha: u8) -> Result<(), ChromeError> {
        if handle.is_null() {
            return Err(ChromeError::Platform("no native window handle".into()));
        }
        let hwnd = HWND(handle);
        unsafe {
            let style = GetWindowLongW(hwnd, GWL_EXSTYLE);
            if style & WS_EX_LAYERED.0 as i32 == 0 {
                SetWindowLongW(hwnd, GWL_EXSTYLE, style | WS_EX_LAYERED.0 as i32);
            }
            SetLayeredWindowAttributes(hwnd, COLORREF(0), alpha, LWA_ALPHA)
                .map_err(|e| ChromeError::Platform(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_byte_spans_the_opacity_range() {
        assert_eq!(alpha_byte(1.0), 255);
        assert_eq!(alpha_byte(0.1), 26);
        assert_eq!(alpha_byte(0.5), 128);
        assert_eq!(alpha_byte(2.0), 255);
    }

    #[test]
    fn transparent_window_is_frameless_with_transparency() {
        let opts = window_options(Chrome { transparent: true, ..Chrome::default() });
        assert!(opts.transparency);
        assert!(opts.borderless);
        assert!(!opts.title);
        assert!(opts.resize);

        let opts = window_options(Chrome::default());
        assert!(!opts.transparency);
        assert!(!opts.borderless);
        assert!(opts.title);
    }

    #[test]
    fn fullscreen_window_is_frameless_and_fixed() {
        let opts = window_options(Chrome { fullscreen: true, topmost: true, ..Chrome::default() });
        assert!(opts.borderless && !opts.resize && opts.topmost);
        assert!(!opts.transparency);
    }
}
