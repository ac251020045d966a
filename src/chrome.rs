// Window chrome: the platform calls input can trigger (frame, fullscreen, topmost, opacity,
// transparency).
// The render loop only sees this trait; each window backend decides how (or whether)
// it can honour a call and reports `ChromeError` when it cannot.

use crate::error::ChromeError;

pub trait WindowChrome {
    /// Show or hide the title bar and borders.
    fn set_borderless(&mut self, borderless: bool) -> Result<(), ChromeError>;

    /// Enter or leave fullscreen. Leaving restores the previous windowed size.
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), ChromeError>;

    fn set_always_on_top(&mut self, on_top: bool) -> Result<(), ChromeError>;

    /// Whole-window opacity in [0.1, 1.0].
    fn set_opacity(&mut self, opacity: f32) -> Result<(), ChromeError>;

    /// Let zero-alpha pixels show the desktop behind the window. Implies no frame.
    fn set_transparent(&mut self, transparent: bool) -> Result<(), ChromeError>;
}
