// Overlay scheduler: at most one reaction on screen, gone 5 seconds after activation.
// Visibility is a pure function of (activated_at, now). Advancing an animation is a
// separate step the render loop takes after it actually drew an animated frame.

use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::media::OverlayMedia;

pub const EXPIRY: Duration = Duration::from_secs(5);

/// Ceiling on how often an animation may step to its next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCadence {
    min_interval: Option<Duration>,
}

impl FrameCadence {
    /// Every advance request steps the animation.
    pub const UNCAPPED: Self = Self { min_interval: None };

    /// At most `fps` steps per second. `0` means uncapped.
    pub fn from_fps(fps: u32) -> Self {
        match fps {
            0 => Self::UNCAPPED,
            fps => Self { min_interval: Some(Duration::from_secs(1) / fps) },
        }
    }

    fn permits(&self, last: Option<Instant>, now: Instant) -> bool {
        match (self.min_interval, last) {
            (Some(min), Some(last)) => now.saturating_duration_since(last) >= min,
            _ => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    Static,
    Animated,
}

/// What the compositor draws this tick.
#[derive(Clone, Copy, Debug)]
pub struct RenderableOverlay<'a> {
    pub image: &'a RgbaImage,
    pub kind: OverlayKind,
    /// Identifies the buffer across ticks (activation serial, frame index).
    pub id: (u64, usize),
}

struct OverlaySession {
    media: OverlayMedia,
    activated_at: Instant,
    serial: u64,
    counter: u64,
    last_advance: Option<Instant>,
}

impl OverlaySession {
    fn is_active(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.activated_at) < EXPIRY
    }
}

pub struct OverlayScheduler {
    session: Option<OverlaySession>,
    cadence: FrameCadence,
    next_serial: u64,
}

impl OverlayScheduler {
    pub fn new(cadence: FrameCadence) -> Self {
        Self { session: None, cadence, next_serial: 0 }
    }

    /// Replace whatever is showing with `media`, starting now at frame 0.
    pub fn activate(&mut self, media: OverlayMedia, now: Instant) {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.session = Some(OverlaySession {
            media,
            activated_at: now,
            serial,
            counter: 0,
            last_advance: None,
        });
    }

    #[cfg(test)]
    pub fn is_active(&self, now: Instant) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_active(now))
    }

    /// The buffer to draw at `now`, or `None` when nothing is active.
    pub fn current_overlay(&self, now: Instant) -> Option<RenderableOverlay<'_>> {
        let session = self.session.as_ref().filter(|s| s.is_active(now))?;
        match &session.media {
            OverlayMedia::Static(img) => Some(RenderableOverlay {
                image: img,
                kind: OverlayKind::Static,
                id: (session.serial, 0),
            }),
            OverlayMedia::Animated(frames) => {
                let index = (session.counter % frames.len() as u64) as usize;
                Some(RenderableOverlay {
                    image: &frames[index],
                    kind: OverlayKind::Animated,
                    id: (session.serial, index),
                })
            }
        }
    }

    /// Step an active animation by one frame, subject to the cadence cap.
    /// Returns whether the counter moved. Static or expired overlays never advance.
    pub fn advance(&mut self, now: Instant) -> bool {
        let cadence = self.cadence;
        let Some(session) = self.session.as_mut().filter(|s| s.is_active(now)) else {
            return false;
        };
        if !matches!(session.media, OverlayMedia::Animated(_)) {
            return false;
        }
        if !cadence.permits(session.last_advance, now) {
            return false;
        }
        session.counter += 1;
        session.last_advance = Some(now);
        true
    }
}
