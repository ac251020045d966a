// Reaction media: find `<dir>/<key>.<ext>` and decode it into RGBA buffers.
// Lookup order is png (still), gif (animated), webp (still); the first file that
// exists is the one we decode, even if decoding it fails.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};
use tracing::debug;

use crate::error::MediaError;

/// Keys that can trigger a reaction.
pub const REACTION_KEYS: [char; 19] = [
    'q', 'w', 'e', 'a', 's', 'd', 'z', 'x', 'c', '0', '1', '2', '3', '4', '5', '6', '7', '8',
    '9',
];

/// A single character naming a reaction file (lowercase letter or digit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReactionKey(char);

impl ReactionKey {
    pub fn new(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        REACTION_KEYS.contains(&c).then_some(Self(c))
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Still,
    Animated,
}

/// Probe order. Extension first, then how it is decoded.
const PROBE_ORDER: [(&str, Format); 3] =
    [("png", Format::Still), ("gif", Format::Animated), ("webp", Format::Still)];

/// Decoded overlay. An animation always holds at least one frame.
#[derive(Clone, Debug)]
pub enum OverlayMedia {
    Static(RgbaImage),
    Animated(Vec<RgbaImage>),
}

impl OverlayMedia {
    pub fn frame_count(&self) -> usize {
        match self {
            OverlayMedia::Static(_) => 1,
            OverlayMedia::Animated(frames) => frames.len(),
        }
    }
}

/// Resolves reaction keys against a directory fixed at startup.
pub struct MediaLoader {
    dir: PathBuf,
}

impl MediaLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The three candidate paths for `key`, in lookup order.
    pub fn candidates(&self, key: ReactionKey) -> [PathBuf; 3] {
        PROBE_ORDER.map(|(ext, _)| self.dir.join(format!("{}.{ext}", key.as_char())))
    }

    /// Find and decode the reaction for `key`.
    pub fn load(&self, key: ReactionKey) -> Result<OverlayMedia, MediaError> {
        let candidates = self.candidates(key);
        for (path, (_, format)) in candidates.iter().zip(PROBE_ORDER) {
            if !path.is_file() {
                continue;
            }
            debug!(path = %path.display(), ?format, "loading reaction");
            return match format {
                Format::Still => load_still(path).map(OverlayMedia::Static),
                Format::Animated => load_animation(path).map(OverlayMedia::Animated),
            };
        }
        Err(MediaError::NotFound { attempted: candidates.to_vec() })
    }
}

/// Decode a still image (png/webp) into one RGBA buffer.
pub fn load_still(path: &Path) -> Result<RgbaImage, MediaError> {
    let img = image::open(path)
        .map_err(|source| MediaError::Decode { path: path.to_path_buf(), source })?;
    Ok(img.to_rgba8())
}

/// Decode every frame of a GIF into RGBA buffers, in order.
/// The frame iterator ends at end-of-stream; any error item aborts the load.
pub fn load_animation(path: &Path) -> Result<Vec<RgbaImage>, MediaError> {
    let file =
        File::open(path).map_err(|source| MediaError::Io { path: path.to_path_buf(), source })?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .map_err(|source| MediaError::Decode { path: path.to_path_buf(), source })?;

    let mut frames = Vec::new();
    for frame in decoder.into_frames() {
        let frame = frame.map_err(|source| MediaError::Decode { path: path.to_path_buf(), source })?;
        frames.push(frame.into_buffer());
    }

    if frames.is_empty() {
        return Err(MediaError::NoFrames { path: path.to_path_buf() });
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, ImageFormat, Rgba};

    fn write_png(path: &Path, w: u32, h: u32, color: [u8; 4]) {
        RgbaImage::from_pixel(w, h, Rgba(color))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    fn write_gif(path: &Path, colors: &[[u8; 4]]) {
        let file = File::create(path).unwrap();
        let mut enc = GifEncoder::new(file);
        let frames = colors.iter().map(|c| {
            Frame::from_parts(
                RgbaImage::from_pixel(4, 4, Rgba(*c)),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            )
        });
        enc.encode_frames(frames).unwrap();
    }

    #[test]
    fn reaction_keys_are_case_insensitive_and_limited() {
        assert_eq!(ReactionKey::new('Q').map(ReactionKey::as_char), Some('q'));
        assert_eq!(ReactionKey::new('7').map(ReactionKey::as_char), Some('7'));
        assert!(ReactionKey::new('m').is_none());
        assert!(ReactionKey::new(' ').is_none());
    }

    #[test]
    fn png_wins_and_gif_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("q.png"), 3, 2, [255, 0, 0, 255]);
        // A broken gif next to it must never be read.
        std::fs::write(dir.path().join("q.gif"), b"not a gif").unwrap();

        let loader = MediaLoader::new(dir.path());
        let media = loader.load(ReactionKey::new('q').unwrap()).unwrap();
        match media {
            OverlayMedia::Static(img) => assert_eq!(img.dimensions(), (3, 2)),
            other => panic!("expected static, got {other:?}"),
        }
    }

    #[test]
    fn gif_decodes_all_frames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_gif(&dir.path().join("w.gif"), &[[255, 0, 0, 255], [0, 0, 255, 255], [0, 255, 0, 255]]);

        let loader = MediaLoader::new(dir.path());
        let media = loader.load(ReactionKey::new('w').unwrap()).unwrap();
        let OverlayMedia::Animated(frames) = media else { panic!("expected animation") };
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.dimensions() == (4, 4)));
        let first = frames[0].get_pixel(1, 1).0;
        let second = frames[1].get_pixel(1, 1).0;
        assert!(first[0] > 200 && first[2] < 50);
        assert!(second[2] > 200 && second[0] < 50);
    }

    #[test]
    fn webp_is_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))
            .save_with_format(dir.path().join("e.webp"), ImageFormat::WebP)
            .unwrap();

        let loader = MediaLoader::new(dir.path());
        let media = loader.load(ReactionKey::new('e').unwrap()).unwrap();
        assert!(matches!(media, OverlayMedia::Static(_)));
        assert_eq!(media.frame_count(), 1);
    }

    #[test]
    fn missing_reaction_reports_all_three_paths() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MediaLoader::new(dir.path());
        let err = loader.load(ReactionKey::new('5').unwrap()).unwrap_err();
        match err {
            MediaError::NotFound { attempted } => {
                assert_eq!(attempted, loader.candidates(ReactionKey::new('5').unwrap()).to_vec());
                assert!(attempted[0].ends_with("5.png"));
                assert!(attempted[1].ends_with("5.gif"));
                assert!(attempted[2].ends_with("5.webp"));
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_first_match_is_a_decode_error_not_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"garbage").unwrap();
        write_png(&dir.path().join("a.webp"), 1, 1, [0, 0, 0, 255]);

        let loader = MediaLoader::new(dir.path());
        let err = loader.load(ReactionKey::new('a').unwrap()).unwrap_err();
        assert!(matches!(err, MediaError::Decode { .. }));
    }
}
