//! Background image state and the drag-to-position workflow.
//!
//! The committed offset is what gets persisted and drawn normally. Uploading
//! an image opens a positioning session that carries a temporary offset and,
//! while a pointer gesture is underway, the gesture's anchor point. Only
//! `confirm_position` touches the committed offset.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{NotesError, Result};

/// Cell offset of the background relative to the panel origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn shifted(self, from: Offset, to: Offset) -> Self {
        Self {
            x: self.x.saturating_add(to.x.saturating_sub(from.x)),
            y: self.y.saturating_add(to.y.saturating_sub(from.y)),
        }
    }
}

pub struct BackgroundImage {
    payload: String,
    image: DynamicImage,
}

impl BackgroundImage {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Positioning {
    temp: Offset,
    anchor: Option<Offset>,
}

#[derive(Default)]
pub struct BackgroundState {
    image: Option<BackgroundImage>,
    offset: Offset,
    positioning: Option<Positioning>,
    generation: u64,
}

impl BackgroundState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&BackgroundImage> {
        self.image.as_ref()
    }

    pub fn payload(&self) -> Option<&str> {
        self.image.as_ref().map(|i| i.payload.as_str())
    }

    pub fn committed_offset(&self) -> Offset {
        self.offset
    }

    /// Bumped whenever the image itself changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_positioning(&self) -> bool {
        self.positioning.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.positioning.is_some_and(|p| p.anchor.is_some())
    }

    /// Offset to draw with: the temporary one during positioning.
    pub fn display_offset(&self) -> Offset {
        self.positioning.map_or(self.offset, |p| p.temp)
    }

    /// Decodes the payload, installs it and starts positioning from the
    /// committed offset. A payload that does not decode changes nothing.
    pub fn upload_image(&mut self, payload: String) -> Result<()> {
        let image = decode_data_url(&payload)?;
        self.install(payload, image);
        self.positioning = Some(Positioning {
            temp: self.offset,
            anchor: None,
        });
        Ok(())
    }

    /// Startup rehydration: installs the stored image without positioning.
    pub fn restore_image(&mut self, payload: String) -> Result<()> {
        let image = decode_data_url(&payload)?;
        self.install(payload, image);
        Ok(())
    }

    pub fn restore_offset(&mut self, offset: Offset) {
        self.offset = offset;
    }

    pub fn clear_image(&mut self) -> bool {
        if self.image.is_none() {
            return false;
        }
        self.image = None;
        self.positioning = None;
        self.generation += 1;
        true
    }

    fn install(&mut self, payload: String, image: DynamicImage) {
        self.image = Some(BackgroundImage { payload, image });
        self.generation += 1;
    }

    pub fn begin_drag(&mut self, pointer: Offset) -> bool {
        match self.positioning.as_mut() {
            Some(p) => {
                p.anchor = Some(pointer);
                true
            }
            None => false,
        }
    }

    pub fn drag_to(&mut self, pointer: Offset) -> bool {
        let committed = self.offset;
        match self.positioning.as_mut() {
            Some(Positioning {
                temp,
                anchor: Some(anchor),
            }) => {
                *temp = committed.shifted(*anchor, pointer);
                true
            }
            _ => false,
        }
    }

    /// Ends one pointer gesture. Positioning stays active.
    pub fn end_drag_gesture(&mut self) {
        if let Some(p) = self.positioning.as_mut() {
            p.anchor = None;
        }
    }

    /// Commits the temporary offset. Returns true when it must be persisted.
    pub fn confirm_position(&mut self) -> bool {
        match self.positioning.take() {
            Some(p) => {
                self.offset = p.temp;
                true
            }
            None => false,
        }
    }

    pub fn cancel_position(&mut self) -> bool {
        self.positioning.take().is_some()
    }
}

/// Reads an image file and encodes it as a base64 data URL.
pub fn read_image_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    encode_data_url(&bytes)
}

pub fn encode_data_url(bytes: &[u8]) -> Result<String> {
    let format = image::guess_format(bytes)
        .map_err(|e| NotesError::ImageDecodeFailed(e.to_string()))?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        BASE64.encode(bytes)
    ))
}

pub fn decode_data_url(payload: &str) -> Result<DynamicImage> {
    let (header, data) = payload
        .split_once(',')
        .ok_or_else(|| NotesError::ImageDecodeFailed("not a data URL".into()))?;
    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        return Err(NotesError::ImageDecodeFailed(format!(
            "unsupported payload header '{}'",
            header
        )));
    }
    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| NotesError::ImageDecodeFailed(e.to_string()))?;
    image::load_from_memory(&bytes).map_err(|e| NotesError::ImageDecodeFailed(e.to_string()))
}

#[cfg(test)]
pub(crate) fn sample_payload() -> String {
    let mut bytes = Vec::new();
    DynamicImage::new_rgb8(4, 3)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    encode_data_url(&bytes).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_payload() -> String {
        sample_payload()
    }

    fn positioned_at(x: i32, y: i32) -> BackgroundState {
        let mut bg = BackgroundState::new();
        bg.restore_offset(Offset::new(x, y));
        bg.upload_image(png_payload()).unwrap();
        bg
    }

    #[test]
    fn test_encode_produces_png_data_url() {
        let payload = png_payload();
        assert!(payload.starts_with("data:image/png;base64,"));
        let image = decode_data_url(&payload).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }

    #[test]
    fn test_encode_rejects_non_images() {
        assert!(matches!(
            encode_data_url(b"plain text, not pixels"),
            Err(NotesError::ImageDecodeFailed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_data_url("hello").is_err());
        assert!(decode_data_url("data:text/plain;base64,aGk=").is_err());
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
        assert!(decode_data_url("data:image/png;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn test_upload_enters_positioning_from_committed() {
        let bg = positioned_at(10, 10);
        assert!(bg.is_positioning());
        assert!(!bg.is_dragging());
        assert_eq!(bg.display_offset(), Offset::new(10, 10));
        assert_eq!(bg.generation(), 1);
    }

    #[test]
    fn test_failed_upload_changes_nothing() {
        let mut bg = BackgroundState::new();
        assert!(bg.upload_image("data:image/png;base64,AAAA".into()).is_err());
        assert!(bg.image().is_none());
        assert!(!bg.is_positioning());
        assert_eq!(bg.generation(), 0);
    }

    #[test]
    fn test_drag_then_cancel_keeps_committed() {
        let mut bg = positioned_at(10, 10);
        bg.begin_drag(Offset::new(5, 5));
        bg.drag_to(Offset::new(12, 1));
        assert_eq!(bg.display_offset(), Offset::new(17, 6));

        bg.end_drag_gesture();
        assert!(bg.cancel_position());
        assert_eq!(bg.committed_offset(), Offset::new(10, 10));
        assert_eq!(bg.display_offset(), Offset::new(10, 10));
        assert!(!bg.is_positioning());
    }

    #[test]
    fn test_drag_then_confirm_commits_delta() {
        let mut bg = positioned_at(10, 10);
        bg.begin_drag(Offset::new(0, 0));
        bg.drag_to(Offset::new(-3, 4));
        bg.end_drag_gesture();
        assert!(bg.confirm_position());
        assert_eq!(bg.committed_offset(), Offset::new(7, 14));
        assert!(!bg.confirm_position());
    }

    #[test]
    fn test_delta_is_measured_from_committed_not_previous_move() {
        let mut bg = positioned_at(0, 0);
        bg.begin_drag(Offset::new(2, 2));
        bg.drag_to(Offset::new(4, 2));
        bg.drag_to(Offset::new(6, 3));
        assert_eq!(bg.display_offset(), Offset::new(4, 1));
    }

    #[test]
    fn test_second_gesture_restarts_from_committed() {
        let mut bg = positioned_at(0, 0);
        bg.begin_drag(Offset::new(0, 0));
        bg.drag_to(Offset::new(3, 0));
        bg.end_drag_gesture();
        bg.begin_drag(Offset::new(10, 10));
        bg.drag_to(Offset::new(11, 10));
        assert_eq!(bg.display_offset(), Offset::new(1, 0));
    }

    #[test]
    fn test_drag_outside_positioning_is_ignored() {
        let mut bg = BackgroundState::new();
        assert!(!bg.begin_drag(Offset::new(1, 1)));
        assert!(!bg.drag_to(Offset::new(9, 9)));
        assert_eq!(bg.display_offset(), Offset::default());
    }

    #[test]
    fn test_drag_from_extreme_offset_saturates() {
        let mut bg = positioned_at(i32::MAX, i32::MIN);
        bg.begin_drag(Offset::new(0, 0));
        bg.drag_to(Offset::new(5, -5));
        assert_eq!(bg.display_offset(), Offset::new(i32::MAX, i32::MIN));

        bg.drag_to(Offset::new(i32::MIN, i32::MAX));
        assert_eq!(bg.display_offset(), Offset::new(-1, -1));
    }

    #[test]
    fn test_move_without_anchor_is_ignored() {
        let mut bg = positioned_at(2, 2);
        assert!(!bg.drag_to(Offset::new(9, 9)));
        assert_eq!(bg.display_offset(), Offset::new(2, 2));
    }

    #[test]
    fn test_clear_image() {
        let mut bg = positioned_at(0, 0);
        assert!(bg.clear_image());
        assert!(bg.image().is_none());
        assert!(!bg.is_positioning());
        assert!(!bg.clear_image());
    }
}
