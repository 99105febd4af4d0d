//! Decoded image handles shared between regions.

use image::RgbaImage;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a decoded image.
///
/// Cloning is cheap and equality is identity, so two regions showing the same
/// cached location hold equal handles.
#[derive(Clone)]
pub struct ImageHandle(Rc<RgbaImage>);

impl ImageHandle {
    /// Wraps decoded pixels.
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self(Rc::new(pixels))
    }

    /// Decodes an encoded payload (PNG) into a handle.
    ///
    /// # Errors
    ///
    /// Returns the decoder's message if the bytes are not a supported image.
    pub fn decode(bytes: &[u8]) -> std::result::Result<Self, String> {
        image::load_from_memory(bytes)
            .map(|decoded| Self::new(decoded.to_rgba8()))
            .map_err(|e| e.to_string())
    }

    /// Natural width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Natural height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Decoded RGBA pixels.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}
