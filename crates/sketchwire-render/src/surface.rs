use thiserror::Error;
use tiny_skia::{Color, Pixmap};

/// White, matching the cleared canvas the elements are composited onto.
pub(crate) const BACKGROUND: Color = Color::WHITE;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// An owned raster target. Created blank (white) at a fixed size; resizing
/// discards the pixels, callers re-derive them with a redraw.
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        pixmap.fill(BACKGROUND);
        Ok(Self { pixmap })
    }

    /// Replaces the backing pixmap with a blank one of the new size. Existing
    /// content is not preserved.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        pixmap.fill(BACKGROUND);
        self.pixmap = pixmap;
        Ok(())
    }

    /// Fills the whole surface with the background color.
    pub fn clear(&mut self) {
        self.pixmap.fill(BACKGROUND);
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Raw premultiplied RGBA8 pixel data.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }
}
