use std::path::Path;

use crate::assets::store::{TextBrushRgba8, TextLayoutEngine};
use crate::compose::caption::TextMeasure;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{StoryreelError, StoryreelResult};

/// A font registered for both layout (Parley) and glyph rasterization (vello_cpu).
pub struct CaptionFont {
    engine: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
    family: String,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl CaptionFont {
    /// Register a TrueType/OpenType font from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> StoryreelResult<Self> {
        let mut engine = TextLayoutEngine::new();
        let family = engine.register_font(&bytes)?;
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        tracing::debug!(%family, "caption font registered");
        Ok(Self {
            engine,
            font,
            family,
        })
    }

    /// Read and register a font file.
    pub fn from_file(path: &Path) -> StoryreelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StoryreelError::validation(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    /// Family name reported by the font.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub(crate) fn font_data(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Lay out one unwrapped line, filled with `color`.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        bold: bool,
        color: Rgba8,
    ) -> StoryreelResult<parley::Layout<TextBrushRgba8>> {
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        self.engine.layout_line(text, size_px, bold, brush)
    }

    /// Width measurer bound to one size and weight.
    pub fn measure(&mut self, size_px: f32, bold: bool) -> FontMeasure<'_> {
        FontMeasure {
            font: self,
            size_px,
            bold,
        }
    }
}

/// [`TextMeasure`] backed by a real font.
pub struct FontMeasure<'a> {
    font: &'a mut CaptionFont,
    size_px: f32,
    bold: bool,
}

impl TextMeasure for FontMeasure<'_> {
    fn measure(&mut self, text: &str) -> StoryreelResult<f32> {
        let layout = self
            .font
            .layout_line(text, self.size_px, self.bold, Rgba8::WHITE)?;
        Ok(layout.full_width())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/text.rs"]
mod tests;
