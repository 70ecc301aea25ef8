use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::decode_image;
use crate::foundation::error::{StoryreelError, StoryreelResult};
use crate::storyboard::model::{ImageSource, SceneSegment};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    /// Red channel.
    pub(crate) r: u8,
    /// Green channel.
    pub(crate) g: u8,
    /// Blue channel.
    pub(crate) b: u8,
    /// Alpha channel.
    pub(crate) a: u8,
}

/// Normalize and validate storyboard-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> StoryreelResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StoryreelError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(StoryreelError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StoryreelError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StoryreelError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Load and decode one image source.
pub fn load_image(source: &ImageSource) -> StoryreelResult<PreparedImage> {
    let decoded = match source {
        ImageSource::File(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                StoryreelError::image_resolution(format!(
                    "failed to read image '{}': {e}",
                    path.display()
                ))
            })?;
            decode_image(&bytes)
        }
        ImageSource::Inline(bytes) => decode_image(bytes),
    };
    let img = decoded.map_err(|e| {
        StoryreelError::image_resolution(format!(
            "failed to decode image {}: {e}",
            source.describe()
        ))
    })?;
    if img.width == 0 || img.height == 0 {
        return Err(StoryreelError::image_resolution(format!(
            "image {} has zero size",
            source.describe()
        )));
    }
    // The rasterizer addresses image pixels with u16 coordinates.
    if img.width > u32::from(u16::MAX) || img.height > u32::from(u16::MAX) {
        return Err(StoryreelError::image_resolution(format!(
            "image {} is {}x{}; each side must be at most {}",
            source.describe(),
            img.width,
            img.height,
            u16::MAX
        )));
    }
    Ok(img)
}

/// Decode every referenced segment image concurrently.
///
/// The result is index-aligned with `segments`; image-less segments map to `None`. The first
/// failure (in segment order) aborts the whole batch.
#[tracing::instrument(skip(segments), fields(segments = segments.len()))]
pub fn resolve_images(
    segments: &[SceneSegment],
) -> StoryreelResult<Vec<Option<Arc<PreparedImage>>>> {
    let results: Vec<StoryreelResult<Option<Arc<PreparedImage>>>> = segments
        .par_iter()
        .enumerate()
        .map(|(i, seg)| match &seg.image {
            None => Ok(None),
            Some(source) => load_image(source).map(|img| Some(Arc::new(img))).map_err(|e| {
                StoryreelError::image_resolution(format!("segment {i}: {}", strip_prefix(&e)))
            }),
        })
        .collect();

    let images = results.into_iter().collect::<StoryreelResult<Vec<_>>>()?;
    tracing::debug!(
        decoded = images.iter().filter(|i| i.is_some()).count(),
        "segment images resolved"
    );
    Ok(images)
}

fn strip_prefix(e: &StoryreelError) -> String {
    match e {
        StoryreelError::ImageResolution(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family_name: None,
        }
    }

    /// Register font bytes and remember the resulting family for later layouts.
    pub(crate) fn register_font(&mut self, font_bytes: &[u8]) -> StoryreelResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryreelError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryreelError::validation("registered font family has no name"))?
            .to_string();
        self.family_name = Some(family_name.clone());
        Ok(family_name)
    }

    /// Shape and lay out a single unwrapped line using the registered font.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        bold: bool,
        brush: TextBrushRgba8,
    ) -> StoryreelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StoryreelError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self
            .family_name
            .clone()
            .ok_or_else(|| StoryreelError::validation("no font registered for text layout"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
