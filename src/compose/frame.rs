use std::sync::Arc;

use vello_cpu::kurbo::{Affine, Join, Rect, Stroke};

use crate::assets::store::PreparedImage;
use crate::compose::caption::{CaptionStyle, layout_caption};
use crate::compose::fit::contain_fit;
use crate::compose::text::CaptionFont;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{StoryreelError, StoryreelResult};

/// One composed output frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// `true` when color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

/// Placeholder card drawn for call-to-action segments that have no image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CtaCardStyle {
    /// Card fill.
    pub background: Rgba8,
    /// Title text.
    pub title: String,
    /// Title size in pixels.
    pub title_size: f32,
    /// Title color.
    pub title_color: Rgba8,
    /// Vertical offset of the title's center from the canvas middle.
    pub title_offset: f64,
    /// Subtitle text.
    pub subtitle: String,
    /// Subtitle size in pixels.
    pub subtitle_size: f32,
    /// Subtitle color.
    pub subtitle_color: Rgba8,
    /// Vertical offset of the subtitle's center from the canvas middle.
    pub subtitle_offset: f64,
}

impl Default for CtaCardStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::opaque(0x0f, 0x17, 0x2a),
            title: "LAYAR AJAKAN".to_string(),
            title_size: 60.0,
            title_color: Rgba8::WHITE,
            title_offset: -40.0,
            subtitle: "(Like & Subscribe)".to_string(),
            subtitle_size: 30.0,
            subtitle_color: Rgba8::opaque(0x94, 0xa3, 0xb8),
            subtitle_offset: 40.0,
        }
    }
}

/// Everything the compositor draws besides the segment itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorStyle {
    /// Fill behind contain-fitted images.
    pub background: Rgba8,
    /// Caption placement and paint.
    pub caption: CaptionStyle,
    /// Placeholder card for image-less CTA segments.
    pub cta: CtaCardStyle,
}

impl Default for CompositorStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::BLACK,
            caption: CaptionStyle::default(),
            cta: CtaCardStyle::default(),
        }
    }
}

#[derive(Clone, Copy)]
enum VAnchor {
    Bottom,
    Middle,
}

struct TextPaint {
    size: f32,
    bold: bool,
    fill: Rgba8,
    outline: Option<(Rgba8, f32)>,
}

/// CPU compositor for storyboard frames.
///
/// Draw order is fixed: background, then the contain-fitted image (or the CTA card), then the
/// caption. Without a font, text is skipped and a single warning is logged.
pub struct FrameCompositor {
    canvas: Canvas,
    width: u16,
    height: u16,
    style: CompositorStyle,
    font: Option<CaptionFont>,
    pixmap: vello_cpu::Pixmap,
    image_paint: Option<(Arc<Vec<u8>>, vello_cpu::Image)>,
    warned_no_font: bool,
}

impl FrameCompositor {
    /// Compositor for `canvas`; fails when the canvas cannot be rasterized.
    pub fn new(
        canvas: Canvas,
        style: CompositorStyle,
        font: Option<CaptionFont>,
    ) -> StoryreelResult<Self> {
        canvas.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| StoryreelError::validation("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| StoryreelError::validation("canvas height exceeds u16"))?;
        Ok(Self {
            canvas,
            width,
            height,
            style,
            font,
            pixmap: vello_cpu::Pixmap::new(width, height),
            image_paint: None,
            warned_no_font: false,
        })
    }

    /// Output surface size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Current style.
    pub fn style(&self) -> &CompositorStyle {
        &self.style
    }

    /// Draw one segment and read the frame back.
    pub fn compose(
        &mut self,
        image: Option<&PreparedImage>,
        caption: &str,
        is_cta: bool,
    ) -> StoryreelResult<FrameRGBA> {
        let cw = self.canvas.width_f64();
        let ch = self.canvas.height_f64();
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);

        ctx.set_transform(Affine::IDENTITY);
        ctx.set_paint(self.style.background.to_paint());
        ctx.fill_rect(&Rect::new(0.0, 0.0, cw, ch));

        match image {
            Some(img) => self.draw_image(&mut ctx, img)?,
            None if is_cta => self.draw_cta_card(&mut ctx)?,
            None => {}
        }

        if !is_cta && !caption.trim().is_empty() {
            self.draw_caption(&mut ctx, caption)?;
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        img: &PreparedImage,
    ) -> StoryreelResult<()> {
        let fitted = contain_fit(
            self.canvas.width_f64(),
            self.canvas.height_f64(),
            f64::from(img.width),
            f64::from(img.height),
        );
        if fitted.area() <= 0.0 {
            return Ok(());
        }
        let paint = self.image_paint_for(img)?;
        let (iw, ih) = (f64::from(img.width), f64::from(img.height));

        ctx.set_transform(
            Affine::translate((fitted.x0, fitted.y0))
                * Affine::scale_non_uniform(fitted.width() / iw, fitted.height() / ih),
        );
        ctx.set_paint(paint);
        ctx.fill_rect(&Rect::new(0.0, 0.0, iw, ih));
        Ok(())
    }

    fn image_paint_for(&mut self, img: &PreparedImage) -> StoryreelResult<vello_cpu::Image> {
        if let Some((bytes, paint)) = &self.image_paint
            && Arc::ptr_eq(bytes, &img.rgba8_premul)
        {
            return Ok(paint.clone());
        }

        let pixmap = premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_paint = Some((img.rgba8_premul.clone(), paint.clone()));
        Ok(paint)
    }

    fn draw_cta_card(&mut self, ctx: &mut vello_cpu::RenderContext) -> StoryreelResult<()> {
        let cw = self.canvas.width_f64();
        let ch = self.canvas.height_f64();
        let cta = self.style.cta.clone();

        ctx.set_transform(Affine::IDENTITY);
        ctx.set_paint(cta.background.to_paint());
        ctx.fill_rect(&Rect::new(0.0, 0.0, cw, ch));

        let Some(font) = self.font_or_warn() else {
            return Ok(());
        };
        let lines = [
            (
                &cta.title,
                ch / 2.0 + cta.title_offset,
                TextPaint {
                    size: cta.title_size,
                    bold: true,
                    fill: cta.title_color,
                    outline: None,
                },
            ),
            (
                &cta.subtitle,
                ch / 2.0 + cta.subtitle_offset,
                TextPaint {
                    size: cta.subtitle_size,
                    bold: false,
                    fill: cta.subtitle_color,
                    outline: None,
                },
            ),
        ];
        for (text, y, paint) in lines {
            if text.trim().is_empty() {
                continue;
            }
            draw_text_line(ctx, font, text, cw / 2.0, y, VAnchor::Middle, &paint)?;
        }
        Ok(())
    }

    fn draw_caption(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        caption: &str,
    ) -> StoryreelResult<()> {
        let canvas = self.canvas;
        let style = self.style.caption.clone();
        let Some(font) = self.font_or_warn() else {
            return Ok(());
        };

        let layout = {
            let mut measure = font.measure(style.font_size, style.bold);
            layout_caption(caption, false, canvas, &style, &mut measure)?
        };
        let Some(layout) = layout else {
            return Ok(());
        };

        let paint = TextPaint {
            size: layout.font_size,
            bold: style.bold,
            fill: style.fill,
            outline: (style.stroke_width > 0.0).then_some((style.stroke, style.stroke_width)),
        };
        for line in &layout.lines {
            draw_text_line(
                ctx,
                font,
                &line.text,
                line.center_x,
                line.bottom_y,
                VAnchor::Bottom,
                &paint,
            )?;
        }
        Ok(())
    }

    fn font_or_warn(&mut self) -> Option<&mut CaptionFont> {
        if self.font.is_none() && !self.warned_no_font {
            tracing::warn!("no caption font configured; text will not be drawn");
            self.warned_no_font = true;
        }
        self.font.as_mut()
    }
}

/// Shape `text` on one line and draw it centered on `center_x`, outline first.
///
/// With [`VAnchor::Bottom`] the line's descent rests on `y`; with [`VAnchor::Middle`] the
/// ascent/descent box is centered on `y`.
fn draw_text_line(
    ctx: &mut vello_cpu::RenderContext,
    font: &mut CaptionFont,
    text: &str,
    center_x: f64,
    y: f64,
    anchor: VAnchor,
    paint: &TextPaint,
) -> StoryreelResult<()> {
    let layout = font.layout_line(text, paint.size, paint.bold, paint.fill)?;
    let left = center_x - f64::from(layout.width()) / 2.0;
    let font_data = font.font_data().clone();

    for line in layout.lines() {
        let m = line.metrics();
        let (ascent, descent) = (f64::from(m.ascent), f64::from(m.descent));
        let baseline = match anchor {
            VAnchor::Bottom => y - descent,
            VAnchor::Middle => y + (ascent - descent) / 2.0,
        };
        // Positioned glyphs carry the line's own baseline offset.
        ctx.set_transform(Affine::translate((left, baseline - f64::from(m.baseline))));

        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let size = run.run().font_size();
            let glyphs: Vec<vello_cpu::Glyph> = run
                .positioned_glyphs()
                .map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                })
                .collect();

            if let Some((color, width)) = paint.outline {
                ctx.set_stroke(Stroke::new(f64::from(width)).with_join(Join::Round));
                ctx.set_paint(color.to_paint());
                ctx.glyph_run(&font_data)
                    .font_size(size)
                    .stroke_glyphs(glyphs.iter().copied());
            }
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            ctx.glyph_run(&font_data)
                .font_size(size)
                .fill_glyphs(glyphs.into_iter());
        }
    }
    Ok(())
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StoryreelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryreelError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryreelError::validation("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StoryreelError::validation(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/frame.rs"]
mod tests;
