use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::StoryreelResult;

/// Sequencer words removed from the start of a caption before it is drawn.
///
/// The narration script opens many segments with ordinals ("Pertama, ...", "Next, ..."); they
/// read fine in the voice-over but waste caption space.
pub const LEAD_IN_WORDS: &[&str] = &[
    "pertama",
    "kedua",
    "ketiga",
    "keempat",
    "kelima",
    "keenam",
    "ketujuh",
    "selanjutnya",
    "terakhir",
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "next",
    "then",
    "finally",
    "lastly",
];

/// Width of a single line of text in pixels, for a fixed font and size.
pub trait TextMeasure {
    /// Advance width of `text` laid out on one line, trailing whitespace included.
    fn measure(&mut self, text: &str) -> StoryreelResult<f32>;
}

/// Monospace metrics: every character advances by the same amount.
///
/// Useful for headless layout checks where no font file is available.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvance(pub f32);

impl TextMeasure for FixedAdvance {
    fn measure(&mut self, text: &str) -> StoryreelResult<f32> {
        Ok(text.chars().count() as f32 * self.0)
    }
}

/// Caption appearance and placement, relative to the output canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Line advance as a multiple of the font size.
    pub line_height: f32,
    /// Maximum line width as a fraction of the canvas width.
    pub max_width_ratio: f32,
    /// Distance from the canvas bottom to the last line's bottom, as a fraction of its height.
    pub bottom_margin_ratio: f32,
    /// Lines kept after wrapping; the rest are dropped.
    pub max_lines: usize,
    /// Use the bold weight.
    pub bold: bool,
    /// Glyph fill color.
    pub fill: Rgba8,
    /// Outline color, drawn under the fill.
    pub stroke: Rgba8,
    /// Outline width in pixels.
    pub stroke_width: f32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 52.0,
            line_height: 1.2,
            max_width_ratio: 0.9,
            bottom_margin_ratio: 0.1,
            max_lines: 2,
            bold: true,
            fill: Rgba8::WHITE,
            stroke: Rgba8::BLACK,
            stroke_width: 8.0,
        }
    }
}

/// One positioned caption line.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLine {
    /// Line text, already stripped and wrapped.
    pub text: String,
    /// Horizontal center of the line.
    pub center_x: f64,
    /// Bottom edge of the line box; glyph descents rest on it.
    pub bottom_y: f64,
}

/// Caption lines ready to draw, top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLayout {
    /// Lines in reading order.
    pub lines: Vec<CaptionLine>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Distance between consecutive line bottoms, in pixels.
    pub line_height: f64,
}

/// Trim `text` and drop one leading sequencer word (case-insensitive) plus an optional
/// `.`, `,` or `:` and the whitespace after it.
///
/// The word must end at a boundary, so `"Nextday"` is left alone.
pub fn strip_lead_in(text: &str) -> &str {
    let text = text.trim();
    for word in LEAD_IN_WORDS {
        let Some(head) = text.get(..word.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(word) {
            continue;
        }
        let rest = &text[word.len()..];
        let mut chars = rest.chars();
        match chars.next() {
            None => return "",
            Some('.' | ',' | ':') => return chars.as_str().trim_start(),
            Some(c) if c.is_whitespace() => return rest.trim_start(),
            Some(_) => {}
        }
    }
    text
}

/// Greedy word wrap against `max_width`.
///
/// Each word is measured together with the line so far plus a trailing space; the line breaks
/// before the first word that would overflow. A single overlong word still gets its own line.
/// At most `max_lines` lines are returned; the rest are dropped. Measurement errors propagate.
pub fn wrap_caption(
    text: &str,
    max_width: f32,
    max_lines: usize,
    measure: &mut impl TextMeasure,
) -> StoryreelResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for (i, word) in text.split_whitespace().enumerate() {
        let test = format!("{current}{word} ");
        if i > 0 && measure.measure(&test)? > max_width {
            lines.push(current.trim_end().to_string());
            current = format!("{word} ");
        } else {
            current = test;
        }
    }
    let last = current.trim_end();
    if !last.is_empty() {
        lines.push(last.to_string());
    }

    lines.truncate(max_lines);
    Ok(lines)
}

/// Place a caption on `canvas`: strip, wrap, and anchor the lines bottom-up.
///
/// Returns `None` for call-to-action segments and for captions that are empty once stripped.
pub fn layout_caption(
    text: &str,
    is_cta: bool,
    canvas: Canvas,
    style: &CaptionStyle,
    measure: &mut impl TextMeasure,
) -> StoryreelResult<Option<CaptionLayout>> {
    if is_cta {
        return Ok(None);
    }
    let stripped = strip_lead_in(text);
    if stripped.is_empty() {
        return Ok(None);
    }

    let cw = canvas.width_f64();
    let ch = canvas.height_f64();
    let max_width = (cw * f64::from(style.max_width_ratio)) as f32;
    let wrapped = wrap_caption(stripped, max_width, style.max_lines, measure)?;
    if wrapped.is_empty() {
        return Ok(None);
    }

    let line_height = f64::from(style.font_size) * f64::from(style.line_height);
    let anchor = ch - ch * f64::from(style.bottom_margin_ratio);
    let n = wrapped.len();
    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(j, text)| CaptionLine {
            text,
            center_x: cw / 2.0,
            bottom_y: anchor - (n - 1 - j) as f64 * line_height,
        })
        .collect();

    Ok(Some(CaptionLayout {
        lines,
        font_size: style.font_size,
        line_height,
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/caption.rs"]
mod tests;
