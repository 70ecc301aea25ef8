use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{StoryreelError, StoryreelResult};

/// One storyboard entry as produced by the storyboard generator.
///
/// Field names follow the generator's JSON (`scriptSegment`, `imageUrl`, `is_cta`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptVisual {
    /// Stable id assigned by the generator.
    pub id: u64,
    /// Caption text; may be empty.
    #[serde(default)]
    pub script_segment: String,
    /// Resolved image reference (file path or `data:` URL), `None` while pending or failed.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Marks the trailing call-to-action frame.
    #[serde(default, rename = "is_cta", alias = "isCta")]
    pub is_cta: bool,
    /// Descriptive scene tag (`character_shot`, `cta_like_subscribe`, ...).
    #[serde(default, alias = "scene_type")]
    pub scene_type: Option<String>,
    /// Image prompt the visual was generated from.
    #[serde(default, rename = "text")]
    pub visual_description: Option<String>,
    /// Last generation failure for this visual.
    #[serde(default)]
    pub error: Option<String>,
}

/// Where a segment's still image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Image file on disk.
    File(PathBuf),
    /// Inline `data:` URL payload (already base64-decoded).
    Inline(std::sync::Arc<Vec<u8>>),
}

impl ImageSource {
    /// Parse an image reference relative to `root`.
    ///
    /// `data:<mime>;base64,<payload>` URLs are decoded inline. Remote `http(s)` URLs are rejected:
    /// fetching belongs to the caller.
    pub fn parse(reference: &str, root: &Path) -> StoryreelResult<Self> {
        let reference = reference.trim();
        if let Some(rest) = reference.strip_prefix("data:") {
            let (meta, payload) = rest.split_once(',').ok_or_else(|| {
                StoryreelError::image_resolution("malformed data URL (missing ',')")
            })?;
            if !meta.ends_with(";base64") {
                return Err(StoryreelError::image_resolution(
                    "data URL images must be base64 encoded",
                ));
            }
            use base64::Engine as _;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| {
                    StoryreelError::image_resolution(format!("invalid base64 data URL: {e}"))
                })?;
            return Ok(Self::Inline(std::sync::Arc::new(bytes)));
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Err(StoryreelError::image_resolution(format!(
                "remote image '{reference}' must be downloaded before capture"
            )));
        }

        let path = Path::new(reference);
        if path.is_absolute() {
            return Ok(Self::File(path.to_path_buf()));
        }
        let norm = crate::assets::store::normalize_rel_path(reference)?;
        Ok(Self::File(root.join(norm)))
    }

    /// Short human-readable label for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::File(p) => p.display().to_string(),
            Self::Inline(bytes) => format!("<inline image, {} bytes>", bytes.len()),
        }
    }
}

/// Immutable per-invocation snapshot of one storyboard segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneSegment {
    /// Caption text (may be empty).
    pub caption: String,
    /// Image to show, if any.
    pub image: Option<ImageSource>,
    /// Trailing call-to-action frame: no caption is drawn for it.
    pub is_cta: bool,
}

impl SceneSegment {
    /// Regular segment.
    pub fn new(caption: impl Into<String>, image: Option<ImageSource>) -> Self {
        Self {
            caption: caption.into(),
            image,
            is_cta: false,
        }
    }

    /// Call-to-action segment.
    pub fn cta(caption: impl Into<String>, image: Option<ImageSource>) -> Self {
        Self {
            caption: caption.into(),
            image,
            is_cta: true,
        }
    }
}

impl AsRef<str> for SceneSegment {
    fn as_ref(&self) -> &str {
        &self.caption
    }
}

/// Storyboard document: the visuals list plus an optional narration reference.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardDoc {
    /// Visuals in playback order.
    #[serde(alias = "scriptVisuals")]
    pub visuals: Vec<ScriptVisual>,
    /// Narration audio file, relative to the document.
    #[serde(default, alias = "audioUrl")]
    pub audio: Option<String>,
}

/// A loaded storyboard together with the directory its relative references resolve against.
#[derive(Clone, Debug)]
pub struct Storyboard {
    /// Parsed document.
    pub doc: StoryboardDoc,
    /// Directory relative image paths resolve against.
    pub root: PathBuf,
}

impl Storyboard {
    /// Load a storyboard JSON document; relative paths resolve against its parent directory.
    pub fn from_json_file(path: &Path) -> StoryreelResult<Self> {
        use anyhow::Context as _;
        let f = std::fs::File::open(path)
            .with_context(|| format!("open storyboard '{}'", path.display()))?;
        let doc: StoryboardDoc = serde_json::from_reader(std::io::BufReader::new(f))
            .with_context(|| format!("parse storyboard JSON '{}'", path.display()))?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self { doc, root })
    }

    /// Storyboard rooted at `root`.
    pub fn new(doc: StoryboardDoc, root: impl Into<PathBuf>) -> Self {
        Self {
            doc,
            root: root.into(),
        }
    }

    /// Take the immutable segment snapshot the capture core consumes.
    ///
    /// Visuals whose image reference cannot be parsed fail here with `ImageResolution`;
    /// visuals without an image become image-less segments.
    pub fn snapshot(&self) -> StoryreelResult<Vec<SceneSegment>> {
        self.doc
            .visuals
            .iter()
            .map(|v| {
                let image = match v.image_url.as_deref() {
                    Some(r) if !r.trim().is_empty() => Some(
                        ImageSource::parse(r, &self.root).map_err(|e| {
                            StoryreelError::image_resolution(format!("visual {}: {e}", v.id))
                        })?,
                    ),
                    _ => None,
                };
                Ok(SceneSegment {
                    caption: v.script_segment.clone(),
                    image,
                    is_cta: v.is_cta,
                })
            })
            .collect()
    }

    /// Resolved narration path, when the document names one.
    pub fn audio_path(&self) -> StoryreelResult<Option<PathBuf>> {
        let Some(audio) = self.doc.audio.as_deref() else {
            return Ok(None);
        };
        let p = Path::new(audio);
        if p.is_absolute() {
            return Ok(Some(p.to_path_buf()));
        }
        let norm = crate::assets::store::normalize_rel_path(audio)?;
        Ok(Some(self.root.join(norm)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storyboard/model.rs"]
mod tests;
