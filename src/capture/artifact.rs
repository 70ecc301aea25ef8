use std::path::Path;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::StoryreelResult;

/// Transient identifier of an in-memory artifact: `blob:<xxh3-64 hex>` of its bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(String);

impl ArtifactHandle {
    /// Handle derived from the artifact bytes.
    pub fn for_bytes(bytes: &[u8]) -> Self {
        Self(format!("blob:{:016x}", xxhash_rust::xxh3::xxh3_64(bytes)))
    }

    /// The handle as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The finished recording.
#[derive(Clone, Debug)]
pub struct EncodedArtifact {
    /// Transient identifier of this recording.
    pub handle: ArtifactHandle,
    /// MIME type reported by the encoder.
    pub mime_type: String,
    /// Concatenated encoder output.
    pub bytes: Vec<u8>,
    /// Video length in seconds.
    pub duration_secs: f64,
    /// Frames pushed to the encoder.
    pub frames: u64,
}

impl EncodedArtifact {
    /// Concatenate encoder chunks, in order, into one artifact.
    pub fn from_chunks(
        chunks: Vec<Vec<u8>>,
        mime_type: impl Into<String>,
        duration_secs: f64,
        frames: u64,
    ) -> Self {
        let bytes = chunks.concat();
        Self {
            handle: ArtifactHandle::for_bytes(&bytes),
            mime_type: mime_type.into(),
            bytes,
            duration_secs,
            frames,
        }
    }

    /// Byte length of the encoded output.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when the encoder produced no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Persist the bytes to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> StoryreelResult<()> {
        use anyhow::Context as _;
        ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write artifact '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "artifact written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/artifact.rs"]
mod tests;
