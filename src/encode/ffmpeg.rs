use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;

use crate::compose::frame::FrameRGBA;
use crate::encode::sink::{Encoder, FrameSink, RecorderState, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StoryreelError, StoryreelResult};

/// Output container produced by [`FfmpegEncoder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// VP8 video and Opus audio in WebM.
    #[default]
    Webm,
    /// H.264 video and AAC audio in fragmented MP4.
    Mp4,
}

impl Container {
    /// MIME type of the produced stream.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Webm => "video/webm;codecs=vp8,opus",
            Self::Mp4 => "video/mp4;codecs=avc1,mp4a",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }

    fn codec_args(self, with_audio: bool) -> &'static [&'static str] {
        match (self, with_audio) {
            (Self::Webm, true) => &[
                "-c:v", "libvpx", "-b:v", "4M", "-deadline", "realtime", "-cpu-used", "8",
                "-pix_fmt", "yuv420p", "-c:a", "libopus", "-f", "webm",
            ],
            (Self::Webm, false) => &[
                "-an", "-c:v", "libvpx", "-b:v", "4M", "-deadline", "realtime", "-cpu-used", "8",
                "-pix_fmt", "yuv420p", "-f", "webm",
            ],
            (Self::Mp4, true) => &[
                "-c:v", "libx264", "-preset", "veryfast", "-pix_fmt", "yuv420p", "-c:a", "aac",
                "-movflags", "frag_keyframe+empty_moov", "-f", "mp4",
            ],
            (Self::Mp4, false) => &[
                "-an", "-c:v", "libx264", "-preset", "veryfast", "-pix_fmt", "yuv420p",
                "-movflags", "frag_keyframe+empty_moov", "-f", "mp4",
            ],
        }
    }
}

/// Options for [`FfmpegEncoder`].
#[derive(Clone, Debug)]
pub struct FfmpegEncoderOpts {
    /// Output container.
    pub container: Container,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Read size for the encoded stdout stream; one chunk per read.
    pub chunk_size: usize,
}

impl Default for FfmpegEncoderOpts {
    fn default() -> Self {
        Self {
            container: Container::default(),
            bg_rgba: [0, 0, 0, 255],
            chunk_size: 64 * 1024,
        }
    }
}

type Drain<T> = std::thread::JoinHandle<std::io::Result<T>>;

/// Recorder backed by the system `ffmpeg`.
///
/// Raw RGBA frames go to stdin, the narration file is a second input, and the encoded container
/// streams back on stdout as chunks.
pub struct FfmpegEncoder {
    opts: FfmpegEncoderOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    chunks: Option<mpsc::Receiver<std::io::Result<Vec<u8>>>>,
    stdout_drain: Option<Drain<()>>,
    stderr_drain: Option<Drain<Vec<u8>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    state: RecorderState,
}

impl FfmpegEncoder {
    /// Encoder with the given options; ffmpeg starts on `begin`.
    pub fn new(opts: FfmpegEncoderOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            chunks: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            state: RecorderState::Inactive,
        }
    }

    /// Configured output container.
    pub fn container(&self) -> Container {
        self.opts.container
    }
}

/// Full `ffmpeg` argument list for one recording, output on stdout.
pub(crate) fn ffmpeg_args(cfg: &SinkConfig, container: Container) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(OsString::from(s));

    // Raw premultiplied RGBA8 is flattened before it reaches stdin.
    for a in [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{}x{}", cfg.width, cfg.height),
        "-r",
        &format!("{}/{}", cfg.fps.num, cfg.fps.den),
        "-i",
        "pipe:0",
    ] {
        push(a);
    }

    if let Some(audio) = cfg.audio.as_ref() {
        args.push(OsString::from("-i"));
        args.push(audio.path.clone().into_os_string());
        args.extend(
            ["-map", "0:v:0", "-map", "1:a:0"]
                .into_iter()
                .map(OsString::from),
        );
    }
    args.extend(
        container
            .codec_args(cfg.audio.is_some())
            .iter()
            .map(OsString::from),
    );
    args.push(OsString::from("pipe:1"));
    args
}

impl FrameSink for FfmpegEncoder {
    fn begin(&mut self, cfg: SinkConfig) -> StoryreelResult<()> {
        if self.state == RecorderState::Recording {
            return Err(StoryreelError::encoder("ffmpeg encoder is already recording"));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(StoryreelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(StoryreelError::validation(
                "ffmpeg encoder width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(StoryreelError::validation(
                "ffmpeg encoder width/height must be even (required for yuv420p output)",
            ));
        }
        self.ensure_available()?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args(ffmpeg_args(&cfg, self.opts.container));
        tracing::debug!(container = ?self.opts.container, audio = cfg.audio.is_some(), "spawning ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            StoryreelError::encoder_unavailable(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StoryreelError::encoder("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| StoryreelError::encoder("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| StoryreelError::encoder("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, rx) = mpsc::channel();
        let chunk_size = self.opts.chunk_size.max(4096);
        let stdout_drain = std::thread::spawn(move || {
            let mut buf = vec![0u8; chunk_size];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => return Ok(()),
                    Ok(n) => {
                        if tx.send(Ok(buf[..n].to_vec())).is_err() {
                            return Ok(());
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        let kind = e.kind();
                        let _ = tx.send(Err(e));
                        return Err(std::io::Error::from(kind));
                    }
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width * cfg.height * 4) as usize];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.chunks = Some(rx);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.state = RecorderState::Recording;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StoryreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StoryreelError::encoder("ffmpeg encoder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(StoryreelError::encoder(
                "ffmpeg encoder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(StoryreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(StoryreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StoryreelError::encoder("ffmpeg encoder is already stopped"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            StoryreelError::encoder(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> StoryreelResult<()> {
        if self.state != RecorderState::Recording {
            return Ok(());
        }
        self.state = RecorderState::Stopped;
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| StoryreelError::encoder("ffmpeg encoder not started"))?;

        let status = child.wait().map_err(|e| {
            StoryreelError::encoder(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if let Some(handle) = self.stdout_drain.take() {
            handle
                .join()
                .map_err(|_| StoryreelError::encoder("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| StoryreelError::encoder(format!("ffmpeg stdout read failed: {e}")))?;
        }
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StoryreelError::encoder("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| StoryreelError::encoder(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(StoryreelError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Encoder for FfmpegEncoder {
    fn mime_type(&self) -> &str {
        self.opts.container.mime_type()
    }

    fn ensure_available(&self) -> StoryreelResult<()> {
        if !is_ffmpeg_on_path() {
            return Err(StoryreelError::encoder_unavailable(
                "ffmpeg is required for recording, but was not found on PATH",
            ));
        }
        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn take_chunks(&mut self) -> StoryreelResult<Vec<Vec<u8>>> {
        let Some(rx) = self.chunks.as_ref() else {
            return Ok(Vec::new());
        };
        rx.try_iter()
            .map(|chunk| {
                chunk.map_err(|e| StoryreelError::encoder(format!("ffmpeg output read failed: {e}")))
            })
            .collect()
    }

    fn release(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("ffmpeg process killed on release");
        }
        if let Some(handle) = self.stdout_drain.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        self.chunks = None;
        self.cfg = None;
        if self.state == RecorderState::Recording {
            self.state = RecorderState::Stopped;
        }
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        self.release();
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> StoryreelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StoryreelError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (s[0] as u16, s[1] as u16, s[2] as u16)
        } else {
            (
                mul_div255(s[0] as u16, a),
                mul_div255(s[1] as u16, a),
                mul_div255(s[2] as u16, a),
            )
        };

        d[0] = (r + mul_div255(bg_r, inv)).min(255) as u8;
        d[1] = (g + mul_div255(bg_g, inv)).min(255) as u8;
        d[2] = (b + mul_div255(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StoryreelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
