use std::path::PathBuf;

use super::*;
use crate::encode::sink::AudioInputConfig;
use crate::foundation::core::Fps;

fn cfg(audio: Option<&str>) -> SinkConfig {
    SinkConfig {
        width: 1080,
        height: 1920,
        fps: Fps::default(),
        audio: audio.map(|p| AudioInputConfig {
            path: PathBuf::from(p),
        }),
    }
}

fn strings(args: Vec<OsString>) -> Vec<String> {
    args.into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn flatten_premul_over_black_keeps_rgb() {
    let src = vec![128u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_straight_over_black_scales_rgb() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_transparent_returns_background() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0; 4], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn webm_with_narration_maps_both_inputs_to_stdout() {
    let args = strings(ffmpeg_args(&cfg(Some("voice.mp3")), Container::Webm));
    let joined = args.join(" ");
    assert!(joined.contains("-f rawvideo -pix_fmt rgba -s 1080x1920 -r 30/1 -i pipe:0"));
    assert!(joined.contains("-i voice.mp3 -map 0:v:0 -map 1:a:0"));
    assert!(joined.contains("-c:v libvpx"));
    assert!(joined.contains("-c:a libopus"));
    assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
}

#[test]
fn silent_mp4_disables_audio_and_fragments() {
    let args = strings(ffmpeg_args(&cfg(None), Container::Mp4));
    assert!(args.iter().any(|a| a == "-an"));
    assert!(args.iter().any(|a| a == "frag_keyframe+empty_moov"));
    assert!(!args.iter().any(|a| a == "-map"));
}

#[test]
fn container_mime_types() {
    assert_eq!(Container::default(), Container::Webm);
    assert!(Container::Webm.mime_type().starts_with("video/webm"));
    assert!(Container::Mp4.mime_type().starts_with("video/mp4"));
    assert_eq!(Container::Mp4.extension(), "mp4");
}

#[test]
fn unstarted_encoder_has_no_chunks_and_ends_cleanly() {
    let mut enc = FfmpegEncoder::new(FfmpegEncoderOpts::default());
    assert_eq!(enc.state(), RecorderState::Inactive);
    assert!(enc.take_chunks().unwrap().is_empty());
    enc.end().unwrap();
    enc.release();
    assert_eq!(enc.state(), RecorderState::Inactive);
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let mut enc = FfmpegEncoder::new(FfmpegEncoderOpts::default());
    let mut c = cfg(None);
    c.width = 1081;
    assert!(matches!(enc.begin(c), Err(StoryreelError::Validation(_))));
}
