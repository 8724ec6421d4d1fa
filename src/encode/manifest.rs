use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use crate::foundation::error::RenderherdResult;

/// File extension (lowercase, no dot) treated as mixed-down audio input.
pub const AUDIO_EXTENSION: &str = "wav";

/// How a generated manifest feeds into the encoder command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Frame-sequence input; formatted through the video input template.
    Video,
    /// Audio input; formatted through the audio input template and never
    /// annotated with per-frame durations.
    Audio,
}

/// Classify an extension bucket for downstream templating.
pub fn classify_extension(extension: &str) -> InputKind {
    if extension.eq_ignore_ascii_case(AUDIO_EXTENSION) {
        InputKind::Audio
    } else {
        InputKind::Video
    }
}

/// A concat-demuxer input list persisted to disk.
#[derive(Clone, Debug)]
pub struct InputManifest {
    /// Where the manifest was written.
    pub path: PathBuf,
    /// Video or audio, by source extension bucket.
    pub kind: InputKind,
}

/// Render the manifest body: one `file '<path>'` line per input, each
/// followed by a `duration <seconds>` line when `frame_duration_secs` is
/// set. Duration annotation is how single-image inputs get their display
/// time under the concat demuxer.
pub fn render_manifest_body(files: &[PathBuf], frame_duration_secs: Option<f64>) -> String {
    let mut body = String::new();
    for file in files {
        // writeln! to a String cannot fail.
        let _ = writeln!(body, "file '{}'", file.display());
        if let Some(duration) = frame_duration_secs {
            let _ = writeln!(body, "duration {:.6}", duration);
        }
    }
    body
}

/// Write the input manifest for one extension bucket of an encode job.
///
/// The file name embeds a fresh UUID so several encode jobs can generate
/// manifests into the same output directory concurrently. Audio buckets
/// never carry duration lines; video buckets carry them only when
/// `write_frame_durations` is on, using `1 / frame_rate` seconds per frame.
pub fn write_input_manifest(
    dir: &Path,
    extension: &str,
    files: &[PathBuf],
    frame_rate: f64,
    write_frame_durations: bool,
) -> RenderherdResult<InputManifest> {
    let kind = classify_extension(extension);
    let frame_duration = match kind {
        InputKind::Video if write_frame_durations && frame_rate > 0.0 => Some(1.0 / frame_rate),
        _ => None,
    };

    let path = dir.join(format!("{}_input.txt", Uuid::new_v4()));
    let body = render_manifest_body(files, frame_duration);
    std::fs::write(&path, body)
        .with_context(|| format!("write encoder input manifest '{}'", path.display()))?;

    tracing::debug!(path = %path.display(), inputs = files.len(), "wrote encoder input manifest");
    Ok(InputManifest { path, kind })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/manifest.rs"]
mod tests;
