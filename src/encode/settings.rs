use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::RenderherdResult;

/// Encode quality tier, selecting one of the four argument presets below.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeQuality {
    /// Fast, large quantizer.
    Low,
    /// Balanced.
    Medium,
    /// Slow preset, low quantizer.
    High,
    /// Near-lossless.
    #[default]
    Epic,
}

/// Static configuration of the external command-line encoder.
///
/// The command line is assembled from `command_line_format` by substituting
/// the named tokens `{Executable}`, `{AudioCodec}`, `{VideoCodec}`,
/// `{FrameRate}`, `{Quality}`, `{AdditionalLocalArgs}`, `{VideoInputs}`,
/// `{AudioInputs}` and `{OutputPath}`. Each entry of `{VideoInputs}` /
/// `{AudioInputs}` is itself formatted through the per-kind input templates
/// with `{InputFile}` (and `{FrameRate}` for video) available.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Path to the encoder executable.
    pub executable_path: String,
    /// Video codec name passed through `{VideoCodec}`.
    pub video_codec: String,
    /// Audio codec name passed through `{AudioCodec}`.
    pub audio_codec: String,
    /// Extension of the final movie file (no dot).
    pub output_file_extension: String,
    /// Master command-line template.
    pub command_line_format: String,
    /// Template applied per video input manifest.
    pub video_input_format: String,
    /// Template applied per audio input manifest.
    pub audio_input_format: String,
    /// Arguments for [`EncodeQuality::Low`].
    pub encode_settings_low: String,
    /// Arguments for [`EncodeQuality::Medium`].
    pub encode_settings_med: String,
    /// Arguments for [`EncodeQuality::High`].
    pub encode_settings_high: String,
    /// Arguments for [`EncodeQuality::Epic`].
    pub encode_settings_epic: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            executable_path: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            output_file_extension: "mp4".to_string(),
            command_line_format: "-hide_banner -y -loglevel error -stats {AdditionalLocalArgs} \
                                  {VideoInputs} {AudioInputs} -acodec {AudioCodec} \
                                  -vcodec {VideoCodec} {Quality} \"{OutputPath}\""
                .to_string(),
            video_input_format: "-f concat -safe 0 -i \"{InputFile}\"".to_string(),
            audio_input_format: "-f concat -safe 0 -i \"{InputFile}\"".to_string(),
            encode_settings_low: "-crf 28".to_string(),
            encode_settings_med: "-crf 23".to_string(),
            encode_settings_high: "-crf 20".to_string(),
            encode_settings_epic: "-crf 16".to_string(),
        }
    }
}

impl EncoderSettings {
    /// Load settings from a JSON file. Missing fields fall back to the
    /// defaults, so partial files only overriding the executable work.
    pub fn from_path(path: &Path) -> RenderherdResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read encoder settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse encoder settings '{}'", path.display()))?;
        Ok(settings)
    }

    /// Quality-tier argument string for `{Quality}`.
    pub fn quality_args(&self, quality: EncodeQuality) -> &str {
        match quality {
            EncodeQuality::Low => &self.encode_settings_low,
            EncodeQuality::Medium => &self.encode_settings_med,
            EncodeQuality::High => &self.encode_settings_high,
            EncodeQuality::Epic => &self.encode_settings_epic,
        }
    }

    /// User-facing configuration problems that must be fixed before any
    /// encode can start. Empty when the settings are usable.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.executable_path.is_empty() {
            errors.push("no encoder executable has been specified in the encoder settings".into());
        }
        if self.video_codec.is_empty() {
            errors.push("no video encoding codec has been specified in the encoder settings".into());
        }
        if self.audio_codec.is_empty() {
            errors.push("no audio encoding codec has been specified in the encoder settings".into());
        }
        if self.output_file_extension.is_empty() {
            errors.push("no output file extension has been specified in the encoder settings".into());
        }
        errors
    }

    /// Probe whether the configured executable runs at all.
    pub fn is_encoder_available(&self) -> bool {
        if self.executable_path.is_empty() {
            return false;
        }
        Command::new(&self.executable_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/settings.rs"]
mod tests;
