use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encode::settings::{EncodeQuality, EncoderSettings};
use crate::foundation::template::normalize_path;
use crate::report::throttle::ThrottleConfig;

/// Movie quality index received on the command line, coupling the render
/// frame rate to an encoder quality tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovieQuality {
    /// Index 0: 24 fps, fast encode.
    Fps24,
    /// Index 1: 30 fps.
    Fps30,
    /// Index 2: 60 fps.
    Fps60,
    /// Index 3: 120 fps, near-lossless encode.
    #[default]
    Fps120,
}

impl MovieQuality {
    /// Map the wire index (0–3) to a quality; `None` out of range.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(MovieQuality::Fps24),
            1 => Some(MovieQuality::Fps30),
            2 => Some(MovieQuality::Fps60),
            3 => Some(MovieQuality::Fps120),
            _ => None,
        }
    }

    /// Render frame rate for this quality.
    pub fn frame_rate(self) -> f64 {
        match self {
            MovieQuality::Fps24 => 24.0,
            MovieQuality::Fps30 => 30.0,
            MovieQuality::Fps60 => 60.0,
            MovieQuality::Fps120 => 120.0,
        }
    }

    /// Encoder quality tier paired with this movie quality.
    pub fn encode_quality(self) -> EncodeQuality {
        match self {
            MovieQuality::Fps24 => EncodeQuality::Low,
            MovieQuality::Fps30 => EncodeQuality::Medium,
            MovieQuality::Fps60 => EncodeQuality::High,
            MovieQuality::Fps120 => EncodeQuality::Epic,
        }
    }
}

/// Remove `{frame_number}` tokens from a filename template. Movie files
/// cover the whole sequence, so per-frame tokens inherited from the
/// frame-output template must not survive into the movie path.
pub fn strip_frame_number_tokens(template: &str) -> String {
    template
        .replace(".{frame_number}", "")
        .replace("{frame_number}", "")
}

/// Everything one render-job session needs to run.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Coordinator-issued job id, used in notification URLs.
    pub job_id: String,
    /// Scene/sequence the render plays back.
    pub sequence_path: PathBuf,
    /// Frame rate and encoder quality selector.
    pub quality: MovieQuality,
    /// Movie filename template; empty means `{sequence_name}`.
    pub movie_format: String,
    /// Base URL of the remote coordinator.
    pub coordinator_url: String,
    /// Root under which `MovieRenders/<sequence>/<job>` is created.
    pub saved_root: PathBuf,
    /// How long to wait for the readiness gate before starting anyway.
    pub gate_timeout: Duration,
    /// External encoder configuration.
    pub encoder: EncoderSettings,
    /// Free-form extra encoder arguments for this job.
    pub additional_encoder_args: String,
    /// Delete rendered source frames once their encode job finishes.
    pub delete_source_files: bool,
    /// Keep generated manifests on disk for debugging.
    pub preserve_manifests: bool,
    /// Annotate video manifests with per-frame durations.
    pub write_frame_durations: bool,
    /// Terminate running encodes when the render is aborted.
    pub skip_encode_on_cancel: bool,
    /// Minimum spacing between coordinator progress updates.
    pub report_min_interval: Duration,
    /// Minimum progress change that justifies an update on its own.
    pub report_min_delta: f32,
}

impl SessionConfig {
    /// Build a config with the conventional defaults for `job_id`
    /// rendering `sequence_path`.
    pub fn new(
        job_id: impl Into<String>,
        sequence_path: impl Into<PathBuf>,
        quality: MovieQuality,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            sequence_path: sequence_path.into(),
            quality,
            movie_format: String::new(),
            coordinator_url: "http://127.0.0.1:8080".to_string(),
            saved_root: PathBuf::from("Saved"),
            gate_timeout: Duration::from_secs(60),
            encoder: EncoderSettings::default(),
            additional_encoder_args: String::new(),
            delete_source_files: true,
            preserve_manifests: false,
            write_frame_durations: true,
            skip_encode_on_cancel: true,
            report_min_interval: Duration::from_secs(1),
            report_min_delta: 0.01,
        }
    }

    /// Sequence name used in the output directory and `{sequence_name}`.
    pub fn sequence_name(&self) -> String {
        self.sequence_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sequence".to_string())
    }

    /// Absolute, normalized directory all of this job's output lands in:
    /// `<saved_root>/MovieRenders/<sequence-name>/<job-id>`.
    pub fn render_output_dir(&self) -> PathBuf {
        normalize_path(
            &self
                .saved_root
                .join("MovieRenders")
                .join(self.sequence_name())
                .join(&self.job_id),
        )
    }

    /// Full movie filename template: the output directory joined with the
    /// configured movie format (or `{sequence_name}`), with frame-number
    /// tokens stripped and the container extension appended.
    pub fn movie_template(&self) -> String {
        let name = if self.movie_format.is_empty() {
            "{sequence_name}"
        } else {
            self.movie_format.as_str()
        };
        let name = strip_frame_number_tokens(name);
        format!(
            "{}/{}.{{ext}}",
            self.render_output_dir().display(),
            name.trim_matches('.')
        )
    }

    /// Whether the movie template splits output per shot, which means
    /// encoding starts per shot as soon as its frames are flushed.
    pub fn needs_per_shot_flush(&self) -> bool {
        let template = self.movie_template();
        template.contains("{shot_name}") || template.contains("{camera_name}")
    }

    /// Throttle gates for the progress reporter.
    pub fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig {
            min_interval: self.report_min_interval,
            min_delta: self.report_min_delta,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
