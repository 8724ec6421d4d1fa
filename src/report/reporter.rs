use std::path::Path;
use std::time::Instant;

use crate::encode::supervisor::parse_eta_status;
use crate::queue::phase::PipelinePhase;
use crate::queue::pipeline::RenderPipeline;
use crate::queue::shot::ShotHandle;
use crate::report::status::RenderJobStatus;
use crate::report::throttle::{StatusUpdate, ThrottleConfig, ThrottledSender};
use crate::report::transport::{NotificationTransport, RequestHandle};

/// Coordinator endpoint for progress updates of one job.
pub fn progress_path(job_id: &str) -> String {
    format!("/ue-notifications/job/{job_id}/progress")
}

/// Coordinator endpoint for the final completion notification of one job.
pub fn render_complete_path(job_id: &str) -> String {
    format!("/ue-notifications/job/{job_id}/render-complete")
}

/// Encode completion across `shots`, weighted by each shot's frame count.
///
/// Shots that are disabled or have no known frame count carry no weight.
/// Returns 0 when nothing has weight.
pub fn weighted_encode_fraction(shots: &[ShotHandle]) -> f32 {
    let mut total_frames = 0u64;
    let mut weighted = 0.0f64;
    for shot in shots {
        if !shot.should_render() {
            continue;
        }
        let frames = shot.frame_count();
        if frames == 0 {
            continue;
        }
        total_frames += frames;
        weighted += f64::from(shot.progress()) * frames as f64;
    }
    if total_frames == 0 {
        0.0
    } else {
        (weighted / total_frames as f64) as f32
    }
}

/// Recover the encode ETA from shot status messages.
///
/// The encode supervisor publishes per-shot ETAs behind a fixed message
/// prefix; the longest one found bounds the whole export. When no shot
/// carries an ETA the result is 0 for a complete export and −1 (unknown)
/// otherwise.
pub fn export_eta_seconds(shots: &[ShotHandle], encode_complete: bool) -> i64 {
    let max_eta = shots
        .iter()
        .filter_map(|shot| parse_eta_status(&shot.status_message()))
        .max();
    match max_eta {
        Some(eta) => eta as i64,
        None if encode_complete => 0,
        None => -1,
    }
}

/// Phase-observing status reporter for one render job.
///
/// Watches the pipeline once per tick and turns phase transitions and
/// progress movement into a monotone, rate-limited stream of coordinator
/// notifications. Progress is reported on the combined scale: the render
/// phase covers [0, 1] and the export phase [1, 2].
pub struct PipelineReporter {
    job_id: String,
    sender: ThrottledSender,
    last_phase: Option<PipelinePhase>,
    sent_starting: bool,
    sent_finalize: bool,
    sent_final_export: bool,
}

/// Tolerance used when deciding the encode fraction has reached 1.0.
const EXPORT_COMPLETE_EPSILON: f32 = 1.0e-4;

impl PipelineReporter {
    /// Create a reporter for `job_id` with the given throttle gates.
    pub fn new(job_id: impl Into<String>, config: ThrottleConfig) -> Self {
        let job_id = job_id.into();
        let sender = ThrottledSender::new(progress_path(&job_id), config);
        Self {
            job_id,
            sender,
            last_phase: None,
            sent_starting: false,
            sent_finalize: false,
            sent_final_export: false,
        }
    }

    /// Job this reporter speaks for.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Observe the pipeline once. `encode_idle` is the supervisor's
    /// "no active jobs" signal, which stands in for a complete encode when
    /// no shot exposes a usable frame count.
    pub fn observe(
        &mut self,
        pipeline: &dyn RenderPipeline,
        encode_idle: bool,
        transport: &dyn NotificationTransport,
        now: Instant,
    ) {
        self.sender.poll(now, transport);

        let phase = pipeline.phase();
        let entered = self.last_phase != Some(phase);
        if entered {
            // Re-entering a phase re-arms its one-shot notification.
            match phase {
                PipelinePhase::Uninitialized => self.sent_starting = false,
                PipelinePhase::Finalize => self.sent_finalize = false,
                _ => {}
            }
            self.last_phase = Some(phase);
        }
        if phase != PipelinePhase::Export {
            self.sent_final_export = false;
        }

        match phase {
            PipelinePhase::Uninitialized => {
                if !self.sent_starting {
                    self.sent_starting = true;
                    self.sender.offer(
                        now,
                        StatusUpdate {
                            progress: 0.0,
                            status: RenderJobStatus::Starting,
                            eta_seconds: -1,
                        },
                        true,
                        transport,
                    );
                }
            }
            PipelinePhase::ProducingFrames => {
                let completion = pipeline.completion().clamp(0.0, 1.0);
                let eta_seconds = pipeline
                    .estimated_remaining_secs()
                    .map(|secs| secs.round() as i64)
                    .unwrap_or(-1);
                self.sender.offer(
                    now,
                    StatusUpdate {
                        progress: completion,
                        status: RenderJobStatus::Rendering,
                        eta_seconds,
                    },
                    entered,
                    transport,
                );
            }
            PipelinePhase::Finalize => {
                if !self.sent_finalize {
                    self.sent_finalize = true;
                    self.sender.offer(
                        now,
                        StatusUpdate {
                            progress: 1.0,
                            status: RenderJobStatus::Encoding,
                            eta_seconds: -1,
                        },
                        true,
                        transport,
                    );
                }
            }
            PipelinePhase::Export => {
                let shots = pipeline.shots();
                let mut fraction = weighted_encode_fraction(&shots);
                if encode_idle {
                    fraction = 1.0;
                }
                let complete = fraction >= 1.0 - EXPORT_COMPLETE_EPSILON;
                let force_final = complete && !self.sent_final_export;
                if force_final {
                    self.sent_final_export = true;
                }
                self.sender.offer(
                    now,
                    StatusUpdate {
                        progress: 1.0 + fraction,
                        status: RenderJobStatus::Encoding,
                        eta_seconds: export_eta_seconds(&shots, complete),
                    },
                    entered || force_final,
                    transport,
                );
            }
            PipelinePhase::Finished => {}
        }
    }

    /// Post the final completion notification. Not throttled: this is a
    /// distinct endpoint sent exactly once by the session.
    pub fn notify_render_complete(
        &self,
        transport: &dyn NotificationTransport,
        success: bool,
        video_directory: &Path,
    ) -> RequestHandle {
        let body = serde_json::json!({
            "movie_pipeline_success": success,
            "video_directory": video_directory.display().to_string(),
        });
        transport.post_json(&render_complete_path(&self.job_id), body)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/report/reporter.rs"]
mod tests;
