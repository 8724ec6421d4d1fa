//! renderherd drives a headless render job end to end.
//!
//! A render session turns one coordinator job into frames, movies and a
//! stream of progress notifications:
//!
//! 1. **Gate**: poll an external readiness signal (with a bounded timeout
//!    fallback) before the render starts.
//! 2. **Observe**: watch the host pipeline's phases
//!    (`Uninitialized → ProducingFrames → Finalize → Export → Finished`)
//!    and its completion fraction once per tick.
//! 3. **Encode**: group finished frame sequences by render pass, write
//!    concat-demuxer manifests, launch one external encoder subprocess
//!    per stream and supervise it (incremental `frame=` parsing, ETA,
//!    cancellation, cleanup).
//! 4. **Report**: post rate-limited, coalesced job status to the remote
//!    coordinator over HTTP.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Tick-driven**: all orchestration state is mutated only inside
//!   `tick(now)` calls; subprocess output and HTTP completion arrive
//!   through channels and are polled, never awaited.
//! - **Never block the tick**: the single permitted blocking wait is
//!   subprocess termination during cancellation.
//! - **Weak shot references**: the render queue owns its shots; every
//!   status write checks liveness first.

#![forbid(unsafe_code)]

mod encode;
mod foundation;
mod queue;
mod report;
mod session;

pub use encode::command::{
    SpawnedEncoder, build_command_line, resolve_output_path, spawn_encoder, write_job_manifests,
};
pub use encode::group::{EncodeJobRequest, group_shot_outputs, has_multiple_render_passes};
pub use encode::manifest::{
    AUDIO_EXTENSION, InputKind, InputManifest, classify_extension, render_manifest_body,
    write_input_manifest,
};
pub use encode::settings::{EncodeQuality, EncoderSettings};
pub use encode::supervisor::{
    ENCODE_ETA_PREFIX, EncodeSupervisor, ProgressTracker, estimate_remaining_secs,
    eta_status_message, extract_frame_number, parse_eta_status,
};
pub use foundation::error::{RenderherdError, RenderherdResult};
pub use foundation::template::{expand_tokens, normalize_path, split_command_args};
pub use foundation::timefmt::{format_clock, parse_clock};
pub use queue::output::{AUDIO_PASS, PassId, ShotOutputData};
pub use queue::phase::PipelinePhase;
pub use queue::pipeline::{BasicResolver, FilenameResolver, RenderPipeline, format_version};
pub use queue::shot::{ShotHandle, WeakShot};
pub use report::reporter::{
    PipelineReporter, export_eta_seconds, progress_path, render_complete_path,
    weighted_encode_fraction,
};
pub use report::status::RenderJobStatus;
pub use report::throttle::{StatusUpdate, ThrottleConfig, ThrottledSender};
pub use report::transport::{
    HttpNotifier, NotificationTransport, RequestCompletion, RequestHandle, RequestState,
};
pub use session::config::{MovieQuality, SessionConfig, strip_frame_number_tokens};
pub use session::executor::RenderExecutor;
pub use session::gate::{AlwaysReady, GateDecision, GatePoller, ReadinessGate};
pub use session::prerendered::PrerenderedPipeline;
