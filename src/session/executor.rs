use std::collections::BTreeMap;
use std::time::Instant;

use crate::encode::command::{
    build_command_line, resolve_output_path, spawn_encoder, write_job_manifests,
};
use crate::encode::group::{EncodeJobRequest, group_shot_outputs, has_multiple_render_passes};
use crate::encode::supervisor::EncodeSupervisor;
use crate::foundation::error::{RenderherdError, RenderherdResult};
use crate::queue::output::ShotOutputData;
use crate::queue::phase::PipelinePhase;
use crate::queue::pipeline::{FilenameResolver, RenderPipeline};
use crate::report::reporter::PipelineReporter;
use crate::report::transport::NotificationTransport;
use crate::session::config::SessionConfig;
use crate::session::gate::{GateDecision, GatePoller, ReadinessGate};

/// Lifecycle of one executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExecutorState {
    /// Polling the readiness gate.
    WaitingForGate,
    /// Render and/or encode in progress.
    Running,
    /// Work finished and the completion notification went out.
    Finished,
}

/// Drives one render job end to end: readiness gate, render observation,
/// encode launching/supervision and coordinator reporting. All work
/// happens inside [`tick`], which the host calls once per frame or on a
/// fixed polling interval; nothing here blocks on external IO.
///
/// [`tick`]: RenderExecutor::tick
pub struct RenderExecutor<P: RenderPipeline> {
    config: SessionConfig,
    pipeline: P,
    gate: Box<dyn ReadinessGate>,
    gate_poller: GatePoller,
    resolver: Box<dyn FilenameResolver>,
    reporter: PipelineReporter,
    supervisor: EncodeSupervisor,
    pending_output: Vec<ShotOutputData>,
    export_started: bool,
    state: ExecutorState,
    frame_rate: f64,
}

impl<P: RenderPipeline> RenderExecutor<P> {
    /// Validate the job parameters and assemble an executor.
    ///
    /// Fails fast on an empty job id or sequence path; a job that cannot
    /// identify itself or its input never partially starts.
    pub fn new(
        config: SessionConfig,
        pipeline: P,
        gate: Box<dyn ReadinessGate>,
        resolver: Box<dyn FilenameResolver>,
        now: Instant,
    ) -> RenderherdResult<Self> {
        if config.job_id.is_empty() {
            return Err(RenderherdError::validation("job id must not be empty"));
        }
        if config.sequence_path.as_os_str().is_empty() {
            return Err(RenderherdError::validation(
                "the job has an invalid/null sequence; see log for details",
            ));
        }

        let reporter = PipelineReporter::new(config.job_id.clone(), config.throttle_config());
        let supervisor = EncodeSupervisor::new(config.skip_encode_on_cancel);
        let gate_poller = GatePoller::new(now, config.gate_timeout);
        let frame_rate = config.quality.frame_rate();

        Ok(Self {
            config,
            pipeline,
            gate,
            gate_poller,
            resolver,
            reporter,
            supervisor,
            pending_output: Vec::new(),
            export_started: false,
            state: ExecutorState::WaitingForGate,
            frame_rate,
        })
    }

    /// The wrapped pipeline (mainly for inspection in tests and drivers).
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Mutable access to the wrapped pipeline.
    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }

    /// Whether the session has fully finished (including cleanup).
    pub fn is_finished(&self) -> bool {
        self.state == ExecutorState::Finished
    }

    /// Drive the session once.
    pub fn tick(&mut self, transport: &dyn NotificationTransport, now: Instant) {
        match self.state {
            ExecutorState::WaitingForGate => {
                self.reporter
                    .observe(&self.pipeline, false, transport, now);
                match self.gate_poller.poll(self.gate.as_ref(), now) {
                    GateDecision::Wait => {}
                    GateDecision::Start { timed_out } => {
                        if !timed_out {
                            tracing::info!("readiness gate open; starting render");
                        }
                        self.pipeline.start(now);
                        self.state = ExecutorState::Running;
                    }
                }
            }
            ExecutorState::Running => {
                self.pipeline.tick(now);

                let mut fresh = self.pipeline.take_output_data();
                if !fresh.is_empty() {
                    self.pending_output.append(&mut fresh);
                }
                let in_export = self.pipeline.phase() == PipelinePhase::Export;
                let export_due = in_export || self.config.needs_per_shot_flush();
                if export_due && !self.pending_output.is_empty() {
                    self.begin_export(now);
                } else if in_export && !self.export_started {
                    // Export phase with nothing to encode: note it so the
                    // session can still complete.
                    self.export_started = true;
                }

                self.supervisor
                    .tick(now, self.pipeline.is_shutdown_requested());
                self.reporter
                    .observe(&self.pipeline, self.supervisor.is_idle(), transport, now);

                let drained = self.supervisor.is_idle();
                let aborted = self.pipeline.is_shutdown_requested() && drained;
                let finished = drained
                    && (self.pipeline.phase() == PipelinePhase::Finished
                        || (in_export && self.export_started));
                if aborted || finished {
                    self.finish(transport);
                }
            }
            ExecutorState::Finished => {}
        }
    }

    /// Export hook: group any pending shot output and launch one encoder
    /// per stream. Safe to call with nothing pending.
    pub fn begin_export(&mut self, now: Instant) {
        if self.pending_output.is_empty() {
            return;
        }

        let errors = self.config.encoder.validation_errors();
        if !errors.is_empty() {
            for error in &errors {
                tracing::error!("{error}");
            }
            self.pending_output.clear();
            self.pipeline.request_shutdown();
            return;
        }

        let mut template = self.config.movie_template();
        if has_multiple_render_passes(&self.pending_output)
            && !template.contains("{render_pass}")
        {
            // Without the pass token every pass would write the same file.
            tracing::warn!(
                "multiple render passes with no {{render_pass}} token in the \
                 filename format; adding one"
            );
            template = template.replace("{ext}", "{render_pass}.{ext}");
        }

        let shared_args = self.shared_encoder_args();
        let mut output = std::mem::take(&mut self.pending_output);
        let requests =
            group_shot_outputs(&mut output, &shared_args, self.config.delete_source_files);

        for request in requests {
            if let Err(err) = self.launch_job(request, &template, now) {
                tracing::error!(%err, "failed to launch encoder; shutting the job down");
                self.pipeline.request_shutdown();
                return;
            }
        }
        self.export_started = true;
    }

    /// Export hook: whether every encode job has completed and been
    /// cleaned up. Ticks the supervisor so cancellation still drains jobs
    /// when the engine has stopped issuing frame ticks.
    pub fn has_finished_exporting(&mut self, now: Instant) -> bool {
        self.supervisor
            .tick(now, self.pipeline.is_shutdown_requested());
        self.supervisor.is_idle()
    }

    fn shared_encoder_args(&self) -> BTreeMap<String, String> {
        let executable = self.config.encoder.executable_path.replace('"', "");
        let mut args = BTreeMap::new();
        args.insert("Executable".to_string(), executable);
        args.insert(
            "AudioCodec".to_string(),
            self.config.encoder.audio_codec.clone(),
        );
        args.insert(
            "VideoCodec".to_string(),
            self.config.encoder.video_codec.clone(),
        );
        args.insert("FrameRate".to_string(), format!("{}", self.frame_rate));
        args.insert(
            "Quality".to_string(),
            self.config
                .encoder
                .quality_args(self.config.quality.encode_quality())
                .to_string(),
        );
        args.insert(
            "AdditionalLocalArgs".to_string(),
            self.config.additional_encoder_args.clone(),
        );
        args
    }

    fn launch_job(
        &mut self,
        mut request: EncodeJobRequest,
        template: &str,
        now: Instant,
    ) -> RenderherdResult<()> {
        let mut overrides = BTreeMap::new();
        overrides.insert("render_pass".to_string(), request.pass.name().to_string());
        overrides.insert(
            "ext".to_string(),
            self.config.encoder.output_file_extension.clone(),
        );
        overrides.insert("sequence_name".to_string(), self.config.sequence_name());
        if let Some(shot) = request.shot.upgrade() {
            overrides.insert("shot_name".to_string(), shot.outer_name());
            overrides.insert("camera_name".to_string(), shot.inner_name());
        }

        let output_path = resolve_output_path(template, self.resolver.as_ref(), &overrides)?;

        let manifest_dir = self.config.render_output_dir();
        let manifests = write_job_manifests(
            &request,
            &manifest_dir,
            self.frame_rate,
            self.config.write_frame_durations,
        )?;

        let command_line =
            build_command_line(&self.config.encoder, &request, &manifests, &output_path);
        let executable = request
            .named_args
            .get("Executable")
            .cloned()
            .unwrap_or_else(|| self.config.encoder.executable_path.clone());
        let spawned = spawn_encoder(&executable, &command_line)?;

        let mut files_to_delete = Vec::new();
        if !self.config.preserve_manifests {
            files_to_delete.extend(manifests.iter().map(|m| m.path.clone()));
            if self.config.delete_source_files {
                for files in request.files_by_extension.values_mut() {
                    files_to_delete.append(files);
                }
            }
        }

        tracing::info!(
            pass = %request.pass,
            output = %output_path.display(),
            expected_frames = request.expected_frame_count,
            "encoder launched"
        );
        self.supervisor.register(
            spawned,
            request.expected_frame_count,
            request.shot.clone(),
            files_to_delete,
            now,
        );
        Ok(())
    }

    fn finish(&mut self, transport: &dyn NotificationTransport) {
        let success = self.pipeline.succeeded() && !self.pipeline.is_shutdown_requested();
        let video_directory = self.config.render_output_dir();
        self.reporter
            .notify_render_complete(transport, success, &video_directory);
        tracing::info!(
            success,
            directory = %video_directory.display(),
            "render job finished"
        );
        self.state = ExecutorState::Finished;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/executor.rs"]
mod tests;
