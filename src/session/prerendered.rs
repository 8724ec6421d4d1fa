use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;

use crate::foundation::error::{RenderherdError, RenderherdResult};
use crate::queue::output::{AUDIO_PASS, PassId, ShotOutputData};
use crate::queue::phase::PipelinePhase;
use crate::queue::pipeline::RenderPipeline;
use crate::queue::shot::ShotHandle;

/// Image extensions recognized as rendered frames.
const FRAME_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "exr", "bmp", "tga"];

/// Pipeline over frames that already exist on disk.
///
/// Stands in for a live rendering engine when the frames were produced by
/// an earlier run (or another machine) and only the encode + reporting
/// half of the job remains. Frame production is instantaneous: the phases
/// step `Uninitialized → ProducingFrames → Finalize → Export` one tick at
/// a time, handing over a single shot whose files are the directory scan.
#[derive(Debug)]
pub struct PrerenderedPipeline {
    shot: ShotHandle,
    output: Option<Vec<ShotOutputData>>,
    phase: PipelinePhase,
    shutdown_requested: bool,
    ticks_in_phase: u32,
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.as_str()))
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| ext == "wav")
}

impl PrerenderedPipeline {
    /// Scan `frames_dir` for a frame sequence (plus any `.wav` mix) and
    /// build a single-shot pipeline around it. The frames become render
    /// pass `pass_name`; files sort by name, which is production order
    /// for zero-padded frame sequences.
    pub fn from_frames_dir(
        frames_dir: &Path,
        pass_name: &str,
        shot_name: &str,
    ) -> RenderherdResult<Self> {
        let entries = std::fs::read_dir(frames_dir)
            .with_context(|| format!("scan frames directory '{}'", frames_dir.display()))?;

        let mut frames: Vec<PathBuf> = Vec::new();
        let mut audio: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("scan frames directory '{}'", frames_dir.display()))?
                .path();
            if is_frame_file(&path) {
                frames.push(path);
            } else if is_audio_file(&path) {
                audio.push(path);
            }
        }
        frames.sort();
        audio.sort();

        if frames.is_empty() {
            return Err(RenderherdError::validation(format!(
                "no frame files found in '{}'",
                frames_dir.display()
            )));
        }

        let shot = ShotHandle::new(shot_name, shot_name, frames.len() as u64);
        let mut data = ShotOutputData {
            shot: shot.downgrade(),
            ..ShotOutputData::default()
        };
        data.add_pass_files(PassId::new(pass_name), frames);
        if !audio.is_empty() {
            data.add_pass_files(PassId::new(AUDIO_PASS), audio);
        }

        Ok(Self {
            shot,
            output: Some(vec![data]),
            phase: PipelinePhase::Uninitialized,
            shutdown_requested: false,
            ticks_in_phase: 0,
        })
    }

    /// The single shot this pipeline carries.
    pub fn shot(&self) -> &ShotHandle {
        &self.shot
    }
}

impl RenderPipeline for PrerenderedPipeline {
    fn start(&mut self, _now: Instant) {
        if self.phase == PipelinePhase::Uninitialized {
            self.phase = PipelinePhase::ProducingFrames;
        }
    }

    fn tick(&mut self, _now: Instant) {
        // Dwell one tick per phase so observers see each phase at least
        // once before it advances.
        self.ticks_in_phase += 1;
        if self.ticks_in_phase < 2 {
            return;
        }
        let next = match self.phase {
            PipelinePhase::ProducingFrames => PipelinePhase::Finalize,
            PipelinePhase::Finalize => PipelinePhase::Export,
            other => other,
        };
        if next != self.phase {
            self.phase = next;
            self.ticks_in_phase = 0;
        }
    }

    fn phase(&self) -> PipelinePhase {
        self.phase
    }

    fn completion(&self) -> f32 {
        // Frames exist before the session starts.
        match self.phase {
            PipelinePhase::Uninitialized => 0.0,
            _ => 1.0,
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    fn shots(&self) -> Vec<ShotHandle> {
        vec![self.shot.clone()]
    }

    fn take_output_data(&mut self) -> Vec<ShotOutputData> {
        if self.phase == PipelinePhase::Export {
            self.output.take().unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    fn succeeded(&self) -> bool {
        !self.shutdown_requested
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/prerendered.rs"]
mod tests;
