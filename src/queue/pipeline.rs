use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::foundation::error::RenderherdResult;
use crate::foundation::template::{expand_tokens, normalize_path};
use crate::queue::output::ShotOutputData;
use crate::queue::phase::PipelinePhase;
use crate::queue::shot::ShotHandle;

/// Read/drive surface of the host rendering pipeline.
///
/// The engine owns frame production; this crate observes phases and
/// progress through this trait and asks for shutdown when something fatal
/// happens before or during export.
pub trait RenderPipeline {
    /// Begin frame production. Called once, after the readiness gate
    /// opens; pipelines the engine starts on its own can ignore it.
    fn start(&mut self, _now: Instant) {}

    /// Advance internal state. Called once per session tick; pipelines
    /// driven entirely by the engine can ignore it.
    fn tick(&mut self, _now: Instant) {}

    /// Current lifecycle phase.
    fn phase(&self) -> PipelinePhase;

    /// Fraction of frames produced so far, 0..=1.
    fn completion(&self) -> f32;

    /// Engine-side estimate of remaining render time, if it has one.
    fn estimated_remaining_secs(&self) -> Option<f64> {
        None
    }

    /// Whether an abort has been requested (user cancel, fatal error).
    fn is_shutdown_requested(&self) -> bool;

    /// Request an abort of the whole render job.
    fn request_shutdown(&mut self);

    /// Shots participating in this job, for progress weighting.
    fn shots(&self) -> Vec<ShotHandle>;

    /// Hand over per-shot output data once frame production is complete.
    /// Returns an empty list when called again.
    fn take_output_data(&mut self) -> Vec<ShotOutputData>;

    /// Whether the render finished without errors; meaningful once the
    /// phase reaches [`PipelinePhase::Finished`].
    fn succeeded(&self) -> bool;
}

/// Filename-template resolution service.
///
/// Template strings use `{token}` placeholders (`{render_pass}`, `{ext}`,
/// `{shot_name}`, `{camera_name}`, ...). Version numbers for `{version}`
/// tokens are resolved separately because they are per-job, not per-file.
pub trait FilenameResolver {
    /// Substitute `overrides` into `template` and return an absolute,
    /// lexically normalized path.
    fn resolve(
        &self,
        template: &str,
        overrides: &BTreeMap<String, String>,
    ) -> RenderherdResult<PathBuf>;

    /// Next version number for `{version}` tokens.
    fn resolve_version(&self) -> u32 {
        1
    }
}

/// Plain token-substitution resolver, sufficient for file-based pipelines.
#[derive(Clone, Debug, Default)]
pub struct BasicResolver {
    /// Version number reported for `{version}` tokens.
    pub version: u32,
}

impl FilenameResolver for BasicResolver {
    fn resolve(
        &self,
        template: &str,
        overrides: &BTreeMap<String, String>,
    ) -> RenderherdResult<PathBuf> {
        let expanded = expand_tokens(template, overrides);
        Ok(normalize_path(std::path::Path::new(&expanded)))
    }

    fn resolve_version(&self) -> u32 {
        self.version.max(1)
    }
}

/// Render a version number the way `{version}` tokens expect it.
pub fn format_version(version: u32) -> String {
    format!("v{:03}", version)
}

#[cfg(test)]
#[path = "../../tests/unit/queue/pipeline.rs"]
mod tests;
