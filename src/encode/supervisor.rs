use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::encode::command::SpawnedEncoder;
use crate::foundation::timefmt::{format_clock, parse_clock};
use crate::queue::shot::WeakShot;

/// Fixed prefix of the ETA status message published on shots while their
/// encode job is running. The reporter recognizes this prefix and parses
/// the clock value back out of it when it aggregates export progress.
pub const ENCODE_ETA_PREFIX: &str = "Encoding ETA: ";

/// Minimum wall-clock spacing between shot progress pushes per job.
const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

/// Below this elapsed time the rate estimate is meaningless.
const ELAPSED_EPSILON: f64 = 1.0e-8;

/// Below this progress the rate estimate is meaningless.
const PROGRESS_EPSILON: f64 = 1.0e-4;

/// Extract the current frame number from one line of encoder output.
///
/// Matches the first `frame=` token case-insensitively, skips optional
/// whitespace after it and reads a run of decimal digits. Lines without
/// the token, or with nothing numeric after it, yield `None`; anything
/// around the token is tolerated.
pub fn extract_frame_number(line: &str) -> Option<u64> {
    let lower = line.to_ascii_lowercase();
    let start = lower.find("frame=")? + "frame=".len();
    let rest = &lower[start..];
    let digits: &str = {
        let trimmed = rest.trim_start();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Estimate remaining encode time from elapsed time and progress by
/// extrapolating the average rate so far. `None` when either value is too
/// small to divide by.
pub fn estimate_remaining_secs(elapsed_secs: f64, progress: f64) -> Option<f64> {
    if elapsed_secs <= ELAPSED_EPSILON || progress <= PROGRESS_EPSILON {
        return None;
    }
    let estimated_total = elapsed_secs / progress.clamp(PROGRESS_EPSILON, 1.0);
    Some((estimated_total - elapsed_secs).max(0.0))
}

/// Format the ETA status message published on shots: the fixed prefix plus
/// the remaining time as `MM:SS` (or `HH:MM:SS` from an hour up), rounded
/// to whole seconds. Negative or non-finite inputs produce no message.
pub fn eta_status_message(remaining_secs: f64) -> Option<String> {
    if !remaining_secs.is_finite() || remaining_secs < 0.0 {
        return None;
    }
    Some(format!(
        "{ENCODE_ETA_PREFIX}{}",
        format_clock(remaining_secs.round() as u64)
    ))
}

/// Recover the ETA in seconds from a status message written by
/// [`eta_status_message`]. `None` for any other message.
pub fn parse_eta_status(message: &str) -> Option<u64> {
    parse_clock(message.strip_prefix(ENCODE_ETA_PREFIX)?)
}

/// Incremental progress state of one encode job: line buffering, frame
/// parsing, throttled shot updates and the ETA estimate.
///
/// Kept separate from the process handle so the parsing and throttling
/// rules are testable without spawning anything.
#[derive(Debug)]
pub struct ProgressTracker {
    expected_frame_count: u64,
    last_reported_frame: u64,
    last_progress_sent_at: Option<Instant>,
    encode_started_at: Instant,
    last_reported_eta_secs: Option<f64>,
    pending_output: String,
}

impl ProgressTracker {
    /// Start tracking a job expected to produce `expected_frame_count`
    /// frames (0 = unknown, disables progress and ETA).
    pub fn new(expected_frame_count: u64, started_at: Instant) -> Self {
        Self {
            expected_frame_count,
            last_reported_frame: 0,
            last_progress_sent_at: None,
            encode_started_at: started_at,
            last_reported_eta_secs: None,
            pending_output: String::new(),
        }
    }

    /// Highest frame number seen so far.
    pub fn last_reported_frame(&self) -> u64 {
        self.last_reported_frame
    }

    /// Whether un-terminated output is still buffered.
    pub fn has_pending_output(&self) -> bool {
        !self.pending_output.is_empty()
    }

    /// Feed a chunk of raw subprocess output. Line terminators are
    /// normalized (`\r\n` and bare `\r` become `\n`), complete lines are
    /// parsed immediately and the unterminated tail stays buffered for the
    /// next chunk.
    pub fn consume(&mut self, chunk: &str, shot: &WeakShot, now: Instant) {
        if !chunk.is_empty() {
            let normalized = chunk.replace("\r\n", "\n").replace('\r', "\n");
            self.pending_output.push_str(&normalized);
        }

        while let Some(newline) = self.pending_output.find('\n') {
            let line: String = self.pending_output.drain(..=newline).collect();
            self.process_line(line.trim_end_matches('\n'), shot, now);
        }
    }

    /// Run any buffered tail through the line parser as a final implicit
    /// line. Called exactly once when the process ends, even if the final
    /// tick read zero new bytes.
    pub fn flush_tail(&mut self, shot: &WeakShot, now: Instant) {
        if self.pending_output.is_empty() {
            return;
        }
        let tail = std::mem::take(&mut self.pending_output);
        self.process_line(&tail, shot, now);
    }

    fn process_line(&mut self, line: &str, shot: &WeakShot, now: Instant) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        tracing::debug!(line = trimmed, "encoder output");

        let Some(frame) = extract_frame_number(trimmed) else {
            return;
        };
        // Out-of-order or repeated counters are dropped silently.
        if frame <= self.last_reported_frame {
            return;
        }
        self.last_reported_frame = frame;

        if self.expected_frame_count == 0 {
            return;
        }

        let progress =
            (self.last_reported_frame as f64 / self.expected_frame_count as f64).clamp(0.0, 1.0);
        let elapsed = now
            .saturating_duration_since(self.encode_started_at)
            .as_secs_f64();
        let remaining = estimate_remaining_secs(elapsed, progress);

        let force = progress >= 1.0;
        let due = force
            || self
                .last_progress_sent_at
                .is_none_or(|last| now.saturating_duration_since(last) >= MIN_UPDATE_INTERVAL);
        if !due {
            return;
        }
        self.last_progress_sent_at = Some(now);

        let Some(shot) = shot.upgrade() else {
            return;
        };
        shot.set_progress(progress as f32);

        if let Some(remaining) = remaining {
            let eta_due = force
                || self
                    .last_reported_eta_secs
                    .is_none_or(|last| (last - remaining).abs() >= 1.0);
            if eta_due {
                self.last_reported_eta_secs = Some(remaining);
                if let Some(message) = eta_status_message(remaining) {
                    shot.set_status_message(message);
                }
            }
        }
    }
}

/// One in-flight encoder subprocess owned by the supervisor.
struct ActiveEncodeJob {
    encoder: SpawnedEncoder,
    tracker: ProgressTracker,
    shot: WeakShot,
    files_to_delete: Vec<PathBuf>,
}

/// Owns the set of running encoder subprocesses and drives each of them
/// once per tick: drain output, parse progress, detect completion or
/// cancellation, and clean up.
pub struct EncodeSupervisor {
    jobs: Vec<ActiveEncodeJob>,
    cancel_on_abort: bool,
}

impl EncodeSupervisor {
    /// `cancel_on_abort` controls whether a pipeline shutdown request
    /// forcibly terminates running encodes (or lets them finish).
    pub fn new(cancel_on_abort: bool) -> Self {
        Self {
            jobs: Vec::new(),
            cancel_on_abort,
        }
    }

    /// Number of jobs still running.
    pub fn active_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// True once every job has completed and been cleaned up.
    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Adopt a spawned encoder as an active job.
    pub fn register(
        &mut self,
        encoder: SpawnedEncoder,
        expected_frame_count: u64,
        shot: WeakShot,
        files_to_delete: Vec<PathBuf>,
        now: Instant,
    ) {
        self.jobs.push(ActiveEncodeJob {
            encoder,
            tracker: ProgressTracker::new(expected_frame_count, now),
            shot,
            files_to_delete,
        });
    }

    /// Drive every active job once. `shutdown_requested` is the pipeline's
    /// abort signal; combined with `cancel_on_abort` it forces running
    /// encoders down. Iterates in reverse index order so finished jobs can
    /// be removed mid-loop.
    pub fn tick(&mut self, now: Instant, shutdown_requested: bool) {
        for index in (0..self.jobs.len()).rev() {
            let job = &mut self.jobs[index];

            while let Ok(chunk) = job.encoder.output_rx.try_recv() {
                job.tracker.consume(&chunk, &job.shot, now);
            }

            let cancelled = self.cancel_on_abort && shutdown_requested;
            let exit_status = if cancelled {
                // The one permitted blocking wait: termination is bounded
                // by the OS, not by external IO.
                let _ = job.encoder.child.kill();
                match job.encoder.child.wait() {
                    Ok(status) => Some(status),
                    Err(err) => {
                        tracing::warn!(%err, "failed to wait for cancelled encoder");
                        None
                    }
                }
            } else {
                match job.encoder.child.try_wait() {
                    Ok(status) => status,
                    Err(err) => {
                        tracing::warn!(%err, "failed to poll encoder status");
                        None
                    }
                }
            };

            if !cancelled && exit_status.is_none() {
                continue;
            }

            // The pipes are closed by now, so the pumps drain whatever is
            // left and exit; pick up those final chunks before flushing.
            for pump in job.encoder.pumps.drain(..) {
                let _ = pump.join();
            }
            while let Ok(chunk) = job.encoder.output_rx.try_recv() {
                job.tracker.consume(&chunk, &job.shot, now);
            }
            job.tracker.flush_tail(&job.shot, now);

            match exit_status {
                Some(status) if !status.success() && !cancelled => {
                    tracing::warn!(%status, "encoder exited with a failure status");
                }
                _ => {}
            }

            if !cancelled
                && job.tracker.expected_frame_count > 0
                && let Some(shot) = job.shot.upgrade()
            {
                shot.set_progress(1.0);
                shot.set_status_message("");
            }

            for path in &job.files_to_delete {
                match std::fs::remove_file(path) {
                    Ok(()) => {}
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => {
                        tracing::debug!(path = %path.display(), %err, "could not delete temp file");
                    }
                }
            }

            self.jobs.remove(index);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/supervisor.rs"]
mod tests;
