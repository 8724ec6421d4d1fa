use std::time::{Duration, Instant};

/// External signal that the scene/world is safe to start rendering.
///
/// The host environment decides readiness (level streamed in, data
/// synced, warm-up done); the session only polls.
pub trait ReadinessGate {
    /// Whether rendering may start now.
    fn is_ready(&self) -> bool;
}

/// A gate that is always open; used when the host provides no signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysReady;

impl ReadinessGate for AlwaysReady {
    fn is_ready(&self) -> bool {
        true
    }
}

/// Outcome of one readiness poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Keep waiting.
    Wait,
    /// Start rendering. `timed_out` is set when the gate never opened and
    /// the timeout fallback kicked in.
    Start {
        /// Whether this start is the timeout fallback.
        timed_out: bool,
    },
}

/// Bounded wait for a [`ReadinessGate`].
///
/// Polled once per tick; when the gate stays closed past `timeout` the
/// render starts anyway so a wedged host signal cannot hang the job
/// forever.
#[derive(Clone, Copy, Debug)]
pub struct GatePoller {
    started_at: Instant,
    timeout: Duration,
}

impl GatePoller {
    /// Start the wait window at `now`.
    pub fn new(now: Instant, timeout: Duration) -> Self {
        Self {
            started_at: now,
            timeout,
        }
    }

    /// Time spent waiting so far.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Poll the gate once.
    pub fn poll(&self, gate: &dyn ReadinessGate, now: Instant) -> GateDecision {
        if gate.is_ready() {
            return GateDecision::Start { timed_out: false };
        }
        if self.elapsed(now) >= self.timeout {
            tracing::warn!(
                waited_secs = self.elapsed(now).as_secs(),
                "readiness gate never opened; starting render anyway"
            );
            return GateDecision::Start { timed_out: true };
        }
        GateDecision::Wait
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/gate.rs"]
mod tests;
