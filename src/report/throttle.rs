use std::time::{Duration, Instant};

use crate::report::status::RenderJobStatus;
use crate::report::transport::{NotificationTransport, RequestHandle};

/// One progress notification for the coordinator.
///
/// `progress` lives on the combined render+encode scale: the render phase
/// contributes [0, 1], the export phase [1, 2].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusUpdate {
    /// Combined-scale progress value.
    pub progress: f32,
    /// Coordinator-visible status.
    pub status: RenderJobStatus,
    /// Estimated remaining seconds, −1 when unknown.
    pub eta_seconds: i64,
}

/// Gates applied before a progress update goes on the wire.
#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Minimum spacing between sends.
    pub min_interval: Duration,
    /// Minimum progress change that justifies a send on its own.
    pub min_delta: f32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
            min_delta: 0.01,
        }
    }
}

/// Upper bound of the combined progress scale.
const SCALE_MAX: f32 = 2.0;

/// Tolerance for "progress reached a scale boundary".
const END_EPSILON: f32 = 1.0e-4;

/// Rate-limited, coalescing sender for progress notifications.
///
/// At most one request is in flight at a time. Updates arriving while one
/// is outstanding collapse into a single pending slot (last write wins,
/// never a queue); the slot is dispatched as soon as the in-flight request
/// is observed to have settled, so the coordinator always catches up to
/// the latest value rather than replaying history.
#[derive(Debug)]
pub struct ThrottledSender {
    progress_path: String,
    config: ThrottleConfig,
    last_sent_value: Option<f32>,
    last_sent_at: Option<Instant>,
    in_flight: Option<RequestHandle>,
    pending: Option<StatusUpdate>,
}

impl ThrottledSender {
    /// `progress_path` is the coordinator endpoint every update posts to.
    pub fn new(progress_path: impl Into<String>, config: ThrottleConfig) -> Self {
        Self {
            progress_path: progress_path.into(),
            config,
            last_sent_value: None,
            last_sent_at: None,
            in_flight: None,
            pending: None,
        }
    }

    /// Whether a request is currently outstanding.
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Observe in-flight completion and fire the pending coalesced update
    /// if one accumulated. Call once per tick before offering new values.
    pub fn poll(&mut self, now: Instant, transport: &dyn NotificationTransport) {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(RequestHandle::is_finished);
        if !finished {
            return;
        }
        self.in_flight = None;
        if let Some(update) = self.pending.take() {
            // The slot already passed the gates when it was accepted.
            self.dispatch(update, now, transport);
        }
    }

    /// Offer a progress value. Returns `true` when the update was sent or
    /// parked in the pending slot, `false` when the gates rejected it.
    ///
    /// Gates: the first update always passes, as does any update at a
    /// scale boundary (1.0 or 2.0) and any update with `force` set; other
    /// updates pass once `min_interval` elapsed since the last send or the
    /// value moved by at least `min_delta`.
    pub fn offer(
        &mut self,
        now: Instant,
        update: StatusUpdate,
        force: bool,
        transport: &dyn NotificationTransport,
    ) -> bool {
        let progress = update.progress.clamp(0.0, SCALE_MAX);
        let update = StatusUpdate { progress, ..update };

        let first = self.last_sent_value.is_none() || self.last_sent_at.is_none();
        // Reaching a scale boundary always goes out; sitting on one does
        // not, or every tick at 1.0/2.0 would bypass the gates.
        let at_boundary = ((progress - 1.0).abs() <= END_EPSILON
            || (progress - SCALE_MAX).abs() <= END_EPSILON)
            && self.last_sent_value != Some(progress);
        let delta_ok = self
            .last_sent_value
            .is_none_or(|last| (progress - last).abs() >= self.config.min_delta);
        let interval_ok = self
            .last_sent_at
            .is_none_or(|last| now.saturating_duration_since(last) >= self.config.min_interval);

        if !(force || first || at_boundary || interval_ok || delta_ok) {
            return false;
        }

        if self.in_flight.is_some() {
            // Coalesce: keep only the newest value.
            self.pending = Some(update);
            return true;
        }

        self.dispatch(update, now, transport);
        true
    }

    fn dispatch(&mut self, update: StatusUpdate, now: Instant, transport: &dyn NotificationTransport) {
        self.last_sent_value = Some(update.progress);
        self.last_sent_at = Some(now);
        let body = serde_json::json!({
            "progress_percent": update.progress,
            "status": update.status.as_str(),
            "progress_eta_seconds": update.eta_seconds,
        });
        self.in_flight = Some(transport.post_json(&self.progress_path, body));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/report/throttle.rs"]
mod tests;
