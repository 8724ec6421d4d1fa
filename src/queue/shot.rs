use std::sync::{Arc, Mutex, Weak};

/// Mutable status surface of one shot in the host render queue.
#[derive(Debug)]
struct ShotState {
    outer_name: String,
    inner_name: String,
    total_frame_count: u64,
    enabled: bool,
    progress: f32,
    status_message: String,
}

/// Owning handle to a shot's status surface.
///
/// The render queue owns shots; everything in this crate that needs to
/// propagate status back to them holds a [`WeakShot`] and upgrades per
/// access, because queue teardown can destroy shots while encode jobs are
/// still draining.
#[derive(Clone, Debug)]
pub struct ShotHandle {
    state: Arc<Mutex<ShotState>>,
}

/// Non-owning reference to a shot; all accessors go through `upgrade`.
#[derive(Clone, Debug, Default)]
pub struct WeakShot {
    state: Weak<Mutex<ShotState>>,
}

impl ShotHandle {
    /// Create a shot entry. `outer_name` is the shot's own name,
    /// `inner_name` the camera cut inside it.
    pub fn new(outer_name: impl Into<String>, inner_name: impl Into<String>, frames: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ShotState {
                outer_name: outer_name.into(),
                inner_name: inner_name.into(),
                total_frame_count: frames,
                enabled: true,
                progress: 0.0,
                status_message: String::new(),
            })),
        }
    }

    /// Downgrade to a non-owning reference.
    pub fn downgrade(&self) -> WeakShot {
        WeakShot {
            state: Arc::downgrade(&self.state),
        }
    }

    /// Shot name used for `{shot_name}` filename tokens.
    pub fn outer_name(&self) -> String {
        self.lock().outer_name.clone()
    }

    /// Camera name used for `{camera_name}` filename tokens.
    pub fn inner_name(&self) -> String {
        self.lock().inner_name.clone()
    }

    /// Total output frames this shot is expected to produce; 0 if unknown.
    pub fn frame_count(&self) -> u64 {
        self.lock().total_frame_count
    }

    /// Whether the shot participates in rendering/encoding at all.
    pub fn should_render(&self) -> bool {
        self.lock().enabled
    }

    /// Disable the shot (excluded from progress weighting and encoding).
    pub fn set_enabled(&self, enabled: bool) {
        self.lock().enabled = enabled;
    }

    /// Current numeric progress, 0..=1.
    pub fn progress(&self) -> f32 {
        self.lock().progress
    }

    /// Set numeric progress, 0..=1.
    pub fn set_progress(&self, progress: f32) {
        self.lock().progress = progress;
    }

    /// Current free-text status message.
    pub fn status_message(&self) -> String {
        self.lock().status_message.clone()
    }

    /// Replace the free-text status message.
    pub fn set_status_message(&self, message: impl Into<String>) {
        self.lock().status_message = message.into();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ShotState> {
        // Shot state is plain data; a poisoned lock means a panicking
        // setter, which cannot leave the fields torn.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl WeakShot {
    /// A reference that never upgrades; useful as a placeholder.
    pub fn dangling() -> Self {
        Self::default()
    }

    /// Try to reach the shot; `None` after queue teardown.
    pub fn upgrade(&self) -> Option<ShotHandle> {
        self.state.upgrade().map(|state| ShotHandle { state })
    }

    /// Whether both references point at the same shot.
    pub fn ptr_eq(&self, other: &WeakShot) -> bool {
        self.state.ptr_eq(&other.state)
    }

    /// Whether the shot is still alive.
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/queue/shot.rs"]
mod tests;
