use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::queue::shot::WeakShot;

/// Identifier of one render pass (e.g. `beauty`, `depth`, `Audio`).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassId(pub String);

/// Pass identifier reserved for mixed-down audio output. Audio files are
/// not encoded on their own; they are attached to every video stream.
pub const AUDIO_PASS: &str = "Audio";

impl PassId {
    /// Build a pass id from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Pass name as written by the renderer.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether this is the reserved audio pass.
    pub fn is_audio(&self) -> bool {
        self.0 == AUDIO_PASS
    }
}

impl std::fmt::Display for PassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Files one shot produced, keyed by render pass.
///
/// Handed over by the render pipeline when a shot (or the whole queue)
/// finishes producing frames. The shot reference is weak: the queue may
/// tear the shot down while its files are still being encoded.
#[derive(Clone, Debug, Default)]
pub struct ShotOutputData {
    /// Back-reference to the shot that produced these files.
    pub shot: WeakShot,
    /// Produced file paths per render pass, in production order.
    pub render_pass_data: BTreeMap<PassId, Vec<PathBuf>>,
}

impl ShotOutputData {
    /// Record files for one pass, appending to any existing entry.
    pub fn add_pass_files(&mut self, pass: PassId, files: impl IntoIterator<Item = PathBuf>) {
        self.render_pass_data.entry(pass).or_default().extend(files);
    }
}
