use serde::{Deserialize, Serialize};

/// Job status vocabulary shared with the remote coordinator. Serialized
/// lowercase on the wire (`queued`, `starting`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderJobStatus {
    /// Accepted but not yet started.
    Queued,
    /// Session is up, render not yet producing frames.
    Starting,
    /// Frames are being produced.
    Rendering,
    /// Frame production done, encoder jobs running.
    Encoding,
    /// Everything finished.
    Completed,
    /// Aborted by an error.
    Failed,
    /// Aborted by request.
    Canceled,
}

impl RenderJobStatus {
    /// Wire string, identical to the serde form.
    pub fn as_str(self) -> &'static str {
        match self {
            RenderJobStatus::Queued => "queued",
            RenderJobStatus::Starting => "starting",
            RenderJobStatus::Rendering => "rendering",
            RenderJobStatus::Encoding => "encoding",
            RenderJobStatus::Completed => "completed",
            RenderJobStatus::Failed => "failed",
            RenderJobStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for RenderJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/report/status.rs"]
mod tests;
