/// Lifecycle stage of the host render pipeline.
///
/// Transitions are observed, never driven, by this crate: the rendering
/// engine owns the pipeline and advances it; the session and reporter only
/// read the current phase once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PipelinePhase {
    /// Pipeline object exists but has not started producing frames.
    #[default]
    Uninitialized,
    /// Frames are being rendered to disk.
    ProducingFrames,
    /// Frame production is done; outputs are being finalized.
    Finalize,
    /// Export/encode stage: frame sequences are handed to the encoder.
    Export,
    /// Terminal state.
    Finished,
}

impl PipelinePhase {
    /// Stable lowercase name, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            PipelinePhase::Uninitialized => "uninitialized",
            PipelinePhase::ProducingFrames => "producing-frames",
            PipelinePhase::Finalize => "finalize",
            PipelinePhase::Export => "export",
            PipelinePhase::Finished => "finished",
        }
    }
}
