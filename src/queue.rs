//! Contracts with the host render queue: shots, per-shot output data,
//! pipeline phases and the collaborator traits this crate consumes.

pub mod output;
pub mod phase;
pub mod pipeline;
pub mod shot;
