//! The encode side of the pipeline: grouping rendered output into encode
//! jobs, writing concat manifests, launching the external encoder and
//! supervising it to completion.

pub mod command;
pub mod group;
pub mod manifest;
pub mod settings;
pub mod supervisor;
