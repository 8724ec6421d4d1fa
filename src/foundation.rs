//! Shared low-level helpers: error taxonomy, token templates, clock text.

pub mod error;
pub mod template;
pub mod timefmt;
