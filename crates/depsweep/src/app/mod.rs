//! Application layer composing detection, prompting, and removal.

pub mod global;
pub mod prune;
pub mod remove;
pub mod scan;
pub mod scripts;
pub mod selection;
pub mod usage;
