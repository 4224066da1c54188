//! Record/replay of provider attempts for offline runs and deterministic tests.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
