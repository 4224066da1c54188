//! Adapter implementations for port traits.
//!
//! - `live/` - Real provider API clients
//! - `recording/` - Record provider attempts to cassettes
//! - `replaying/` - Replay provider attempts from cassettes
//! - `timeout` - Per-attempt deadline

pub mod live;
pub mod recording;
pub mod replaying;
pub mod timeout;
