//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the generation pipeline and an
//! external system. Implementations live in `src/adapters/`.

pub mod provider_client;

pub use provider_client::{AttemptFuture, GeneratedImage, ProviderClient, ProviderRequest};
