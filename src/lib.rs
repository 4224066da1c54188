//! Photogen - pair a visitor's photo with a golfer via AI image providers.
//!
//! An upload is validated against the roster and size ceiling, normalized
//! to a square PNG, then offered to each configured provider in priority
//! order. The first provider to return an image wins. If none do, a
//! deterministic composite card is rendered locally, so every valid
//! request gets an image back.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod codec;
pub mod composite;
pub mod config;
pub mod context;
pub mod error;
pub mod font;
pub mod model;
pub mod orchestrator;
pub mod params;
pub mod ports;
pub mod roster;
pub mod server;
pub mod service;

pub use error::PhotoError;
pub use model::{FailureReason, GenerationRequest, GenerationResult, ProviderConfig, ProviderId};
pub use service::PhotoService;
