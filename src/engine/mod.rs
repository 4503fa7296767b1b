//! Engine sidecar communication module.
//!
//! The native semantic engine runs as a long-lived child process; this
//! module provides async communication with it. The sidecar owns all raw
//! database connections and engine internals, while this crate stays
//! source-agnostic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Gantry (Rust + Tokio)                      │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                    EngineClient (Async)                   │  │
//! │  │  - Spawns the engine as a child process                   │  │
//! │  │  - NDJSON protocol over stdin/stdout                      │  │
//! │  │  - Request IDs for concurrent request correlation         │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                              │                                  │
//! │               stdin (NDJSON) │ stdout (NDJSON)                  │
//! │                              ▼                                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            Engine Sidecar (Long-Running Child Process)          │
//! │        catalog.sql · session.create · manifest.extract          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::{EngineClient, ManifestExtractor};
pub use error::{EngineError, EngineResult};
