#![forbid(unsafe_code)]
//! flowlens-core library.
//!
//! The snapshot data model ([`model::Overview`]), engine configuration,
//! error codes and the caller-owned caches shared by every derivation.
//!
//! # Conventions
//!
//! - **Errors**: contract violations are [`error::EngineError`]; file
//!   loading returns `anyhow::Result` with path context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod cache;
pub mod config;
pub mod error;
pub mod model;

pub use error::{EngineError, ErrorCode};
