//! Quanthuff - lossy PNG compression
//!
//! PNG adapter, configuration and file services around `quanthuff-codec`.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
