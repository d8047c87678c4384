//! Public API for the quanthuff-codec crate.
//!
//! This module provides the high-level [`Codec`] builder.

mod builder;

pub use builder::Codec;
