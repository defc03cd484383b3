//! Common utilities for the Kestrel selector engine.
//!
//! This crate provides shared infrastructure used by the engine crates:
//! - **Warning System** - warning sinks and colored terminal output for
//!   recognized-but-unsupported selector features

pub mod warning;
