//! fuseq-core - Core types and traits for the hybrid query engine
//!
//! This crate provides the foundational types, traits, error handling and
//! configuration used throughout the fuseq workspace.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{FuseError, Result};
pub use traits::*;
pub use types::*;
