//! Shared types for the BIDS EEG fixup tools
//!
//! This crate contains the core types used throughout the fixup tooling,
//! including subject identifiers, legacy naming schemes, BrainVision header
//! parsing and the configuration file format.

pub mod brainvision;
pub mod config;
pub mod error;
pub mod naming;
pub mod subject;

// Re-export commonly used types
pub use brainvision::*;
pub use config::*;
pub use error::*;
pub use naming::*;
pub use subject::*;
