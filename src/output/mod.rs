//! Output module for reporting on the indexing store
//!
//! This module handles:
//! - Collecting store statistics and today's quota usage
//! - Rendering them for the terminal

pub mod stats;

pub use stats::{load_statistics, print_statistics, IndexStatistics};
