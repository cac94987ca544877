//! tierkit library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod forms;
pub mod logging;
pub mod renderers;
pub mod source;
pub mod workflow;
