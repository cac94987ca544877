//! CLI command definitions for tierkit
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod config;
pub mod form;
pub mod renderer;
pub mod status;

use clap::{Parser, Subcommand};
use config::ConfigArgs;
use form::FormArgs;
use renderer::RendererArgs;
use status::StatusArgs;

/// Tiered configuration, form definitions and view preferences
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to settings file (overrides discovered settings)
    #[arg(short, long, global = true)]
    pub settings: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format: json (default) or markdown
    #[arg(short, long, default_value = "json", global = true)]
    pub format: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the composed application configuration
    Config(ConfigArgs),

    /// Load and render form definitions
    Form(FormArgs),

    /// List renderers and manage view preferences
    Renderer(RendererArgs),

    /// Inspect the status workflow
    Status(StatusArgs),
}
