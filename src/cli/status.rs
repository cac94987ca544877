//! `status` subcommand.

use clap::{Args, Subcommand};

/// Arguments for the status subcommand
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(subcommand)]
    pub command: StatusCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatusCommand {
    /// List every status
    List,

    /// Legal targets from a status
    Transitions { status: String },

    /// Check whether a transition is allowed
    Check { from: String, to: String },
}
