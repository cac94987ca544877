//! `config` subcommand.

use clap::{Args, Subcommand};

/// Arguments for the config subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Skip fetching the overlay document
    #[arg(long, global = true)]
    pub no_overlay: bool,

    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Read one dotted path, e.g. `constants.apis.spike`
    Get {
        path: String,

        /// JSON value printed when the path does not resolve
        #[arg(long)]
        default: Option<String>,
    },

    /// List the composed tiers
    Tiers,

    /// Print the whole configuration tree
    Dump,
}
