//! `renderer` subcommand.

use crate::renderers::RendererAction;
use clap::{Args, Subcommand};

/// Arguments for the renderer subcommand
#[derive(Args, Debug)]
pub struct RendererArgs {
    #[command(subcommand)]
    pub command: RendererCommand,
}

#[derive(Subcommand, Debug)]
pub enum RendererCommand {
    /// List registered renderers
    List {
        /// Only renderers usable for this action
        #[arg(short, long)]
        action: Option<RendererAction>,
    },

    /// Show the renderer used for an entity type and action
    Resolve {
        entity_type: String,
        action: RendererAction,
    },

    /// Store a preference (`*` as entity type applies to all entities)
    Set {
        entity_type: String,
        action: RendererAction,
        renderer_id: String,
    },

    /// Remove a stored preference
    Clear {
        entity_type: String,
        action: RendererAction,
    },

    /// List stored preferences
    Preferences,
}
