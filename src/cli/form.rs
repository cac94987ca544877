//! `form` subcommand.

use crate::forms::{FormEngine, FormMode};
use clap::{Args, Subcommand};

/// Arguments for the form subcommand
#[derive(Args, Debug)]
pub struct FormArgs {
    #[command(subcommand)]
    pub command: FormCommand,
}

#[derive(Subcommand, Debug)]
pub enum FormCommand {
    /// Print the engine-agnostic definition
    Show {
        form_id: String,

        #[arg(short, long, default_value = "edit")]
        mode: FormMode,
    },

    /// Render the definition for a form engine
    Render {
        form_id: String,

        #[arg(short, long, default_value = "edit")]
        mode: FormMode,

        /// Engine to render for (defaults to settings `forms.engine`)
        #[arg(short, long)]
        engine: Option<FormEngine>,

        /// Render every field read-only
        #[arg(long)]
        readonly: bool,
    },

    /// Print the default model of a form
    Model {
        form_id: String,

        #[arg(short, long, default_value = "add")]
        mode: FormMode,
    },
}
