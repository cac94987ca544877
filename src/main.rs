//! tierkit
//!
//! Composes tiered application configuration, loads engine-agnostic form
//! definitions, and resolves view renderers from stored preferences.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde_json::{Value, json};
use std::sync::Arc;
use tierkit::cli::config::{ConfigArgs, ConfigCommand};
use tierkit::cli::form::{FormArgs, FormCommand};
use tierkit::cli::renderer::{RendererArgs, RendererCommand};
use tierkit::cli::status::{StatusArgs, StatusCommand};
use tierkit::cli::{Cli, Command};
use tierkit::config::{
    AppConfig, Settings, SettingsLoader, SettingsPaths, TierDefinitions, TierSet,
    UnconfiguredConfig,
};
use tierkit::error::ErrorReport;
use tierkit::format::{self, OutputFormat};
use tierkit::forms::{FormLoader, create_default_model};
use tierkit::logging;
use tierkit::renderers::{FilePreferenceStore, RendererRegistry, RendererService};
use tierkit::source::open_source;
use tierkit::workflow::StatusSet;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = OutputFormat::from_str(&cli.format).unwrap_or_default();

    if let Err(err) = run(cli, output).await {
        let report = ErrorReport::from_anyhow(&err);
        match output {
            OutputFormat::Json => eprintln!("{}", format::to_json(&report)),
            OutputFormat::Markdown => eprintln!("**{:?}**: {}", report.code, report),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: OutputFormat) -> Result<()> {
    logging::init(cli.verbose, &cli.log)?;

    let loader = match &cli.settings {
        Some(path) => SettingsLoader::load_explicit(SettingsPaths::discover(), path.into())?,
        None => SettingsLoader::load()?,
    };
    for (tier, path) in loader.sources() {
        debug!(tier = ?tier, path = %path.display(), "Settings source");
    }
    let settings = loader.into_settings();

    match cli.command {
        Command::Config(args) => run_config(&settings, args, output).await,
        Command::Form(args) => run_form(&settings, args, output).await,
        Command::Renderer(args) => run_renderer(&settings, args, output).await,
        Command::Status(args) => run_status(&settings, args, output),
    }
}

fn print(output: OutputFormat, json_value: &Value, markdown: impl FnOnce() -> String) {
    match output {
        OutputFormat::Json => println!("{}", format::to_json(json_value)),
        OutputFormat::Markdown => print!("{}", markdown()),
    }
}

/// Compose the tier chain from settings or the embedded definitions.
fn compose_tiers(settings: &Settings) -> Result<TierSet> {
    let definitions = match &settings.tiers.path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read tier definitions {}", path.display()))?;
            TierDefinitions::from_yaml(&content)?
        }
        None => TierDefinitions::embedded()?,
    };
    let tiers = TierSet::compose_all(&definitions, &settings.environment)?;
    debug!(tiers = tiers.len(), "Composed tiers");
    Ok(tiers)
}

async fn bootstrap_config(settings: &Settings, no_overlay: bool) -> Result<AppConfig> {
    let defaults = UnconfiguredConfig::from_tiers(compose_tiers(settings)?)?;
    if no_overlay {
        return Ok(defaults.without_overlay());
    }
    let source = open_source(&settings.overlay.base);
    let config = defaults
        .bootstrap(source.as_ref(), &settings.overlay.url, settings.overlay.required)
        .await?;
    Ok(config)
}

async fn run_config(settings: &Settings, args: ConfigArgs, output: OutputFormat) -> Result<()> {
    let config = bootstrap_config(settings, args.no_overlay).await?;

    match args.command {
        ConfigCommand::Get { path, default } => {
            let value = match default {
                Some(raw) => {
                    // Bare words are accepted as strings.
                    let fallback = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
                    config.get_or(&path, fallback)
                }
                None => config
                    .get(&path)
                    .cloned()
                    .ok_or_else(|| anyhow!("No configuration value at '{}'", path))?,
            };
            print(output, &value, || format::format_value_markdown(&path, &value));
        }
        ConfigCommand::Tiers => {
            let tiers: Vec<Value> = config.tiers().iter().map(|node| node.to_value()).collect();
            print(output, &Value::Array(tiers), || {
                format::format_tiers_markdown(config.tiers())
            });
        }
        ConfigCommand::Dump => {
            let tree = config.tree();
            print(output, tree, || format::format_value_markdown("configuration", tree));
        }
    }
    Ok(())
}

async fn run_form(settings: &Settings, args: FormArgs, output: OutputFormat) -> Result<()> {
    let loader = FormLoader::new(open_source(&settings.forms.base));

    match args.command {
        FormCommand::Show { form_id, mode } => {
            let form = loader.load(&form_id, mode).await?;
            let value = serde_json::to_value(form.as_ref())?;
            print(output, &value, || format::format_form_markdown(&form));
        }
        FormCommand::Render {
            form_id,
            mode,
            engine,
            readonly,
        } => {
            let form = loader.load(&form_id, mode).await?;
            let engine = engine.unwrap_or(settings.forms.engine);
            info!(form = %form.id, engine = %engine, "Rendering form");
            let rendered = engine.adapter().render(&form, readonly);
            let value = json!({ "engine": engine.as_str(), "output": rendered.clone() });
            print(output, &value, || {
                format::format_value_markdown(&format!("{} ({})", form.id, engine), &rendered)
            });
        }
        FormCommand::Model { form_id, mode } => {
            let form = loader.load(&form_id, mode).await?;
            let model = Value::Object(create_default_model(&form));
            print(output, &model, || format::format_value_markdown(&form.id, &model));
        }
    }
    Ok(())
}

async fn run_renderer(settings: &Settings, args: RendererArgs, output: OutputFormat) -> Result<()> {
    let store = Arc::new(FilePreferenceStore::new(&settings.preferences.path));
    let service = RendererService::open(RendererRegistry::with_defaults(), store).await;

    match args.command {
        RendererCommand::List { action } => {
            let renderers = service.renderers_for(action).await;
            let value = serde_json::to_value(&renderers)?;
            print(output, &value, || format::format_renderers_markdown(&renderers));
        }
        RendererCommand::Resolve {
            entity_type,
            action,
        } => {
            let renderer = service
                .resolve(&entity_type, action)
                .await
                .ok_or_else(|| anyhow!("No renderer available for '{}'", action))?;
            let value = serde_json::to_value(&renderer)?;
            print(output, &value, || {
                format::format_renderers_markdown(std::slice::from_ref(&renderer))
            });
        }
        RendererCommand::Set {
            entity_type,
            action,
            renderer_id,
        } => {
            let preference = service
                .set_preference(&entity_type, action, &renderer_id)
                .await?;
            let value = serde_json::to_value(&preference)?;
            print(output, &value, || {
                format!(
                    "Set {} {} to `{}`\n",
                    preference.entity_type, preference.action, preference.renderer_id
                )
            });
        }
        RendererCommand::Clear {
            entity_type,
            action,
        } => {
            let removed = service.clear_preference(&entity_type, action).await?;
            let value = json!({ "removed": removed });
            print(output, &value, || {
                if removed {
                    format!("Cleared {} {}\n", entity_type, action)
                } else {
                    format!("No preference for {} {}\n", entity_type, action)
                }
            });
        }
        RendererCommand::Preferences => {
            let preferences = service.preferences().await;
            let value = serde_json::to_value(&preferences)?;
            print(output, &value, || format::format_value_markdown("preferences", &value));
        }
    }
    Ok(())
}

fn load_statuses(settings: &Settings) -> Result<StatusSet> {
    match &settings.workflow.path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read statuses {}", path.display()))?;
            Ok(StatusSet::from_yaml(&content)?)
        }
        None => Ok(StatusSet::default_spike()),
    }
}

fn run_status(settings: &Settings, args: StatusArgs, output: OutputFormat) -> Result<()> {
    let statuses = load_statuses(settings)?;

    match args.command {
        StatusCommand::List => {
            let value = serde_json::to_value(&statuses.statuses)?;
            print(output, &value, || format::format_statuses_markdown(&statuses));
        }
        StatusCommand::Transitions { status } => {
            let targets = statuses.get_allowed_transitions(&status);
            let value = json!(targets);
            print(output, &value, || {
                format::format_value_markdown(&format!("{} exits", status), &value)
            });
        }
        StatusCommand::Check { from, to } => {
            statuses.check_transition(&from, &to)?;
            let value = json!({ "from": from, "to": to, "allowed": true });
            print(output, &value, || format!("`{}` -> `{}` is allowed\n", from, to));
        }
    }
    Ok(())
}
