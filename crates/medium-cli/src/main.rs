mod runtime;
mod store;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::Parser;
use medium_common::config::FileStore;
use medium_common::telemetry::{self, TelemetryConfig};
use medium_common::{Config, MediumError};
use medium_core::schema::parse_semantics;
use medium_core::{
    Container, DialogOutcome, EditableMedium, Extras, FieldValue, MediumEnv, OptionField,
    PersistedState, QuestionContract,
};
use miette::{IntoDiagnostic, Result, miette};
use serde_json::{Value, json};

use crate::runtime::RecordingRuntime;
use crate::store::DirStore;

#[derive(Parser)]
#[command(version, about = "Apply view-field edits to an editable medium and print the result", long_about = None)]
struct Cli {
    /// Author parameters (JSON)
    params: PathBuf,

    /// Field schema (JSON); overrides `semanticsPath` from the config
    #[arg(long)]
    semantics: Option<PathBuf>,

    /// Host configuration (.json or .toml)
    #[arg(long, env = "MEDIUM_CONFIG")]
    config: Option<PathBuf>,

    /// Previously persisted state (JSON)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Language for the dialog schema
    #[arg(long)]
    language: Option<String>,

    /// Save as the authoring tool would
    #[arg(long)]
    author: bool,

    /// Title shown instead of the generated description
    #[arg(long)]
    title: Option<String>,

    /// Dialog edit, e.g. `--set sourceURL=example.com/a.png`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_edit)]
    edits: Vec<(String, String)>,

    /// Write the effective configuration here
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Log everything down to trace level
    #[arg(short, long)]
    verbose: bool,
}

fn parse_edit(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_owned(), value.to_owned()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))
}

/// `true`/`false` toggle checkboxes; everything else is typed text.
fn edit_value(raw: &str) -> FieldValue {
    match raw {
        "true" => FieldValue::Bool(true),
        "false" => FieldValue::Bool(false),
        text => FieldValue::text(text),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_miette();
    let cli = Cli::parse();

    let mut telemetry_config = TelemetryConfig::from_env("medium-cli");
    if cli.verbose {
        telemetry_config = telemetry_config.with_level(tracing::Level::TRACE);
    }
    telemetry::init(telemetry_config);

    let mut config = match &cli.config {
        Some(path) => Config::load(&FileStore::new(path)).await?,
        None => Config::default(),
    };
    if let Some(language) = &cli.language {
        config.language = language.clone();
    }
    config.author_mode |= cli.author;
    if let Some(path) = &cli.semantics {
        config.semantics_path = Some(path.clone());
    }

    let semantics_path = config
        .semantics_path
        .clone()
        .ok_or_else(|| miette!("no field schema: pass --semantics or set semanticsPath"))?;
    let semantics = parse_semantics(read_json(&semantics_path)?).map_err(MediumError::from)?;
    let params = read_json(&cli.params)?;
    let previous_state = match &cli.state {
        Some(path) => Some(PersistedState::from_json(&read_json(path)?)?),
        None => None,
    };

    let runtime = Rc::new(RecordingRuntime::default());
    let extras = Extras {
        previous_state,
        metadata_title: cli.title.clone(),
        library: None,
        author_mode: config.author_mode,
    };
    let mut medium = EditableMedium::new(
        params,
        semantics,
        config.content_id.clone(),
        extras,
        MediumEnv::new(runtime.clone()),
    )?;

    if let Some(dir) = &config.language_dir {
        if !medium.localize(&DirStore::new(dir), &config.language).await {
            tracing::warn!(language = %config.language, "keeping the untranslated schema");
        }
    }

    let mut wrapper = Container::new(format!("h5p-content-{}", config.content_id));
    medium.attach(&mut wrapper);

    if !cli.edits.is_empty() {
        apply_edits(&mut medium, &cli.edits)?;
    }

    let report = json!({
        "title": medium.title(),
        "summary": medium.summary(),
        "answerGiven": medium.answer_given(),
        "instantiations": runtime.instantiations(),
        "content": medium.adapter().content(),
        "state": medium.current_state().map(|state| state.to_json()),
    });
    println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);

    if let Some(path) = &cli.save_config {
        config.save(&FileStore::new(path)).await?;
        tracing::info!(path = %path.display(), "configuration written");
    }

    Ok(())
}

/// Type every edit into the dialog, then save it.
fn apply_edits(
    medium: &mut EditableMedium<RecordingRuntime>,
    edits: &[(String, String)],
) -> Result<()> {
    medium.open_dialog(None);

    for (name, raw) in edits {
        let field = medium
            .dialog_mut()
            .field_mut(name)
            .ok_or_else(|| miette!("the dialog has no field named `{name}`"))?;
        field.input(edit_value(raw));
        field.blur();
    }

    match medium.save_dialog() {
        DialogOutcome::Saved(entries) => {
            tracing::info!(fields = entries.len(), "saved");
            Ok(())
        }
        DialogOutcome::Blocked => {
            let problems: Vec<String> = medium
                .dialog()
                .fields()
                .iter()
                .filter(|field| field.view().has_error)
                .map(|field| match field.view().error_message.as_str() {
                    "" => field.name().to_owned(),
                    message => format!("{}: {message}", field.name()),
                })
                .collect();
            medium.cancel_dialog();
            Err(miette!("save rejected: {}", problems.join("; ")))
        }
        DialogOutcome::Canceled | DialogOutcome::Ignored => Ok(()),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .map_err(MediumError::from)
        .map_err(|e| miette!("{}: {e}", path.display()))?;
    Ok(serde_json::from_str(&text).map_err(MediumError::from)?)
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
