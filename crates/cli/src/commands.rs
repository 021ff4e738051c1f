//! Command dispatch.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use llm::OpenAiChatClient;
use operations::{DirectiveRunner, OperationOutcome, OperationReport};
use pipeline::templates::DIRECTIVE_GENERATOR;
use pipeline::{ApiKey, Configuration, EditorSurface, SettingsUpdate};
use vault::{FileEditor, FsDocumentStore, SettingsStore};

use crate::args::{Cli, Command, ConfigCommand, DocumentArgs};
use crate::prompt::{FixedInput, StdinPrompt};

enum Operation {
    Execute,
    ExecuteWithInput(Option<String>),
    Generate,
    CompleteInPlace,
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = SettingsStore::new(
        cli.settings
            .clone()
            .unwrap_or_else(|| SettingsStore::default_path(&cli.vault)),
    );
    let (operation, target) = match cli.command {
        Command::Config { action } => {
            let config = settings.load_for_edit().await?;
            configure(&settings, &config, action).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::ExecuteDirective(target) => (Operation::Execute, target),
        Command::ExecuteDirectiveWithInput { target, input } => {
            (Operation::ExecuteWithInput(input), target)
        }
        Command::GenerateDirective(target) => (Operation::Generate, target),
        Command::CompleteInPlace(target) => (Operation::CompleteInPlace, target),
    };

    let config = settings
        .load()
        .await
        .context("fix the file or run `mdai config set <key> <value>`")?;
    let stdin = StdinPrompt::new();
    let editor = open_document(&target).await?;
    let editor = editor.as_ref().map(|e| e as &dyn EditorSurface);

    let interactive = std::io::stdin().is_terminal();
    let config = ensure_api_key(&settings, config, &stdin, interactive).await?;
    let runner = DirectiveRunner::new(
        Arc::new(OpenAiChatClient::from_configuration(&config)?),
        Arc::new(FsDocumentStore::new(&cli.vault)),
    );

    let report = match operation {
        Operation::Execute => runner.execute_directive(&config, editor).await,
        Operation::ExecuteWithInput(Some(text)) => {
            runner
                .execute_with_input(&config, editor, &FixedInput(text))
                .await
        }
        Operation::ExecuteWithInput(None) => {
            runner.execute_with_input(&config, editor, &stdin).await
        }
        Operation::Generate => runner.generate_directive(&config, editor).await,
        Operation::CompleteInPlace => runner.complete_in_place(&config, editor).await,
    };

    print_report(&report, &cli.vault, target.document.as_deref(), cli.json)?;
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn open_document(target: &DocumentArgs) -> anyhow::Result<Option<FileEditor>> {
    let Some(path) = &target.document else {
        return Ok(None);
    };
    let editor = FileEditor::open(path, target.lines)
        .await
        .with_context(|| format!("could not open {}", path.display()))?;
    Ok(Some(editor))
}

/// Asks for the API key on the terminal when none is stored, and saves it.
///
/// Only asks when stdin is interactive; piped stdin belongs to the input
/// prompt. Declining or not asking leaves the key empty, and the completion
/// call then fails with an authentication error.
async fn ensure_api_key(
    settings: &SettingsStore,
    config: Configuration,
    stdin: &StdinPrompt,
    interactive: bool,
) -> anyhow::Result<Configuration> {
    if !config.api_key.is_empty() {
        return Ok(config);
    }
    if !interactive {
        tracing::warn!("no API key configured and stdin is not a terminal; not prompting");
        return Ok(config);
    }
    let Some(line) = stdin.read_line("API key").await? else {
        return Ok(config);
    };
    let key = ApiKey::new(line);
    if key.is_empty() {
        return Ok(config);
    }
    let updated = settings.update(&config, SettingsUpdate::ApiKey(key)).await?;
    tracing::info!(path = %settings.path().display(), "API key saved");
    Ok(updated)
}

fn print_report(
    report: &OperationReport,
    vault: &Path,
    document: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    match &report.outcome {
        OperationOutcome::Persisted { document: name, .. } => {
            println!("Created {}", vault.join(name.as_str()).display());
        }
        OperationOutcome::Reused { document: name, .. } => {
            println!("Already present: {}", vault.join(name.as_str()).display());
        }
        OperationOutcome::Replaced { replacement_chars } => {
            let path = document.map(PathBuf::from).unwrap_or_default();
            println!(
                "Replaced selection in {} ({replacement_chars} chars)",
                path.display()
            );
        }
        OperationOutcome::Aborted { at, error } => {
            eprintln!("{} aborted while {at}: {error}", report.kind.command_name());
        }
    }
    Ok(())
}

async fn configure(
    settings: &SettingsStore,
    config: &Configuration,
    action: ConfigCommand,
) -> anyhow::Result<()> {
    let update = match action {
        ConfigCommand::Show => {
            print!("{}", render_settings(config, settings.path()));
            return Ok(());
        }
        ConfigCommand::ResetTemplate => SettingsUpdate::ResetDirectiveTemplate,
        ConfigCommand::Set { key, value } if key == "directive-template" => {
            let template = tokio::fs::read_to_string(&value)
                .await
                .with_context(|| format!("could not read template file {value}"))?;
            SettingsUpdate::DirectiveTemplate(template)
        }
        ConfigCommand::Set { key, value } => SettingsUpdate::parse(&key, &value)?,
    };
    let key = update.key();
    settings.update(config, update).await?;
    println!("Updated {key} in {}", settings.path().display());
    Ok(())
}

fn render_settings(config: &Configuration, path: &Path) -> String {
    let template = if config.directive_generator_template == DIRECTIVE_GENERATOR {
        "built-in".to_string()
    } else {
        format!("custom, {} chars", config.directive_generator_template.chars().count())
    };
    format!(
        "settings:             {}\n\
         api-key:              {}\n\
         model:                {}\n\
         temperature:          {}\n\
         api-base-url:         {}\n\
         request-timeout-secs: {}\n\
         duplicate-policy:     {}\n\
         directive-template:   {template}\n",
        path.display(),
        config.api_key.masked(),
        config.model,
        config.temperature,
        config.api_base_url,
        config.request_timeout_secs,
        config.duplicate_policy,
    )
}
