//! MDAI CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse arguments**: [`args::Cli`] selects the vault, the settings file,
//!    the log format, and the command.
//! 2. **Wire observability**: [`observability::init`] installs
//!    `tracing-subscriber` (human or JSON) and, when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OpenTelemetry OTLP exporter.
//! 3. **Load configuration**: the settings blob is read once per invocation;
//!    the resulting snapshot is passed to the operation.
//! 4. **Construct infrastructure**: `OpenAiChatClient`, `FsDocumentStore`, and a
//!    `FileEditor` for the document argument are injected into the
//!    `DirectiveRunner`.
//!
//! The process exits non-zero when an operation ends in the aborted state.

use std::process::ExitCode;

use clap::Parser;

mod args;
mod commands;
mod observability;
mod prompt;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = args::Cli::parse();
    let telemetry = observability::init(cli.log_format)?;

    let result = commands::dispatch(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }

    telemetry.shutdown();
    result
}
