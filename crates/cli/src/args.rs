//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vault::LineRange;

/// Run markdown documents through a chat-completion model.
#[derive(Parser, Debug)]
#[command(name = "mdai", version, about, long_about = None)]
pub struct Cli {
    /// Directory that receives generated documents
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub vault: PathBuf,

    /// Settings file (default: <vault>/.mdai/settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Log output format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Print operation reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Complete the whole document and save the answer as a new document
    ExecuteDirective(DocumentArgs),

    /// Complete the document plus one line of input and save the answer
    ExecuteDirectiveWithInput {
        #[command(flatten)]
        target: DocumentArgs,

        /// Input line; prompted for on stdin when omitted
        #[arg(long)]
        input: Option<String>,
    },

    /// Turn the selection (or the document) into a structured directive
    GenerateDirective(DocumentArgs),

    /// Replace the selection with its completion
    CompleteInPlace(DocumentArgs),

    /// Show or edit settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

/// The active document and its selection.
#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Markdown document to operate on
    pub document: Option<PathBuf>,

    /// Selected lines, 1-based and inclusive (e.g. `3-7`)
    #[arg(long, value_name = "A-B", requires = "document")]
    pub lines: Option<LineRange>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current settings with the API key masked
    Show,

    /// Change one setting and save immediately
    ///
    /// For `directive-template`, VALUE is the path of a file holding the template.
    Set {
        /// One of: api-key, model, temperature, directive-template,
        /// api-base-url, request-timeout-secs, duplicate-policy
        key: String,
        value: String,
    },

    /// Restore the built-in directive template
    ResetTemplate,
}
