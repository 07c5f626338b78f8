//! CLI argument definitions for the form renderer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "webui",
    version,
    about = "Render access-level gated parameter forms",
    long_about = "Render a form description (model.json) into HTML markup.\n\n\
                  Components are shown or hidden depending on the selected access\n\
                  level from accesslevels.json. Posted form data can be checked\n\
                  against the current model version."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration preset to start from.
    #[arg(long = "config", value_enum, default_value = "local", global = true)]
    pub preset: PresetArg,

    /// TOML file overriding preset values.
    #[arg(long = "config-file", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    /// Form description file (overrides the configuration).
    #[arg(long = "model", value_name = "PATH", global = true)]
    pub model: Option<PathBuf>,

    /// Access level file (overrides the configuration).
    #[arg(long = "levels", value_name = "PATH", global = true)]
    pub levels: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render the form to HTML.
    Render(RenderArgs),

    /// Print the number of components in the model.
    Count,

    /// List every rendered field with its datatype and default.
    Fields,

    /// List the access levels.
    Levels,

    /// Check posted form data (JSON) against the current model.
    CheckSubmission(CheckSubmissionArgs),
}

#[derive(Parser)]
pub struct RenderArgs {
    /// Apply this access level to the markup.
    ///
    /// Without a level the markup is level neutral: every component is
    /// present and carries `level-<name>` classes for the page to toggle.
    #[arg(long = "level", value_name = "LEVEL")]
    pub level: Option<String>,

    /// Write HTML to this file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Ignore and do not update the markup cache.
    #[arg(long = "no-cache")]
    pub no_cache: bool,
}

#[derive(Parser)]
pub struct CheckSubmissionArgs {
    /// File holding the posted JSON.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Local,
    Server,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
