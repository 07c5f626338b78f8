//! Form renderer CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use webui_cli::commands::{
    ConfigSource, RenderRequest, run_check_submission, run_count, run_fields, run_levels,
    run_render, write_html,
};
use webui_cli::logging::{LogConfig, LogFormat, init_logging};
use webui_loader::Preset;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, PresetArg};
use crate::summary::{print_fields, print_levels, print_outcome, print_render_report};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = config_source_from_cli(cli).resolve()?;
    match &cli.command {
        Command::Render(args) => {
            let request = RenderRequest {
                level: args.level.clone(),
                no_cache: args.no_cache,
            };
            let result = run_render(&config, &request)?;
            print_render_report(&result);
            match &args.output {
                Some(path) => write_html(path, &result.html)?,
                None => println!("{}", result.html),
            }
            Ok(0)
        }
        Command::Count => {
            println!("{}", run_count(&config)?);
            Ok(0)
        }
        Command::Fields => {
            print_fields(&run_fields(&config)?);
            Ok(0)
        }
        Command::Levels => {
            print_levels(&run_levels(&config)?);
            Ok(0)
        }
        Command::CheckSubmission(args) => {
            let outcome = run_check_submission(&config, &args.file)?;
            print_outcome(&outcome);
            Ok(if outcome.success { 0 } else { 1 })
        }
    }
}

fn config_source_from_cli(cli: &Cli) -> ConfigSource {
    ConfigSource {
        preset: match cli.preset {
            PresetArg::Local => Preset::Local,
            PresetArg::Server => Preset::Server,
        },
        config_file: cli.config_file.clone(),
        model: cli.model.clone(),
        levels: cli.levels.clone(),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
