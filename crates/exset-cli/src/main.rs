//! Example set conversion CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use exset_cli::commands::{Target, run_convert, run_decode, run_encode, run_inspect};
use exset_cli::logging::{LogConfig, LogFormat, init_logging};
use exset_text::TextCodecOptions;
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, TargetArg};
use crate::summary::{print_layout, print_table_written, print_text_written, print_written};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Encode(args) => {
            run_encode(&args.input, &args.output).map(|path| print_table_written(&path))
        }
        Command::Decode(args) => {
            let options = TextCodecOptions::new().with_date_time_compat(args.date_time_compat);
            run_decode(&args.input, &args.output, options)
                .map(|(pair, summary)| print_text_written(&pair, &summary))
        }
        Command::Convert(args) => {
            let target = match args.to {
                TargetArg::Table => Target::Table,
                TargetArg::Text => Target::Text,
            };
            let options = TextCodecOptions::new().with_date_time_compat(args.date_time_compat);
            run_convert(
                &args.input,
                &args.output,
                target,
                args.annotations.as_deref(),
                options,
            )
            .map(|written| print_written(&written))
        }
        Command::Inspect(args) => {
            run_inspect(&args.input).map(|layout| print_layout(&args.input, &layout))
        }
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
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
