//! Command line interface for modgraph.

use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};
use modgraph_cli::cli::{Cli, Command};
use modgraph_cli::Error;
use modgraph_config::ModuleSystemConfig;
use simplelog::{Config, SimpleLogger};

mod commands;

use commands::{catalog, inspect, pack, resolve, verify};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if SimpleLogger::init(cli.verbose.log_level_filter(), Config::default()).is_err() {
        debug!("Not initializing another logger, as one is initialized already.");
    }

    let mut config = ModuleSystemConfig::from_env();
    if let Some(library_path) = cli.library_path {
        config = config.with_library_path(library_path);
    }
    if let Some(trace_level) = cli.trace_level {
        config = config.with_trace_level(trace_level);
    }
    if cli.suppress_platform_default {
        config = config.with_suppress_platform_default(true);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result: Result<(), Error> = match cli.command {
        Command::Resolve { queries, repository } => resolve(queries, repository, &config, &mut out),
        Command::Inspect { module_file } => inspect(&module_file, &mut out),
        Command::Verify { module_file } => verify(&module_file, &mut out),
        Command::Pack {
            input_dir,
            descriptor,
            output,
        } => pack(&input_dir, &descriptor, &output),
        Command::Catalog { repository, validate } => catalog(&repository, validate, &mut out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            err.exit_code()
        }
    }
}
