//! Command line argument handling.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modgraph_types::ModuleIdQuery;

/// Command line argument handling for the `modgraph` executable.
#[derive(Debug, Parser)]
#[command(about, author, name = "modgraph", version)]
pub struct Cli {
    /// Log verbosity level.
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Path to the active library root. Overrides `MODGRAPH_LIBRARY_PATH`.
    #[arg(long, global = true, env = "MODGRAPH_LIBRARY_PATH", value_name = "PATH")]
    pub library_path: Option<PathBuf>,

    /// Informational trace level (0..9). Overrides `MODGRAPH_TRACE_LEVEL`.
    #[arg(long, global = true, env = "MODGRAPH_TRACE_LEVEL", value_name = "LEVEL")]
    pub trace_level: Option<u8>,

    /// Suppress the synthetic platform-default dependence. Overrides `MODGRAPH_SUPPRESS_PLATFORM_DEFAULT`.
    #[arg(long, global = true)]
    pub suppress_platform_default: bool,

    /// Available subcommands.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for the `modgraph` executable.
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Resolve root module queries against a library, printing the resulting contexts.
    Resolve {
        /// The root module queries to resolve, e.g. `com.example.app` or `com.example.app@>=1.0`.
        #[arg(value_name = "QUERY", required = true)]
        queries: Vec<ModuleIdQuery>,

        /// An optional repository to fall back to when the library lacks a candidate.
        #[arg(long, value_name = "PATH")]
        repository: Option<PathBuf>,
    },

    /// Print a module file's sections and subsections without installing it.
    Inspect {
        /// Path to the module file.
        #[arg(value_name = "MODULE_FILE")]
        module_file: PathBuf,
    },

    /// Validate every hash in a module file, exiting nonzero on mismatch.
    Verify {
        /// Path to the module file.
        #[arg(value_name = "MODULE_FILE")]
        module_file: PathBuf,
    },

    /// Pack a directory and a module descriptor into a module file.
    Pack {
        /// Directory containing the module's packed payload (`classes.bin`,
        /// `resources/`, `lib/`, `bin/`, `etc/`).
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Path to the module descriptor text file.
        #[arg(value_name = "DESCRIPTOR")]
        descriptor: PathBuf,

        /// Path to write the resulting module file to.
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// List or validate the entries of a repository.
    Catalog {
        /// Path to the repository.
        #[arg(value_name = "REPOSITORY")]
        repository: PathBuf,

        /// Cross-check the catalog against the repository's actual contents instead of listing it.
        #[arg(long)]
        validate: bool,
    },
}
