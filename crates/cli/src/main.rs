// dora - reconcile versioned administrative-boundary datasets
// Exit codes are documented in exit_codes.rs

mod edit;
mod exit_codes;
mod list;
mod logging;
mod map;
mod project;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use exit_codes::{recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};
use logging::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "dora")]
#[command(about = "Match administrative units between two versions of a boundary dataset")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress the human summary and all logs below error
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate both sets and generate the old-to-new mapping
    #[command(after_help = "\
Examples:
  dora map colombia.dora.toml
  dora map colombia.dora.toml --output mapping.json
  dora map colombia.dora.toml --json > result.json
  dora map colombia.dora.toml --output mapping.json --strict")]
    Map {
        /// Path to the .dora.toml project file
        project: PathBuf,

        /// Write the mapping JSON to this file (stdout otherwise)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the full result (mapping, summary, diagnostics) as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Exit 6 when any unit is left added or removed
        #[arg(long)]
        strict: bool,
    },

    /// Check both sets for missing or duplicate codes, missing names and bad parent codes
    #[command(after_help = "\
Examples:
  dora validate colombia.dora.toml
  dora validate colombia.dora.toml --json")]
    Validate {
        /// Path to the .dora.toml project file
        project: PathBuf,

        /// Output diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Link an old unit to a new unit by hand
    #[command(after_help = "\
Examples:
  dora link mapping.json --level admin1 --from 2 --to 2
  dora link mapping.json --level admin1 --from 2 --to 2 --output edited.json")]
    Link {
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Split a link back into an added and a removed unit
    #[command(after_help = "\
Examples:
  dora unlink mapping.json --level admin1 --from 2 --to 2")]
    Unlink {
        #[command(flatten)]
        edit: EditArgs,
    },

    /// List linked, removed and added units of one level with their names
    #[command(after_help = "\
Examples:
  dora list colombia.dora.toml --mapping mapping.json --level admin1
  dora list colombia.dora.toml --mapping mapping.json --level admin1 --search bogota
  dora list colombia.dora.toml --mapping mapping.json --level admin1 --format csv")]
    List {
        /// Path to the .dora.toml project file
        project: PathBuf,

        /// Mapping JSON written by `dora map`
        #[arg(long)]
        mapping: PathBuf,

        /// Admin level key
        #[arg(long)]
        level: String,

        /// Keep only units whose name contains this text (case-insensitive)
        #[arg(long, default_value = "")]
        search: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = ListFormat::Json)]
        format: ListFormat,
    },

    /// Parse and validate a project file without loading any GeoJSON
    #[command(after_help = "\
Examples:
  dora check colombia.dora.toml")]
    Check {
        /// Path to the .dora.toml project file
        project: PathBuf,
    },
}

#[derive(clap::Args)]
struct EditArgs {
    /// Mapping JSON to edit (rewritten in place unless --output is given)
    mapping: PathBuf,

    /// Admin level key
    #[arg(long)]
    level: String,

    /// Index of the unit in the new collection
    #[arg(long)]
    to: usize,

    /// Index of the unit in the old collection
    #[arg(long)]
    from: usize,

    /// Write the edited mapping here instead of overwriting the input
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Json,
    Csv,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  dora-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose, cli.quiet));
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Map { project, output, json, strict } => {
            map::cmd_map(project, output, json, strict, quiet)
        }
        Commands::Validate { project, json } => map::cmd_validate(project, json, quiet),
        Commands::Link { edit } => edit::cmd_link(
            edit.mapping, &edit.level, edit.to, edit.from, edit.output, quiet,
        ),
        Commands::Unlink { edit } => edit::cmd_unlink(
            edit.mapping, &edit.level, edit.to, edit.from, edit.output, quiet,
        ),
        Commands::List { project, mapping, level, search, format } => {
            list::cmd_list(project, mapping, &level, &search, format)
        }
        Commands::Check { project } => map::cmd_check(project, quiet),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Engine error with the exit code its kind maps to.
    pub fn recon(err: &dora_recon::ReconError) -> Self {
        Self::new(recon_exit_code(err), err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
