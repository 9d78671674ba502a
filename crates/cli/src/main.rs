// keepsake: inspect and edit preference files, save and restore layouts

mod exit_codes;
mod layout;
mod prefs;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use keepsake_config::{DataFolder, PrefsError, GENERAL_PREFERENCES};
use keepsake_layout::LayoutError;

use exit_codes::*;

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(about = "Layered preference files and persisted UI layout")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Application name; selects the folder under the data directory
    #[arg(long, global = true, default_value = "keepsake")]
    app: String,

    /// Use this directory instead of the per-user application data folder
    #[arg(long, global = true, env = "KEEPSAKE_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Preference file inside the data folder
    #[arg(long, global = true, default_value = GENERAL_PREFERENCES, value_name = "NAME")]
    file: String,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one value
    #[command(after_help = "\
Examples:
  keepsake get theme
  keepsake get mainWindow.width --file WindowSizePreferences.xml

Exits 5 if no layer defines the key.")]
    Get {
        key: String,
    },

    /// Set one value and save
    Set {
        key: String,
        value: String,
    },

    /// List keys and values, sorted by key
    List {
        /// Only keys starting with this
        #[arg(long)]
        prefix: Option<String>,

        /// Print a JSON object instead of key=value lines
        #[arg(long)]
        json: bool,
    },

    /// Print the merged entries as a properties document
    Dump,

    /// Delete the user preference file
    Reset,

    /// Save or restore layout state for a JSON window description
    #[command(subcommand)]
    Layout(LayoutCommands),
}

#[derive(Subcommand)]
enum LayoutCommands {
    /// Store geometry, dividers and column widths from a window description
    #[command(after_help = "\
The window description is JSON:
  { \"x\": 40.0, \"y\": 30.0, \"width\": 800.0, \"height\": 600.0,
    \"root\": { \"type\": \"split\", \"id\": \"leftRight\", \"dividers\": [0.3],
              \"children\": [ { \"type\": \"leaf\" }, { \"type\": \"leaf\" } ] } }

State is written to WindowSizePreferences.xml under <PREFIX>.")]
    Save {
        /// Window description (JSON)
        #[arg(long, value_name = "FILE")]
        tree: PathBuf,

        /// Key namespace, one per window
        #[arg(long)]
        prefix: String,
    },

    /// Print the window description with saved state applied
    Restore {
        #[arg(long, value_name = "FILE")]
        tree: PathBuf,

        #[arg(long)]
        prefix: String,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("KEEPSAKE_COMMIT"),
        ")",
        "\ntarget:  ",
        env!("KEEPSAKE_TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let folder = match &cli.data_dir {
        Some(dir) => DataFolder::with_root(&cli.app, dir),
        None => DataFolder::new(&cli.app),
    };
    log::debug!("data folder: {}", folder.application_data_folder().display());

    let result = match cli.command {
        Commands::Get { key } => prefs::cmd_get(&folder, &cli.file, &key),
        Commands::Set { key, value } => prefs::cmd_set(&folder, &cli.file, &key, &value),
        Commands::List { prefix, json } => {
            prefs::cmd_list(&folder, &cli.file, prefix.as_deref(), json)
        }
        Commands::Dump => prefs::cmd_dump(&folder, &cli.file),
        Commands::Reset => prefs::cmd_reset(&folder, &cli.file),
        Commands::Layout(LayoutCommands::Save { tree, prefix }) => {
            layout::cmd_save(&folder, &tree, &prefix)
        }
        Commands::Layout(LayoutCommands::Restore { tree, prefix }) => {
            layout::cmd_restore(&folder, &tree, &prefix)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message }) => {
            if !message.is_empty() {
                eprintln!("error: {message}");
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into() }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self { code: EXIT_MALFORMED, message: msg.into() }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { code: EXIT_KEY_NOT_FOUND, message: msg.into() }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into() }
    }
}

impl From<PrefsError> for CliError {
    fn from(err: PrefsError) -> Self {
        match err {
            PrefsError::InvalidParameter(_) => Self::usage(err.to_string()),
            PrefsError::Io { .. } => Self::io(err.to_string()),
            PrefsError::Xml { .. } | PrefsError::Parse { .. } => Self::malformed(err.to_string()),
        }
    }
}

impl From<LayoutError> for CliError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Prefs(inner) => inner.into(),
            other => Self::malformed(other.to_string()),
        }
    }
}
