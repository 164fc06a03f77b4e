use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// "0.3.2" for release builds, "0.3.2@abc1234" otherwise.
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const BUILD: &str = env!("SAVEKEEP_BUILD");
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if BUILD.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, BUILD)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "savekeep", version = version())]
#[command(about = "Named saves, rotating quick saves and portable bundles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Title the saves belong to (defaults to the state file's name)
    #[arg(short, long, global = true)]
    pub title: Option<String>,

    /// JSON file holding the application's current state
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Directory for saves and settings
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save the current state under a name
    #[command(alias = "s")]
    Save {
        /// Name of the save (defaults to "Save N")
        name: Option<String>,
    },

    /// Save into the next rotating quick slot
    #[command(alias = "q")]
    Quick,

    /// Load the most recent quick save
    #[command(alias = "ql")]
    QuickLoad,

    /// List saves, newest first
    #[command(alias = "ls")]
    List,

    /// Restore a save
    #[command(alias = "l")]
    Load {
        /// Index from the listing (1 = newest) or save id
        save: String,
    },

    /// Rename a save
    Rename {
        /// Index from the listing or save id
        save: String,

        /// New name
        name: String,
    },

    /// Delete one or more saves
    #[command(alias = "rm")]
    Delete {
        /// Indexes or ids (e.g. 1 3 5)
        #[arg(required = true, num_args = 1..)]
        saves: Vec<String>,
    },

    /// Export saves to a bundle file
    Export {
        /// Indexes or ids to export (all saves when omitted)
        saves: Vec<String>,

        /// Export a snapshot of the current state instead of stored saves
        #[arg(long, conflicts_with = "saves")]
        current: bool,

        /// Output file ("-" for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import saves from a bundle file
    Import {
        /// Bundle file ("-" for stdin)
        file: PathBuf,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g. compression, position, buttons.quick-save)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
