use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const VAULT_ENV: &str = "ONEPASS_VAULT";

#[derive(Parser)]
#[command(
    name = "1pass",
    version,
    about = "Command-line client for Agile Keychain password vaults"
)]
pub struct Cli {
    /// Path to the .agilekeychain vault directory.
    #[arg(long, global = true, env = VAULT_ENV)]
    pub vault: Option<PathBuf>,

    /// Unlock in-process instead of delegating to the key agent.
    #[arg(long, global = true)]
    pub no_agent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new vault.
    New {
        /// Where to create the vault; must end in .agilekeychain.
        path: PathBuf,

        /// PBKDF2 iteration count for the master password.
        #[arg(long)]
        iterations: Option<u32>,

        /// Password hint recorded next to the vault.
        #[arg(long)]
        hint: Option<String>,
    },

    /// List items, optionally filtered by a pattern.
    List {
        pattern: Option<String>,
    },

    /// Decrypt and display the items matching a pattern.
    Show {
        pattern: String,
    },

    /// Decrypt matching items and print their raw content JSON.
    ShowJson {
        pattern: String,
    },

    /// Add a new item of the given type (login, note, card, ...).
    Add {
        /// Item type alias; see `1pass types`.
        item_type: String,
        title: String,
    },

    /// List the known item types and their aliases.
    Types,

    /// Remove matching items, leaving tombstones behind.
    Remove {
        pattern: String,

        /// Skip the per-item confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Move matching items to the trash.
    Trash {
        pattern: String,
    },

    /// Bring matching items back from the trash.
    Restore {
        pattern: String,
    },

    /// Rename a single item.
    Rename {
        pattern: String,
        new_title: String,
    },

    /// Add a tag to matching items.
    Tag {
        pattern: String,
        tag: String,
    },

    /// Remove a tag from matching items.
    Untag {
        pattern: String,
        tag: String,
    },

    /// List all tags in use.
    Tags,

    /// Move a single item into a folder, or out of its folder.
    Move {
        pattern: String,

        /// Folder title or UUID; omit to clear the folder.
        folder: Option<String>,
    },

    /// List folders.
    Folders,

    /// Print the value of one field of a single item.
    Field {
        pattern: String,
        field: String,
    },

    /// Export items to an unencrypted .1pif bundle.
    Export {
        /// Destination directory; must end in .1pif.
        path: PathBuf,

        /// Only export items matching this pattern.
        pattern: Option<String>,
    },

    /// Import items from a .1pif bundle or data file.
    Import {
        path: PathBuf,
    },

    /// Generate a random form-friendly password.
    GenPassword {
        #[arg(default_value_t = 12)]
        length: usize,
    },

    /// Change the vault's master password.
    SetPassword,

    /// Show the vault's password hint.
    Hint,

    /// Record a password hint for the vault.
    SetHint {
        hint: String,
    },

    /// Drop this vault's keys from the key agent.
    Lock,

    /// Run the key agent in the foreground (started on demand).
    #[command(hide = true)]
    Agent,
}
