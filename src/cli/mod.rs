pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Back up recently changed files as encrypted, integrity-checked archives.
#[derive(Parser, Debug)]
#[command(name = "autobackup", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a config file (default: ./autobackup.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the backup directory
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Override the key file
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Archive, hash and encrypt recently modified files
    Backup {
        /// Directory to back up
        #[arg(long)]
        dir: PathBuf,
        /// Only include files modified within this many days
        #[arg(long)]
        days: Option<u32>,
        /// Upload the encrypted artifact after a successful backup
        #[arg(long)]
        push: bool,
        /// Bucket for --push (default: remote.bucket)
        #[arg(long, requires = "push")]
        bucket: Option<String>,
    },

    /// Upload the latest encrypted backup
    Push {
        /// Bucket name (default: remote.bucket)
        #[arg(long)]
        bucket: Option<String>,
    },

    /// Restore a local backup (.tar.zst or .tar.zst.enc)
    Restore {
        /// Backup file to restore
        #[arg(long)]
        file: PathBuf,
        /// Destination directory
        #[arg(long, default_value = "restored")]
        dest: PathBuf,
    },

    /// Download, decrypt and restore a remote backup
    RestoreRemote {
        /// Object name in the bucket
        #[arg(long)]
        blob: String,
        /// Destination directory
        #[arg(long, default_value = "restored")]
        dest: PathBuf,
        /// Bucket name (default: remote.bucket)
        #[arg(long)]
        bucket: Option<String>,
    },

    /// List completed backups
    History,

    /// Re-hash files listed in a manifest and report changes
    Validate {
        /// Path to a *_hash_manifest.json file
        #[arg(long)]
        manifest: PathBuf,
    },
}
