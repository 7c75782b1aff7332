mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use crate::cli::context::Context;
use crate::cli::{Cli, Commands};
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;

fn main() {
    let args = Cli::parse();
    cli::output::set_quiet(args.quiet);

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "command failed");
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

fn run(args: &Cli) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;

    if let Err(e) = config::logging::init_file_logging(&config.logging, args.verbose) {
        cli::output::warning(&format!(
            "File logging disabled ({}): {e}",
            config.logging.file.display()
        ));
    }

    let ctx = Context::new(config, args.backup_dir.clone(), args.key_file.clone());

    match &args.command {
        Commands::Backup {
            dir,
            days,
            push,
            bucket,
        } => cli::commands::backup::execute(&ctx, dir, *days, *push, bucket.as_deref()),
        Commands::Push { bucket } => cli::commands::push::execute(&ctx, bucket.as_deref()),
        Commands::Restore { file, dest } => cli::commands::restore::execute(&ctx, file, dest),
        Commands::RestoreRemote { blob, dest, bucket } => {
            cli::commands::restore_remote::execute(&ctx, blob, dest, bucket.as_deref())
        }
        Commands::History => cli::commands::history::execute(&ctx),
        Commands::Validate { manifest } => cli::commands::validate::execute(manifest),
    }
}
