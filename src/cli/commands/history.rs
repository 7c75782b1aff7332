use colored::Colorize;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::backup_record::STAMP_FORMAT;
use crate::core::traits::history::BackupHistory;

/// Execute the `autobackup history` command.
pub fn execute(ctx: &Context) -> Result<()> {
    let history = ctx.history();
    let records = history.list()?;

    if records.is_empty() {
        output::warning(&format!("No backups found in {}", history.path().display()));
        return Ok(());
    }

    output::header(&format!("Backup history ({})", records.len()));
    for record in &records {
        let stamp = record.timestamp.format(STAMP_FORMAT).to_string();
        output::detail(&format!(
            "{}  {} file(s)  {}  {}",
            stamp.cyan(),
            record.file_count,
            record.source_dir.display(),
            record.encrypted_path.display().to_string().dimmed()
        ));
    }
    Ok(())
}
