use std::path::Path;

use crate::cli::commands::push;
use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::backup_record::BackupOutcome;
use crate::core::traits::key_store::KeyStore;

/// Execute the `autobackup backup` command.
///
/// Archives, hashes and encrypts the files under `dir` modified within the
/// recency window, then optionally uploads the encrypted artifact.
pub fn execute(
    ctx: &Context,
    dir: &Path,
    days: Option<u32>,
    push_after: bool,
    bucket: Option<&str>,
) -> Result<()> {
    let service = ctx.backup_service(days)?;
    let window = service.settings.window_days;
    let had_key = service.vault.key_store.exists();

    let pb = output::spinner(&format!("Backing up {}...", dir.display()));
    let outcome = service.run_backup(dir);
    pb.finish_and_clear();

    let record = match outcome? {
        BackupOutcome::NothingToDo => {
            output::warning(&format!(
                "No files modified in the last {window} day(s). Nothing to back up."
            ));
            return Ok(());
        }
        BackupOutcome::Completed(record) => record,
    };

    output::header("autobackup backup");
    output::success(&format!("Backed up {} file(s)", record.file_count));
    output::detail(&format!("Encrypted: {}", record.encrypted_path.display()));
    output::detail(&format!("Manifest:  {}", record.manifest_path.display()));
    if record.plaintext_retained {
        output::detail(&format!("Archive:   {}", record.archive_path.display()));
    }
    if !had_key {
        output::warning(&format!(
            "Created a new encryption key at {}. Keep a copy somewhere safe: \
             backups cannot be restored without it.",
            service.vault.key_store.location().display()
        ));
    }

    if push_after {
        let store = ctx.object_store(bucket)?;
        push::upload(&service, store.as_ref(), &record.encrypted_path)?;
    }
    Ok(())
}
