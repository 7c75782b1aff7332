use std::path::Path;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;

/// Execute the `autobackup restore-remote` command.
///
/// Downloads `blob` into the backup directory, decrypts it and restores it.
pub fn execute(ctx: &Context, blob: &str, dest: &Path, bucket: Option<&str>) -> Result<()> {
    let store = ctx.object_store(bucket)?;
    let service = ctx.restore_service();

    let pb = output::spinner(&format!("Fetching {blob} from {}...", store.describe()));
    let result = service.run_remote_restore(store.as_ref(), blob, dest);
    pb.finish_and_clear();

    let report = result?;
    output::success(&format!("Decrypted {blob}"));
    output::success(&format!("Restored into {}", report.destination.display()));
    Ok(())
}
