use std::path::Path;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;

/// Execute the `autobackup restore` command.
pub fn execute(ctx: &Context, file: &Path, dest: &Path) -> Result<()> {
    let service = ctx.restore_service();

    let pb = output::spinner(&format!("Restoring {}...", file.display()));
    let result = service.run_restore(file, dest);
    pb.finish_and_clear();

    let report = result?;
    output::success(&format!("Restored into {}", report.destination.display()));
    output::detail(&format!("From: {}", report.archive.display()));
    Ok(())
}
