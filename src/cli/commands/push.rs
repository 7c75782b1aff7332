use std::path::Path;

use crate::cli::context::{Context, DefaultBackupService};
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::traits::object_store::ObjectStore;

/// Execute the `autobackup push` command.
///
/// Uploads the most recently modified encrypted artifact.
pub fn execute(ctx: &Context, bucket: Option<&str>) -> Result<()> {
    let service = ctx.backup_service(None)?;
    let latest = service.latest_artifact()?;
    let store = ctx.object_store(bucket)?;
    upload(&service, store.as_ref(), &latest)
}

pub(crate) fn upload(
    service: &DefaultBackupService,
    store: &dyn ObjectStore,
    artifact: &Path,
) -> Result<()> {
    let pb = output::spinner(&format!("Uploading {}...", artifact.display()));
    let result = service.push_artifact(store, artifact);
    pb.finish_and_clear();

    let object = result?;
    output::success(&format!("Pushed {object} to {}", store.describe()));
    Ok(())
}
