use std::path::Path;

use crate::cli::output;
use crate::core::errors::{BackupError, Result};
use crate::core::services::manifest_service::ManifestService;

/// Execute the `autobackup validate` command.
///
/// Re-hashes every file listed in the manifest. Any drift is listed and
/// turns into a non-zero exit.
pub fn execute(manifest: &Path) -> Result<()> {
    let pb = output::spinner("Validating file integrity...");
    let result = ManifestService.verify(manifest);
    pb.finish_and_clear();
    let report = result?;

    output::header("autobackup validate");
    if report.is_clean() {
        output::success(&format!(
            "All {} file(s) match their recorded hash",
            report.checked
        ));
        return Ok(());
    }

    output::warning(&format!("Modified files detected ({}):", report.changed.len()));
    for path in &report.changed {
        output::detail(&format!("• {}", path.display()));
    }
    Err(BackupError::IntegrityDrift {
        count: report.changed.len(),
    })
}
