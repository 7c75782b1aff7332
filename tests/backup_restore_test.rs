use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Run autobackup inside `dir`, which holds its `autobackup.toml`.
fn autobackup(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("autobackup");
    cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("AUTOBACKUP_LOG");
    cmd
}

/// Temp workspace with a config file and a `docs/` tree holding one
/// fresh file and one file last modified ten days ago.
fn workspace(extra_config: &str) -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("autobackup.toml")
        .write_str(&format!("[logging]\nfile = \"logs/test.log\"\n\n{extra_config}"))
        .unwrap();

    dir.child("docs").create_dir_all().unwrap();
    dir.child("docs/recent.txt").write_str("fresh notes").unwrap();
    dir.child("docs/old.txt").write_str("ancient notes").unwrap();
    set_age(&dir.child("docs/old.txt"), Duration::from_secs(10 * 86_400));
    dir
}

fn set_age(path: &Path, age: Duration) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() - age)
        .unwrap();
}

/// First file in `dir` whose name ends with `suffix`.
fn find_with_suffix(dir: &Path, suffix: &str) -> PathBuf {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.to_string_lossy().ends_with(suffix))
        .unwrap_or_else(|| panic!("no *{suffix} in {}", dir.display()))
}

#[test]
fn backup_includes_only_recent_files() {
    let dir = workspace("");

    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backed up 1 file(s)"));

    dir.child("secret.key").assert(predicate::path::is_file());
    let backups = dir.path().join("backups");
    find_with_suffix(&backups, "_backup_hash_manifest.json");
    let artifact = find_with_suffix(&backups, "_backup.tar.zst.enc");

    // Plaintext archive is removed by default.
    let plaintext = artifact.with_extension("");
    assert!(!plaintext.exists());

    autobackup(dir.path())
        .args(["restore", "--file"])
        .arg(&artifact)
        .args(["--dest", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored into"));

    dir.child("out/docs/recent.txt").assert("fresh notes");
    dir.child("out/docs/old.txt").assert(predicate::path::missing());
}

/// All files in `dir` whose names end with `suffix`.
fn all_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().ends_with(suffix))
        .collect()
}

#[test]
fn back_to_back_backups_keep_both_artifacts() {
    let dir = workspace("");
    dir.child("more").create_dir_all().unwrap();
    dir.child("more/other.txt").write_str("other notes").unwrap();

    for target in ["docs", "more"] {
        autobackup(dir.path())
            .args(["backup", "--dir", target])
            .assert()
            .success();
    }

    let backups = dir.path().join("backups");
    assert_eq!(all_with_suffix(&backups, ".enc").len(), 2);
    assert_eq!(all_with_suffix(&backups, "_hash_manifest.json").len(), 2);

    autobackup(dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup history (2)"));
}

#[test]
fn backing_up_the_workspace_skips_own_outputs() {
    let dir = workspace("");

    for _ in 0..2 {
        autobackup(dir.path())
            .args(["backup", "--dir", ".", "--days", "30"])
            .assert()
            .success();
    }

    let manifests = all_with_suffix(&dir.path().join("backups"), "_hash_manifest.json");
    assert_eq!(manifests.len(), 2);
    for manifest in manifests {
        let content = std::fs::read_to_string(&manifest).unwrap();
        assert!(content.contains("recent.txt"), "{content}");
        for own in ["backups", "secret.key", "test.log"] {
            assert!(!content.contains(own), "{own} listed in {}", manifest.display());
        }
    }
}

#[test]
fn old_files_only_means_nothing_to_do() {
    let dir = workspace("");
    set_age(&dir.child("docs/recent.txt"), Duration::from_secs(5 * 86_400));

    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to back up"));

    dir.child("backups").assert(predicate::path::missing());
    dir.child("secret.key").assert(predicate::path::missing());
}

#[test]
fn days_flag_widens_the_window() {
    let dir = workspace("");

    autobackup(dir.path())
        .args(["backup", "--dir", "docs", "--days", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backed up 2 file(s)"));
}

#[test]
fn backup_of_missing_directory_fails() {
    let dir = workspace("");

    autobackup(dir.path())
        .args(["backup", "--dir", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Directory not found"));
}

#[test]
fn validate_reports_clean_then_drift() {
    let dir = workspace("");
    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .success();
    let manifest = find_with_suffix(&dir.path().join("backups"), "_hash_manifest.json");

    autobackup(dir.path())
        .arg("validate")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("All 1 file(s) match"));

    dir.child("docs/recent.txt").write_str("edited").unwrap();

    autobackup(dir.path())
        .arg("validate")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Modified files detected (1)"))
        .stdout(predicate::str::contains("recent.txt"));
}

#[test]
fn validate_missing_manifest_fails() {
    let dir = workspace("");

    autobackup(dir.path())
        .args(["validate", "--manifest", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn restore_without_key_fails() {
    let dir = workspace("");
    dir.child("x_backup.tar.zst.enc").write_binary(b"opaque").unwrap();

    autobackup(dir.path())
        .args(["restore", "--file", "x_backup.tar.zst.enc", "--dest", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Encryption key not found"));

    dir.child("out").assert(predicate::path::missing());
}

#[test]
fn tampered_artifact_is_rejected() {
    let dir = workspace("");
    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .success();
    let artifact = find_with_suffix(&dir.path().join("backups"), ".enc");

    let mut bytes = std::fs::read(&artifact).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x40;
    std::fs::write(&artifact, &bytes).unwrap();

    autobackup(dir.path())
        .args(["restore", "--dest", "out", "--file"])
        .arg(&artifact)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));

    dir.child("out").assert(predicate::path::missing());
}

#[test]
fn push_and_restore_remote_with_local_backend() {
    let dir = workspace("[remote]\nbackend = \"local\"\nbucket = \"offsite\"\nroot = \"remote\"\n");

    autobackup(dir.path())
        .args(["backup", "--dir", "docs", "--push"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pushed"));

    let blob = find_with_suffix(&dir.path().join("remote/offsite"), ".enc");
    let blob_name = blob.file_name().unwrap().to_string_lossy().into_owned();
    std::fs::remove_dir_all(dir.path().join("backups")).unwrap();

    autobackup(dir.path())
        .args(["restore-remote", "--blob", &blob_name, "--dest", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decrypted"));

    dir.child("out/docs/recent.txt").assert("fresh notes");
    dir.child(format!("backups/{blob_name}"))
        .assert(predicate::path::is_file());
}

#[test]
fn push_uploads_latest_artifact() {
    let dir = workspace("[remote]\nbackend = \"local\"\nbucket = \"offsite\"\n");
    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .success();

    autobackup(dir.path())
        .args(["push", "--bucket", "other"])
        .assert()
        .success();

    find_with_suffix(&dir.path().join("remote/other"), "_backup.tar.zst.enc");
}

#[test]
fn push_without_artifacts_fails() {
    let dir = workspace("[remote]\nbackend = \"local\"\nbucket = \"offsite\"\n");

    autobackup(dir.path())
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn history_lists_completed_backups() {
    let dir = workspace("");

    autobackup(dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));

    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .success();

    autobackup(dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup history (1)"))
        .stdout(predicate::str::contains("1 file(s)"));
}

#[test]
fn keep_plaintext_retains_archive() {
    let dir = workspace("[backup]\nkeep_plaintext = true\n");

    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive:"));

    find_with_suffix(&dir.path().join("backups"), "_backup.tar.zst");
}

#[test]
fn global_overrides_relocate_backups_and_key() {
    let dir = workspace("");

    autobackup(dir.path())
        .args(["--backup-dir", "elsewhere", "--key-file", "keys/k.bin"])
        .args(["backup", "--dir", "docs"])
        .assert()
        .success();

    find_with_suffix(&dir.path().join("elsewhere"), ".enc");
    dir.child("keys/k.bin").assert(predicate::path::is_file());
    dir.child("backups").assert(predicate::path::missing());
}

#[test]
fn invalid_config_is_rejected() {
    let dir = workspace("[backup]\nwindow_days = 0\n");

    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_days"));
}

#[test]
fn quiet_mode_prints_nothing_on_success() {
    let dir = workspace("");

    autobackup(dir.path())
        .args(["-q", "backup", "--dir", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn missing_required_arguments_fail() {
    let dir = workspace("");

    autobackup(dir.path()).arg("backup").assert().failure();
    autobackup(dir.path()).arg("restore").assert().failure();
    autobackup(dir.path()).arg("restore-remote").assert().failure();
    autobackup(dir.path()).arg("validate").assert().failure();
}

#[test]
fn log_file_is_written() {
    let dir = workspace("");

    autobackup(dir.path())
        .args(["backup", "--dir", "docs"])
        .assert()
        .success();

    dir.child("logs/test.log")
        .assert(predicate::str::contains("backup completed"));
}
