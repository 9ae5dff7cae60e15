//! Diff a remote listing against the local target directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::drive::DriveFile;
use crate::fs::sanitize_filename;

/// A remote file scheduled for download.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDownload {
    pub file: DriveFile,
    pub dest: PathBuf,
}

/// Why a matching remote file will not be downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The local file already exists.
    Exists,
    /// An earlier remote file has the same name.
    Duplicate,
}

/// What a sync run will do with each remote file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncPlan {
    pub download: Vec<PlannedDownload>,
    pub skipped: Vec<(DriveFile, SkipReason)>,
    /// Names that are unsafe as local file names, with the reason.
    pub rejected: Vec<(DriveFile, String)>,
    /// Wrong extension or Google-native document.
    pub ignored: Vec<DriveFile>,
}

impl SyncPlan {
    pub fn download_bytes(&self) -> u64 {
        self.download.iter().filter_map(|d| d.file.size).sum()
    }
}

/// Whether `name` ends with one of `extensions`.
pub fn matches_extension(name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Decide, for each remote file, whether to download, skip, reject or ignore it.
///
/// Remote order is preserved, so with duplicate names the first listed wins.
pub fn plan_sync(
    remote: Vec<DriveFile>,
    extensions: &[String],
    target_dir: &Path,
    overwrite: bool,
) -> SyncPlan {
    let mut plan = SyncPlan::default();
    let mut seen: HashSet<String> = HashSet::new();

    for file in remote {
        if file.is_google_native() || !matches_extension(&file.name, extensions) {
            plan.ignored.push(file);
            continue;
        }

        let local_name = match sanitize_filename(&file.name) {
            Ok(name) => name,
            Err(e) => {
                plan.rejected.push((file, e.to_string()));
                continue;
            }
        };

        if !seen.insert(local_name.clone()) {
            plan.skipped.push((file, SkipReason::Duplicate));
            continue;
        }

        let dest = target_dir.join(&local_name);
        if dest.exists() && !overwrite {
            plan.skipped.push((file, SkipReason::Exists));
            continue;
        }

        plan.download.push(PlannedDownload { file, dest });
    }

    plan
}
