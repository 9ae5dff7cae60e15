//! Sync run counters.

/// Counts collected during one sync run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub downloaded: u64,
    /// Existing or duplicate files left alone.
    pub skipped: u64,
    pub ignored: u64,
    pub rejected: u64,
    pub failed: u64,
    pub bytes: u64,
    /// Files that would be downloaded, in dry-run mode.
    pub planned: u64,
}

impl SyncState {
    pub fn record_download(&mut self, bytes: u64) {
        self.downloaded += 1;
        self.bytes += bytes;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}
