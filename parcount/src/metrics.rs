use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Tracks chunk dispatch, buffer memory and input loading for a run.
///
/// Workers record through a shared `&SearchMetrics`; every counter is atomic.
#[derive(Debug)]
pub struct SearchMetrics {
    // Dispatch metrics
    chunks_dispatched: AtomicU64,
    chunks_skipped: AtomicU64,
    bytes_scanned: AtomicU64,
    matches_found: AtomicU64,

    // Owned chunk buffers
    live_allocated: AtomicU64,
    peak_allocated: AtomicU64,
    total_allocated: AtomicU64,

    // Input loading
    files_read: AtomicU64,
    files_mapped: AtomicU64,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self {
            chunks_dispatched: AtomicU64::new(0),
            chunks_skipped: AtomicU64::new(0),
            bytes_scanned: AtomicU64::new(0),
            matches_found: AtomicU64::new(0),
            live_allocated: AtomicU64::new(0),
            peak_allocated: AtomicU64::new(0),
            total_allocated: AtomicU64::new(0),
            files_read: AtomicU64::new(0),
            files_mapped: AtomicU64::new(0),
        }
    }

    /// Records a searched chunk
    pub fn record_chunk(&self, bytes: u64, matches: u64) {
        self.chunks_dispatched.fetch_add(1, Ordering::Relaxed);
        self.bytes_scanned.fetch_add(bytes, Ordering::Relaxed);
        self.matches_found.fetch_add(matches, Ordering::Relaxed);
    }

    /// Records an empty chunk that was never dispatched
    pub fn record_skipped_chunk(&self) {
        self.chunks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an owned chunk buffer allocation
    pub fn record_allocation(&self, bytes: u64) {
        self.total_allocated.fetch_add(bytes, Ordering::Relaxed);
        let live = self.live_allocated.fetch_add(bytes, Ordering::Relaxed) + bytes;
        let mut peak = self.peak_allocated.load(Ordering::Relaxed);
        while live > peak {
            match self.peak_allocated.compare_exchange_weak(
                peak,
                live,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => peak = current,
            }
        }
        debug!("Chunk buffer allocated: {} bytes, live: {} bytes", bytes, live);
    }

    /// Records release of an owned chunk buffer
    pub fn record_deallocation(&self, bytes: u64) {
        let live = self.live_allocated.fetch_sub(bytes, Ordering::Relaxed) - bytes;
        debug!("Chunk buffer released: {} bytes, live: {} bytes", bytes, live);
    }

    /// Records a successfully loaded input file
    pub fn record_file_load(&self, mapped: bool) {
        if mapped {
            self.files_mapped.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files_read.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> SearchStats {
        SearchStats {
            chunks_dispatched: self.chunks_dispatched.load(Ordering::Relaxed),
            chunks_skipped: self.chunks_skipped.load(Ordering::Relaxed),
            bytes_scanned: self.bytes_scanned.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
            live_allocated: self.live_allocated.load(Ordering::Relaxed),
            peak_allocated: self.peak_allocated.load(Ordering::Relaxed),
            total_allocated: self.total_allocated.load(Ordering::Relaxed),
            files_read: self.files_read.load(Ordering::Relaxed),
            files_mapped: self.files_mapped.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Search stats:\n\
             Chunks dispatched/skipped: {}/{}\n\
             Bytes scanned: {}\n\
             Matches found: {}\n\
             Chunk buffers allocated: {} bytes (peak live {} bytes)\n\
             Files loaded (read/mapped): {}/{}",
            stats.chunks_dispatched,
            stats.chunks_skipped,
            stats.bytes_scanned,
            stats.matches_found,
            stats.total_allocated,
            stats.peak_allocated,
            stats.files_read,
            stats.files_mapped
        );
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub chunks_dispatched: u64,
    pub chunks_skipped: u64,
    pub bytes_scanned: u64,
    pub matches_found: u64,
    pub live_allocated: u64,
    pub peak_allocated: u64,
    pub total_allocated: u64,
    pub files_read: u64,
    pub files_mapped: u64,
}
