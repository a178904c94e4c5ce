use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, info, trace};

use super::matcher::PatternMatcher;
use super::partition::{partition, ChunkSpec, Partition};
use crate::config::{default_thread_count, ChunkMode, CountConfig};
use crate::errors::{CountError, CountResult};
use crate::input::load_bytes;
use crate::metrics::SearchMetrics;
use crate::results::{CountOutcome, CountReport, PartialCount};

/// Worker pool and buffer settings for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    pub thread_count: NonZeroUsize,
    pub chunk_mode: ChunkMode,
}

impl DispatchOptions {
    pub fn new(thread_count: NonZeroUsize) -> Self {
        Self {
            thread_count,
            chunk_mode: ChunkMode::default(),
        }
    }

    pub fn with_chunk_mode(mut self, chunk_mode: ChunkMode) -> Self {
        self.chunk_mode = chunk_mode;
        self
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::new(default_thread_count())
    }
}

/// A chunk's bytes for the lifetime of its task.
///
/// Owned copies are reported back to the metrics when dropped, whether the
/// task finished or failed.
struct ChunkBuffer<'a> {
    bytes: Cow<'a, [u8]>,
    metrics: &'a SearchMetrics,
}

impl<'a> ChunkBuffer<'a> {
    fn materialize(
        text: &'a [u8],
        chunk: &ChunkSpec,
        mode: ChunkMode,
        metrics: &'a SearchMetrics,
    ) -> CountResult<Self> {
        let view = &text[chunk.buffer_range()];
        let bytes = match mode {
            ChunkMode::Borrowed => Cow::Borrowed(view),
            ChunkMode::Owned => {
                let mut owned = Vec::new();
                owned
                    .try_reserve_exact(view.len())
                    .map_err(|_| CountError::allocation_failed(chunk.index, view.len()))?;
                owned.extend_from_slice(view);
                metrics.record_allocation(owned.len() as u64);
                Cow::Owned(owned)
            }
        };
        trace!(
            "Chunk {} materialized: {} bytes at offset {} ({:?})",
            chunk.index,
            view.len(),
            chunk.offset,
            mode
        );
        Ok(Self { bytes, metrics })
    }
}

impl Drop for ChunkBuffer<'_> {
    fn drop(&mut self) {
        if let Cow::Owned(bytes) = &self.bytes {
            self.metrics.record_deallocation(bytes.len() as u64);
        }
    }
}

fn search_chunk(
    text: &[u8],
    matcher: &PatternMatcher,
    chunk: &ChunkSpec,
    mode: ChunkMode,
    metrics: &SearchMetrics,
) -> CountResult<PartialCount> {
    let buffer = ChunkBuffer::materialize(text, chunk, mode, metrics)?;
    let matches = matcher.count_in(&buffer.bytes[..chunk.search_len]);
    metrics.record_chunk(chunk.search_len as u64, matches);
    debug!(
        "Chunk {} [{}..{}): {} matches",
        chunk.index,
        chunk.offset,
        chunk.offset + chunk.search_len,
        matches
    );
    Ok(PartialCount {
        chunk: *chunk,
        matches,
    })
}

/// Searches every non-empty chunk of `partition` on a fixed pool of
/// `options.thread_count` threads and sums the partial counts.
///
/// Empty chunks are never dispatched. Any chunk failure fails the whole run.
pub fn run(
    text: &[u8],
    matcher: &PatternMatcher,
    partition: &Partition,
    options: &DispatchOptions,
    metrics: &SearchMetrics,
) -> CountResult<CountOutcome> {
    debug!(
        "Partition: chunk size {}, overlap {}, buffer size {}, {} chunks",
        partition.chunk_size,
        partition.overlap,
        partition.buffer_size,
        partition.chunks.len()
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(options.thread_count.get())
        .thread_name(|i| format!("parcount-worker-{}", i))
        .build()
        .map_err(|e| CountError::thread_pool(e.to_string()))?;

    let skipped = partition.skipped();
    for _ in 0..skipped {
        metrics.record_skipped_chunk();
    }

    let searchable: Vec<&ChunkSpec> = partition.searchable().collect();
    let partials = pool.install(|| {
        searchable
            .par_iter()
            .with_max_len(1)
            .map(|chunk| search_chunk(text, matcher, chunk, options.chunk_mode, metrics))
            .collect::<CountResult<Vec<_>>>()
    })?;

    let mut outcome = CountOutcome {
        chunk_size: partition.chunk_size,
        overlap: partition.overlap,
        skipped_chunks: skipped,
        ..CountOutcome::new()
    };
    for partial in partials {
        outcome.add_partial(partial);
    }
    Ok(outcome)
}

/// Counts occurrences of `pattern` in `text` with explicit options,
/// returning the per-chunk breakdown.
pub fn count_with_options(
    text: &[u8],
    pattern: &[u8],
    options: &DispatchOptions,
    metrics: &SearchMetrics,
) -> CountResult<CountOutcome> {
    let matcher = PatternMatcher::new(pattern)?;

    if matcher.len() > text.len() {
        debug!(
            "Pattern ({} bytes) is longer than text ({} bytes), nothing to search",
            matcher.len(),
            text.len()
        );
        return Ok(CountOutcome::new());
    }

    let partition = partition(text.len(), matcher.len(), options.thread_count);
    run(text, &matcher, &partition, options, metrics)
}

/// Counts all (possibly overlapping) occurrences of `pattern` in `text`
/// using `workers` threads.
///
/// Fails on an empty pattern. A pattern longer than the text yields 0.
pub fn count_occurrences(text: &[u8], pattern: &[u8], workers: NonZeroUsize) -> CountResult<u64> {
    let outcome = count_with_options(
        text,
        pattern,
        &DispatchOptions::new(workers),
        &SearchMetrics::new(),
    )?;
    Ok(outcome.total_matches)
}

/// Loads the configured text and pattern files and counts occurrences
pub fn search(config: &CountConfig) -> CountResult<CountReport> {
    if config.text_path.as_os_str().is_empty() {
        return Err(CountError::config_error("no text file given"));
    }
    if config.pattern_path.as_os_str().is_empty() {
        return Err(CountError::config_error("no pattern file given"));
    }

    info!(
        "Counting {} in {} with {} threads",
        config.pattern_path.display(),
        config.text_path.display(),
        config.thread_count
    );

    let metrics = SearchMetrics::new();
    let started = Instant::now();

    let pattern = load_bytes(&config.pattern_path, &metrics)?;
    if pattern.is_empty() {
        return Err(CountError::EmptyPattern);
    }
    let text = load_bytes(&config.text_path, &metrics)?;

    let options = DispatchOptions {
        thread_count: config.thread_count,
        chunk_mode: config.chunk_mode,
    };
    let outcome = count_with_options(&text, &pattern, &options, &metrics)?;
    let elapsed = started.elapsed();

    metrics.log_stats();
    info!(
        "Search complete. Found {} matches in {} chunks",
        outcome.total_matches,
        outcome.chunks_searched()
    );

    Ok(CountReport {
        text_len: text.len(),
        pattern_len: pattern.len(),
        thread_count: config.thread_count.get(),
        chunk_mode: config.chunk_mode,
        pattern_longer_than_text: pattern.len() > text.len(),
        outcome,
        elapsed,
        stats: metrics.get_stats(),
    })
}
