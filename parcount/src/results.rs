use serde::Serialize;
use std::time::Duration;

use crate::config::ChunkMode;
use crate::metrics::SearchStats;
use crate::search::partition::ChunkSpec;

/// Matches credited to one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartialCount {
    pub chunk: ChunkSpec,
    pub matches: u64,
}

/// Outcome of counting over one text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountOutcome {
    /// Sum of all partial counts
    pub total_matches: u64,
    /// Nominal chunk size used by the partition, 0 when nothing was searched
    pub chunk_size: usize,
    /// Trailing overlap per chunk
    pub overlap: usize,
    /// One entry per dispatched chunk, in chunk order
    pub partials: Vec<PartialCount>,
    /// Empty chunks that were never dispatched
    pub skipped_chunks: usize,
}

impl CountOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_partial(&mut self, partial: PartialCount) {
        self.total_matches += partial.matches;
        self.partials.push(partial);
    }

    pub fn chunks_searched(&self) -> usize {
        self.partials.len()
    }
}

/// Full report of a file-based run
#[derive(Debug, Clone, Serialize)]
pub struct CountReport {
    pub text_len: usize,
    pub pattern_len: usize,
    pub thread_count: usize,
    pub chunk_mode: ChunkMode,
    /// True when the pattern was longer than the text and nothing was searched
    pub pattern_longer_than_text: bool,
    pub outcome: CountOutcome,
    pub elapsed: Duration,
    pub stats: SearchStats,
}

impl CountReport {
    pub fn total_matches(&self) -> u64 {
        self.outcome.total_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(index: usize, matches: u64) -> PartialCount {
        PartialCount {
            chunk: ChunkSpec {
                index,
                offset: index * 10,
                capacity: 12,
                search_len: 11,
            },
            matches,
        }
    }

    #[test]
    fn test_outcome_accumulates() {
        let mut outcome = CountOutcome::new();
        outcome.add_partial(partial(0, 2));
        outcome.add_partial(partial(1, 0));
        outcome.add_partial(partial(2, 5));
        assert_eq!(outcome.total_matches, 7);
        assert_eq!(outcome.chunks_searched(), 3);
    }

    #[test]
    fn test_report_serializes() {
        let mut outcome = CountOutcome::new();
        outcome.add_partial(partial(0, 3));
        let report = CountReport {
            text_len: 9,
            pattern_len: 3,
            thread_count: 1,
            chunk_mode: ChunkMode::Owned,
            pattern_longer_than_text: false,
            outcome,
            elapsed: Duration::from_millis(5),
            stats: SearchStats::default(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["total_matches"], 3);
        assert_eq!(json["chunk_mode"], "owned");
        assert_eq!(json["outcome"]["partials"][0]["chunk"]["search_len"], 11);
        assert_eq!(report.total_matches(), 3);
    }
}
