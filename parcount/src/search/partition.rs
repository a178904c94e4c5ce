//! Splits a text into overlapping chunks for parallel counting.
//!
//! Chunks read forward from their nominal left edge and never reach back
//! for leading context. A chunk at offset `C * i` searches `C + P - 1`
//! bytes, which admits exactly the `C` start offsets `[C * i, C * i + C)`:
//! every match that starts there has all of its `P` bytes in the window,
//! and no start offset is admitted by two chunks.
//!
//! Buffers are allocated with `2P - 2` bytes of trailing overlap. When the
//! tail left for the last chunk is no longer than that overlap, the last
//! chunk is emitted empty and its predecessor searches its whole buffer,
//! which then reaches the end of the text.
//!
//! Invariants:
//! - `search_len <= capacity` for every chunk.
//! - The admitted start offsets of all chunks partition `[0, T - P]`.
use serde::Serialize;
use std::num::NonZeroUsize;
use std::ops::Range;

/// One chunk of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkSpec {
    /// Position of the chunk in the partition
    pub index: usize,
    /// Offset of the first byte in the text
    pub offset: usize,
    /// Bytes materialized for this chunk
    pub capacity: usize,
    /// Bytes actually searched, a prefix of the buffer
    pub search_len: usize,
}

impl ChunkSpec {
    fn empty(index: usize, offset: usize) -> Self {
        Self {
            index,
            offset,
            capacity: 0,
            search_len: 0,
        }
    }

    /// An empty chunk owns no start offsets and must not be dispatched
    pub fn is_empty(&self) -> bool {
        self.search_len == 0
    }

    /// Text range backing the chunk's buffer
    pub fn buffer_range(&self) -> Range<usize> {
        self.offset..self.offset + self.capacity
    }

    /// Text start offsets of the matches this chunk can count
    pub fn admitted_starts(&self, pattern_len: usize) -> Range<usize> {
        let count = (self.search_len + 1).saturating_sub(pattern_len);
        self.offset..self.offset + count
    }
}

/// Geometry of a text split across workers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// Nominal chunk size `C`
    pub chunk_size: usize,
    /// Trailing overlap `2P - 2`
    pub overlap: usize,
    /// Buffer capacity of a middle chunk, `C + overlap`
    pub buffer_size: usize,
    pub chunks: Vec<ChunkSpec>,
}

impl Partition {
    /// Chunks that carry work
    pub fn searchable(&self) -> impl Iterator<Item = &ChunkSpec> {
        self.chunks.iter().filter(|c| !c.is_empty())
    }

    pub fn skipped(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_empty()).count()
    }
}

/// Splits `text_len` bytes into at most `workers` chunks for a pattern of
/// `pattern_len` bytes.
///
/// `pattern_len` must be at least 1. An empty text yields no chunks.
pub fn partition(text_len: usize, pattern_len: usize, workers: NonZeroUsize) -> Partition {
    debug_assert!(pattern_len > 0, "pattern length must be positive");
    let overlap = 2 * pattern_len.saturating_sub(1);

    if text_len == 0 {
        return Partition {
            chunk_size: 0,
            overlap,
            buffer_size: overlap,
            chunks: Vec::new(),
        };
    }

    let chunk_size = text_len.div_ceil(workers.get());
    let buffer_size = chunk_size + overlap;
    let window = chunk_size + pattern_len - 1;
    let chunk_count = text_len.div_ceil(chunk_size);
    let last = chunk_count - 1;
    let tail = text_len - chunk_size * last;
    let tail_absorbed = chunk_count > 1 && tail <= overlap;

    let chunks = (0..chunk_count)
        .map(|index| {
            let offset = chunk_size * index;
            let available = text_len - offset;

            if index == last {
                if tail_absorbed {
                    ChunkSpec::empty(index, offset)
                } else {
                    ChunkSpec {
                        index,
                        offset,
                        capacity: available,
                        search_len: available,
                    }
                }
            } else if tail_absorbed && index + 1 == last {
                let len = buffer_size.min(available);
                ChunkSpec {
                    index,
                    offset,
                    capacity: len,
                    search_len: len,
                }
            } else {
                // The first chunk has nothing before it to overlap with.
                let capacity = if index == 0 { window } else { buffer_size };
                ChunkSpec {
                    index,
                    offset,
                    capacity: capacity.min(available),
                    search_len: window.min(available),
                }
            }
        })
        .collect();

    Partition {
        chunk_size,
        overlap,
        buffer_size,
        chunks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    /// Asserts every valid start offset is admitted by exactly one chunk
    fn assert_exact_cover(text_len: usize, pattern_len: usize, n: usize) {
        let part = partition(text_len, pattern_len, workers(n));
        let mut owners = vec![0u32; text_len];
        for chunk in &part.chunks {
            assert!(chunk.search_len <= chunk.capacity, "{:?}", chunk);
            assert!(chunk.offset + chunk.capacity <= text_len, "{:?}", chunk);
            for start in chunk.admitted_starts(pattern_len) {
                owners[start] += 1;
            }
        }
        let valid = (text_len + 1).saturating_sub(pattern_len);
        for (start, &owned) in owners.iter().enumerate() {
            let expected = u32::from(start < valid);
            assert_eq!(
                owned, expected,
                "T={} P={} W={} start={}",
                text_len, pattern_len, n, start
            );
        }
    }

    #[test]
    fn test_single_worker_takes_everything() {
        let part = partition(100, 4, workers(1));
        assert_eq!(part.chunk_size, 100);
        assert_eq!(
            part.chunks,
            vec![ChunkSpec {
                index: 0,
                offset: 0,
                capacity: 100,
                search_len: 100
            }]
        );
    }

    #[test]
    fn test_geometry() {
        let part = partition(100, 3, workers(4));
        assert_eq!(part.chunk_size, 25);
        assert_eq!(part.overlap, 4);
        assert_eq!(part.buffer_size, 29);
        assert_eq!(part.chunks.len(), 4);

        assert_eq!(part.chunks[0].capacity, 27);
        assert_eq!(part.chunks[0].search_len, 27);
        assert_eq!(part.chunks[1].offset, 25);
        assert_eq!(part.chunks[1].capacity, 29);
        assert_eq!(part.chunks[1].search_len, 27);
        assert_eq!(part.chunks[3].offset, 75);
        assert_eq!(part.chunks[3].search_len, 25);
    }

    #[test]
    fn test_short_tail_is_absorbed_by_predecessor() {
        // T=9, P=3, W=3: C=3, tail=3 <= overlap=4
        let part = partition(9, 3, workers(3));
        assert_eq!(part.chunks.len(), 3);
        assert!(part.chunks[2].is_empty());
        assert_eq!(part.chunks[1].offset, 3);
        assert_eq!(part.chunks[1].search_len, 6);
        assert_eq!(part.skipped(), 1);
        assert_eq!(part.searchable().count(), 2);
    }

    #[test]
    fn test_long_tail_gets_its_own_chunk() {
        // T=10, P=2, W=2: C=5, tail=5 > overlap=2
        let part = partition(10, 2, workers(2));
        assert!(!part.chunks[1].is_empty());
        assert_eq!(part.chunks[0].search_len, 6);
        assert_eq!(part.chunks[1].search_len, 5);
    }

    #[test]
    fn test_single_byte_pattern_has_no_overlap() {
        let part = partition(10, 1, workers(3));
        assert_eq!(part.overlap, 0);
        assert!(part.chunks.iter().all(|c| c.search_len == c.capacity));
        assert_eq!(part.searchable().map(|c| c.search_len).sum::<usize>(), 10);
    }

    #[test]
    fn test_more_workers_than_bytes() {
        let part = partition(3, 1, workers(8));
        assert_eq!(part.chunk_size, 1);
        assert_eq!(part.chunks.len(), 3);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let part = partition(0, 2, workers(4));
        assert!(part.chunks.is_empty());
    }

    #[test]
    fn test_exact_cover_over_many_shapes() {
        for text_len in 0..60 {
            for pattern_len in 1..8 {
                for n in 1..12 {
                    assert_exact_cover(text_len, pattern_len, n);
                }
            }
        }
    }
}
