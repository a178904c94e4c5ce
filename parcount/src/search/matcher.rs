use super::shift_table::ShiftTable;
use crate::errors::CountResult;

/// Counts every (possibly overlapping) occurrence of `pattern` fully
/// contained in `buffer`.
///
/// Right-to-left window comparison with bad-character shifting. After a full
/// match the window moves by the Sunday shift of the byte just past the
/// window, or by one byte when the window already touches the end of the
/// buffer. That shift is applied exactly once per match.
pub fn count_in_buffer(buffer: &[u8], pattern: &[u8], table: &ShiftTable) -> u64 {
    let len = buffer.len();
    let p = pattern.len();
    if p == 0 || len < p {
        return 0;
    }

    let mut count = 0u64;
    let mut s = 0usize;
    let last_start = len - p;

    while s <= last_start {
        let window = &buffer[s..s + p];
        let mut j = p;
        while j > 0 && pattern[j - 1] == window[j - 1] {
            j -= 1;
        }

        if j == 0 {
            count += 1;
            s += if s + p < len {
                // table entries are at most p - 1, so this is at least 1
                (p as isize - table.get(buffer[s + p])) as usize
            } else {
                1
            };
        } else {
            let j = j - 1;
            let shift = j as isize - table.get(window[j]);
            s += shift.max(1) as usize;
        }
    }

    count
}

/// A pattern paired with its shift table.
///
/// Owns both, so a shared reference is all a worker needs.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Vec<u8>,
    table: ShiftTable,
}

impl PatternMatcher {
    /// Builds the matcher, failing on an empty pattern
    pub fn new(pattern: impl Into<Vec<u8>>) -> CountResult<Self> {
        let pattern = pattern.into();
        let table = ShiftTable::build(&pattern)?;
        Ok(Self { pattern, table })
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    /// Always false: construction rejects empty patterns
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn table(&self) -> &ShiftTable {
        &self.table
    }

    /// Counts occurrences fully contained in `buffer`
    pub fn count_in(&self, buffer: &[u8]) -> u64 {
        count_in_buffer(buffer, &self.pattern, &self.table)
    }
}
