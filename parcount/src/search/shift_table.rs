use crate::errors::{CountError, CountResult};

/// Number of distinct byte values
pub const ALPHABET_SIZE: usize = 256;

/// Table entry for a byte that does not occur in the pattern
pub const ABSENT: isize = -1;

/// Bad-character table: for each byte value, the last index at which it
/// occurs in the pattern, or [`ABSENT`].
///
/// The table is built once per pattern and never mutated afterwards, so a
/// single instance can be shared by reference across worker threads.
#[derive(Clone, PartialEq, Eq)]
pub struct ShiftTable {
    last: [isize; ALPHABET_SIZE],
}

impl ShiftTable {
    /// Builds the table for `pattern`.
    ///
    /// Scans left to right so that later occurrences overwrite earlier ones
    /// and every entry ends up holding the *last* occurrence index.
    pub fn build(pattern: &[u8]) -> CountResult<Self> {
        if pattern.is_empty() {
            return Err(CountError::EmptyPattern);
        }

        let mut last = [ABSENT; ALPHABET_SIZE];
        for (i, &byte) in pattern.iter().enumerate() {
            last[usize::from(byte)] = i as isize;
        }
        Ok(Self { last })
    }

    /// Raw entry for `byte`, [`ABSENT`] when the byte is not in the pattern
    #[inline]
    pub fn get(&self, byte: u8) -> isize {
        self.last[usize::from(byte)]
    }

    /// Last index of `byte` in the pattern
    pub fn last_index(&self, byte: u8) -> Option<usize> {
        usize::try_from(self.get(byte)).ok()
    }
}

impl std::fmt::Debug for ShiftTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only present bytes are interesting; 256 sentinels are noise.
        f.debug_map()
            .entries(
                (0..=u8::MAX)
                    .filter_map(|b| self.last_index(b).map(|i| (b, i))),
            )
            .finish()
    }
}
