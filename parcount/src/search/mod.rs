//! Parallel occurrence counting.
//!
//! The text is split into overlapping chunks ([`partition`]), each chunk is
//! searched with a bad-character scan ([`matcher`]) driven by a per-pattern
//! [`shift_table`], and the partial counts are summed on a fixed worker pool
//! ([`engine`]).
//!
//! ```rust,ignore
//! use std::num::NonZeroUsize;
//!
//! let total = parcount::count_occurrences(b"abcabcabc", b"abc", NonZeroUsize::new(3).unwrap())?;
//! assert_eq!(total, 3);
//! ```
//!
//! Each start offset in the text is owned by exactly one chunk, so the total
//! does not depend on the number of workers.
pub mod engine;
pub mod matcher;
pub mod partition;
pub mod shift_table;

pub use engine::{count_occurrences, count_with_options, run, search, DispatchOptions};
pub use matcher::{count_in_buffer, PatternMatcher};
pub use partition::{partition, ChunkSpec, Partition};
pub use shift_table::ShiftTable;
