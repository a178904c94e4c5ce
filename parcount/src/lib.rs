pub mod config;
pub mod errors;
pub mod input;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{ChunkMode, CliOverrides, CountConfig};
pub use errors::{CountError, CountResult};
pub use results::{CountOutcome, CountReport, PartialCount};
pub use search::{count_occurrences, search, ShiftTable};
