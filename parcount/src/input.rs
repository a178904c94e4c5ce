use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Deref;
use std::path::Path;
use tracing::{trace, warn};

use crate::errors::{CountError, CountResult};
use crate::metrics::SearchMetrics;

const BUFFER_CAPACITY: usize = 65536;
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Bytes of an input file, either read into memory or memory mapped
#[derive(Debug)]
pub enum InputBuffer {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl InputBuffer {
    pub fn is_mapped(&self) -> bool {
        matches!(self, InputBuffer::Mapped(_))
    }
}

impl Deref for InputBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            InputBuffer::Owned(bytes) => bytes,
            InputBuffer::Mapped(mmap) => mmap,
        }
    }
}

impl AsRef<[u8]> for InputBuffer {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

fn open(path: &Path) -> CountResult<File> {
    File::open(path).map_err(|e| CountError::from_io(e, path))
}

fn read_buffered(path: &Path) -> CountResult<InputBuffer> {
    let file = open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| CountError::from_io(e, path))?;
    Ok(InputBuffer::Owned(bytes))
}

fn read_mapped(path: &Path) -> CountResult<InputBuffer> {
    let file = open(path)?;
    // The text is treated as immutable for the whole run.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| CountError::from_io(e, path))?;
    Ok(InputBuffer::Mapped(mmap))
}

/// Loads a whole file, choosing the strategy by size.
///
/// Files of at least [`LARGE_FILE_THRESHOLD`] bytes are memory mapped; the
/// rest are read into memory. The bytes are returned verbatim.
pub fn load_bytes(path: &Path, metrics: &SearchMetrics) -> CountResult<InputBuffer> {
    trace!("Loading input file: {}", path.display());

    let buffer = match path.metadata() {
        Ok(metadata) if metadata.len() >= LARGE_FILE_THRESHOLD => read_mapped(path)?,
        Ok(_) => read_buffered(path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CountError::file_not_found(path));
        }
        Err(e) => {
            warn!("Failed to get metadata for {}: {}", path.display(), e);
            read_buffered(path)?
        }
    };

    // Only loads that produced bytes are counted
    metrics.record_file_load(buffer.is_mapped());
    Ok(buffer)
}
