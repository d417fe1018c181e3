//! File handles and error mapping shared by the readers and writers.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use sessions_core::{Error, Result};

/// Opens a file for buffered reading.
pub fn open_reader(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(|e| Error::storage(format!("open {}: {}", path.display(), e)))?;
    Ok(BufReader::new(file))
}

/// Creates (or truncates) a file for buffered writing.
pub fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .map_err(|e| Error::storage(format!("create {}: {}", path.display(), e)))?;
    Ok(BufWriter::new(file))
}

/// Creates a directory and its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| Error::storage(format!("create dir {}: {}", path.display(), e)))
}

/// Maps a CSV error: I/O failures are storage errors, everything else is a
/// schema error on the given file.
pub fn csv_error(path: &Path, err: csv::Error) -> Error {
    if err.is_io_error() {
        Error::storage(format!("{}: {}", path.display(), err))
    } else {
        Error::schema(format!("{}: {}", path.display(), err))
    }
}
