//! Named pipe helpers

use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use nix::{errno::Errno, sys::stat::Mode, unistd::mkfifo};
use tokio::net::unix::pipe;

use crate::error::AppResult;

/// Create a FIFO at `path`; an existing one is reused
pub fn create(path: &Path) -> AppResult<()> {
    match mkfifo(path, Mode::from_bits_truncate(0o666)) {
        Ok(()) | Err(Errno::EEXIST) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Open a FIFO for reading.
///
/// The pipe is opened read-write so that it never reports end-of-file
/// while writers come and go.
pub fn open_reader(path: &Path) -> AppResult<pipe::Receiver> {
    Ok(pipe::OpenOptions::new().read_write(true).open_receiver(path)?)
}

/// Open a FIFO for writing; fails if nobody holds the read end
pub fn open_writer(path: &Path) -> AppResult<pipe::Sender> {
    Ok(pipe::OpenOptions::new().open_sender(path)?)
}

/// Remove a FIFO. Missing paths and anything that is not a FIFO are left
/// alone.
pub fn remove(path: &Path) {
    let is_fifo = std::fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_fifo())
        .unwrap_or(false);
    if !is_fifo {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove pipe");
    }
}
