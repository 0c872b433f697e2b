use std::{
    io,
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
};

use log::{debug, info};

/// Number of leading bytes echoed to the debug log.
const HEADER_PREVIEW_LEN: usize = 10;

/// A program image staged for loading. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rom(Box<[u8]>);

#[derive(Debug, thiserror::Error)]
pub enum RomError {
    #[error("No file selected, please choose a ROM")]
    NoFile,

    #[error("The ROM file {} is empty", path.display())]
    Empty { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Rom {
    /// Stages `bytes` read from `path`, rejecting an empty buffer.
    pub fn new(path: &Path, bytes: Vec<u8>) -> Result<Self, RomError> {
        if bytes.is_empty() {
            return Err(RomError::Empty {
                path: path.to_path_buf(),
            });
        }

        debug!(
            "Staged {} bytes from {}, header {:02X?}",
            bytes.len(),
            path.display(),
            &bytes[..bytes.len().min(HEADER_PREVIEW_LEN)]
        );

        Ok(Self(bytes.into_boxed_slice()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Reads the selected file fully into memory and validates it.
pub fn read_rom(selection: Option<&Path>) -> Result<Rom, RomError> {
    let path = selection.ok_or(RomError::NoFile)?;

    let bytes = std::fs::read(path).map_err(|source| RomError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Rom::new(path, bytes)
}

/// Reads ROM files off the event-loop thread.
pub struct RomLoader;

impl RomLoader {
    /// Reads `selection` on a worker thread and hands the outcome to
    /// `on_complete` exactly once.
    pub fn spawn<F>(selection: Option<PathBuf>, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Rom, RomError>) + Send + 'static,
    {
        if let Some(path) = &selection {
            info!("Reading ROM from {}", path.display());
        }

        thread::spawn(move || on_complete(read_rom(selection.as_deref())))
    }
}
