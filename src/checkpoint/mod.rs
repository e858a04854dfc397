//! JSON persistence of run records and batch results
//!
//! Files hold a versioned envelope around the payload. Writes go to a
//! sibling temporary file that is renamed into place once complete, so a
//! failed batch never leaves a truncated result file behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AcoError, AcoResult};

/// Current persistence format version
pub const FORMAT_VERSION: u32 = 1;

/// Versioned wrapper written to disk
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    /// Crate version that wrote the file
    pub writer: String,
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            version: FORMAT_VERSION,
            writer: env!("CARGO_PKG_VERSION").to_string(),
            payload,
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.version <= FORMAT_VERSION
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Serialize `value` to `path` as pretty-printed JSON
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> AcoResult<()> {
    let path = path.as_ref();
    let partial = temporary_path(path);

    let file = File::create(&partial)?;
    let mut writer = BufWriter::new(file);
    let written = serde_json::to_writer_pretty(&mut writer, &Envelope::new(value))
        .map_err(AcoError::from)
        .and_then(|_| writer.flush().map_err(AcoError::from));

    if let Err(err) = written {
        let _ = fs::remove_file(&partial);
        return Err(err);
    }

    fs::rename(&partial, path)?;
    debug!(path = %path.display(), "results written");
    Ok(())
}

/// Read a value written by [`save_json`]
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> AcoResult<T> {
    let file = File::open(path.as_ref())?;
    let envelope: Envelope<T> = serde_json::from_reader(BufReader::new(file))?;
    if !envelope.is_compatible() {
        return Err(AcoError::Serialization(format!(
            "format version {} is newer than supported version {}",
            envelope.version, FORMAT_VERSION
        )));
    }
    Ok(envelope.payload)
}

pub mod prelude {
    pub use super::{load_json, save_json, Envelope, FORMAT_VERSION};
}
