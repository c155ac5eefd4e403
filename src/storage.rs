// --- Game state file: locking, snapshot writes, tolerant reads ---

use std::{
    fs::{File, OpenOptions},
    io::{Seek, SeekFrom, Write},
    path::Path,
};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::engine::GameState;

/// Open the state file read/write and hold an exclusive lock on it. A file
/// that does not exist yet is created holding the default game state.
pub fn open_or_init(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();

    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => {
            lock_state_file(&file)?;
            Ok(file)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let mut file = OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(path)
                .with_context(|| format!("creating {}", path.display()))?;

            debug!(path = %path.display(), "seeding new state file");
            serde_json::to_writer_pretty(&mut file, &GameState::default())
                .context("writing default state")?;
            file.flush()?;
            lock_state_file(&file)?;

            // Reader starts at the top of the freshly written seed.
            file.seek(SeekFrom::Start(0))?;

            Ok(file)
        }
        Err(e) => Err(e).with_context(|| format!("opening {}", path.display())),
    }
}

/// Replace `path` with the JSON form of `value`. The old contents stay in
/// place until the new snapshot is fully on disk.
pub fn write_snapshot<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    // Sibling temp file so the final rename never crosses filesystems.
    let mut tmp = NamedTempFile::new_in(dir).context("create temp file")?;

    serde_json::to_writer_pretty(&mut tmp, value).context("serializing JSON")?;

    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("persist {}", path.display()))?;

    Ok(())
}

/// Deserialize the whole of `file`, from the start, as `T`.
pub fn load_from<R, T>(mut file: R) -> Result<T>
where
    R: std::io::Read + Seek,
    T: DeserializeOwned,
{
    file.seek(SeekFrom::Start(0))?;

    let data = serde_json::from_reader(file).context("JSON parse")?;

    Ok(data)
}

/// Like [`load_from`] for the game state, but an unreadable or corrupted
/// payload is treated as "no saved state".
pub fn load_state<R>(file: R) -> GameState
where
    R: std::io::Read + Seek,
{
    match load_from(file) {
        Ok(state) => state,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "saved state unreadable, starting fresh");
            GameState::default()
        }
    }
}

fn lock_state_file(file: &File) -> Result<()> {
    file.lock_exclusive()
        .context("locking state file")?;
    Ok(())
}
