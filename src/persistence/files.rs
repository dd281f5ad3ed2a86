use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the local data directory (created by `focusfriend init`)
pub const LOCAL_DIR_NAME: &str = ".focusfriend";

/// Environment variable that overrides the data directory
pub const DIR_ENV_VAR: &str = "FOCUSFRIEND_DIR";

/// Get the data directory
///
/// Resolution order: `$FOCUSFRIEND_DIR`, then a local `.focusfriend`
/// found by walking up from the current directory, then the platform
/// data directory (e.g. `~/.local/share/focusfriend`).
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(DIR_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_dir(&current_dir) {
        return Ok(local_dir);
    }

    let data = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data.join("focusfriend"))
}

/// Find local .focusfriend directory by walking up the directory tree
fn find_local_dir(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let candidate = current.join(LOCAL_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Ensure the data directory exists
pub fn ensure_data_dir() -> Result<PathBuf> {
    let dir = get_data_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local .focusfriend directory in the current directory
pub fn init_local_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let local_dir = current_dir.join(LOCAL_DIR_NAME);

    if local_dir.exists() {
        anyhow::bail!("Data directory already exists: {}", local_dir.display());
    }

    fs::create_dir_all(&local_dir)
        .with_context(|| format!("Failed to create directory: {}", local_dir.display()))?;

    Ok(local_dir)
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> std::io::Result<()> {
    let path = path.as_ref();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Read file content, `None` if the file doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> std::io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
