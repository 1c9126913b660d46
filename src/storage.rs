use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

/// Sibling path with `suffix` appended to the file name: `show.lms` → `show.lms.bak`.
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.file_name().unwrap_or_default());
    name.push(suffix);
    path.with_file_name(name)
}

/// Atomically write bytes to a file using write-to-temp-then-rename.
///
/// 1. Writes data to a `.tmp` sibling file
/// 2. Calls `fsync` to flush to disk
/// 3. Renames the existing file to `.bak` (best-effort)
/// 4. Renames the `.tmp` file to the target path
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = sibling_with_suffix(path, ".tmp");
    let bak_path = sibling_with_suffix(path, ".bak");

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    // Backup existing file (best-effort, failure only logged)
    if path.exists() {
        match fs::rename(path, &bak_path) {
            Ok(()) => debug!("previous output kept as {}", bak_path.display()),
            Err(e) => debug!("could not back up {}: {e}", path.display()),
        }
    }

    fs::rename(&tmp_path, path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn writes_new_file_and_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputSequences").join("Sandstorm.lms");
        atomic_write(&path, b"<sequence/>").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<sequence/>");
        assert!(!sibling_with_suffix(&path, ".tmp").exists());
        assert!(!sibling_with_suffix(&path, ".bak").exists());
    }

    #[test]
    fn existing_file_is_kept_as_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("show.lms");
        fs::write(&path, "old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_to_string(dir.path().join("show.lms.bak")).unwrap(), "old");
    }
}
