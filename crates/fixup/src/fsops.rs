//! Filesystem primitives used by cleanup and recreate.

use std::fs::{self, File, FileTimes};
use std::path::Path;

use crate::error::{FixupError, FixupResult};

/// Makes `path` writable by its owner so it can be replaced or removed.
pub fn make_writable(path: &Path) -> FixupResult<()> {
    let metadata = fs::metadata(path).map_err(|e| FixupError::io(path, e))?;
    let mut permissions = metadata.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(0o644);
    }
    #[cfg(not(unix))]
    {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
    }

    fs::set_permissions(path, permissions).map_err(|e| FixupError::io(path, e))
}

pub fn remove(path: &Path) -> FixupResult<()> {
    make_writable(path)?;
    fs::remove_file(path).map_err(|e| FixupError::io(path, e))
}

/// Copies bytes and permission bits, overwriting `dst`. With `preserve_times`
/// the access and modification times follow as well.
pub fn copy_preserving(src: &Path, dst: &Path, preserve_times: bool) -> FixupResult<u64> {
    if dst.is_file() {
        make_writable(dst)?;
    }
    let bytes = fs::copy(src, dst).map_err(|e| FixupError::io(dst, e))?;

    if preserve_times {
        let metadata = fs::metadata(src).map_err(|e| FixupError::io(src, e))?;
        let mut times = FileTimes::new();
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }
        if let Ok(modified) = metadata.modified() {
            times = times.set_modified(modified);
        }

        #[cfg(unix)]
        let file = File::open(dst);
        #[cfg(not(unix))]
        let file = fs::OpenOptions::new().write(true).open(dst);

        file.and_then(|f| f.set_times(times))
            .map_err(|e| FixupError::io(dst, e))?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn copy_overwrites_and_keeps_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.vmrk");
        let dst = dir.path().join("dst.vmrk");
        fs::write(&src, b"markers").unwrap();
        fs::write(&dst, b"stale contents").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let copied = copy_preserving(&src, &dst, true).unwrap();
        assert_eq!(copied, 7);
        assert_eq!(fs::read(&dst).unwrap(), b"markers");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn copy_replaces_read_only_target() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.eeg");
        let dst = dir.path().join("b.eeg");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();
        let mut perms = fs::metadata(&dst).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&dst, perms).unwrap();

        copy_preserving(&src, &dst, false).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn copy_onto_directory_leaves_its_mode_alone() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.eeg");
        let dst = dir.path().join("COCOA_013_VO.eeg");
        fs::write(&src, b"data").unwrap();
        fs::create_dir(&dst).unwrap();
        fs::set_permissions(&dst, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(copy_preserving(&src, &dst, true).is_err());
        let mode = fs::metadata(&dst).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn remove_read_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("COCOA_013_VO.vmrk");
        fs::write(&path, b"x").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        remove(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn copy_missing_source_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_preserving(&dir.path().join("nope"), &dir.path().join("out"), true)
            .unwrap_err();
        assert!(matches!(err, FixupError::Io { .. }));
    }
}
