//! First-run bootstrap of the backing file.

use crate::error::StoreError;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::info;

/// The stream written when no backing file exists: a single empty room.
pub const SEED_WORLD: &str = "\
---
!Room
id: 0
name: Limbo
desc: A formless grey void. Nothing has been built yet.
";

/// Make sure `path` exists, writing [`SEED_WORLD`] if it does not.
///
/// Returns `true` when the file was created. An existing file is left
/// untouched and unvalidated. The parent directory must already exist.
pub fn ensure_exists(path: &Path) -> Result<bool, StoreError> {
    if path.exists() {
        return Ok(false);
    }

    info!(path = %path.display(), "building minimal world database");
    let bootstrap_err = |source| StoreError::Bootstrap {
        path: path.to_path_buf(),
        source,
    };
    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        // Someone else created it between the check and the open.
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(bootstrap_err(e)),
    };
    file.write_all(SEED_WORLD.as_bytes()).map_err(bootstrap_err)?;
    file.sync_all().map_err(bootstrap_err)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_stream;

    #[test]
    fn creates_seed_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world.yaml");

        assert!(ensure_exists(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SEED_WORLD);
    }

    #[test]
    fn existing_file_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world.yaml");
        std::fs::write(&path, "not even yaml: [").unwrap();

        assert!(!ensure_exists(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not even yaml: [");
    }

    #[test]
    fn missing_parent_directory_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("no_such_dir").join("world.yaml");

        let err = ensure_exists(&path).unwrap_err();
        assert!(matches!(err, StoreError::Bootstrap { .. }), "got: {err}");
    }

    #[test]
    fn seed_world_decodes() {
        let objects = decode_stream(SEED_WORLD.as_bytes()).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name(), "Limbo");
    }
}
