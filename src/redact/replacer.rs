// src/redact/replacer.rs

//! Replaces an original log file with its redacted candidate.
//!
//! In order:
//!
//! 1. copy owner, group, and mode bits of the original onto the candidate
//! 2. overwrite the original with zeros, truncate it, and unlink it
//! 3. rename the candidate to the original path
//!
//! If step 1 fails the original is untouched and the candidate is removed.
//! If step 2 fails before the original is written, the candidate is also
//! removed. Once the original is written, a failure in step 2 or 3 leaves the
//! candidate behind so the redacted data is not lost.

use crate::common::{FPath, FileOpenOptions, FileSz, RedactError, RedactResult};

use std::io::{Error, ErrorKind, Write};
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use ::nix::unistd::{chown, Gid, Uid};
use ::tempfile::NamedTempFile;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Size of each block of zeros written by [`secure_erase`].
///
/// [`secure_erase`]: self::secure_erase
pub const ERASE_BLOCK_SZ: usize = 0x10000;

/// Copy owner, group, and permission bits of `original` onto `candidate`.
///
/// The owner is changed first; `chown` may clear set-user-ID bits.
pub fn clone_attributes(original: &Path, candidate: &Path) -> Result<(), Error> {
    defn!("{:?} → {:?}", original, candidate);
    let metadata = std::fs::metadata(original)?;
    chown(
        candidate,
        Some(Uid::from_raw(metadata.uid())),
        Some(Gid::from_raw(metadata.gid())),
    )?;
    let mode: u32 = metadata.permissions().mode();
    std::fs::set_permissions(candidate, std::fs::Permissions::from_mode(mode))?;
    defx!("uid {} gid {} mode {:o}", metadata.uid(), metadata.gid(), mode);

    Ok(())
}

/// A failed [`secure_erase`].
///
/// [`secure_erase`]: self::secure_erase
#[derive(Debug)]
pub struct EraseError {
    pub err: Error,
    /// The file may have been written, truncated, or unlinked.
    pub modified: bool,
}

impl EraseError {
    fn unmodified(err: Error) -> EraseError {
        EraseError { err, modified: false }
    }

    fn modified(err: Error) -> EraseError {
        EraseError { err, modified: true }
    }
}

/// Overwrite every byte of the file at `path` with zeros, flush to storage,
/// truncate to zero length, then unlink it.
///
/// `path` must not be a symbolic link.
pub fn secure_erase(path: &Path) -> Result<(), EraseError> {
    defn!("{:?}", path);
    let metadata = std::fs::symlink_metadata(path).map_err(EraseError::unmodified)?;
    if metadata.file_type().is_symlink() {
        defx!("symlink");
        return Err(EraseError::unmodified(Error::new(
            ErrorKind::InvalidInput,
            "refusing to erase a symbolic link",
        )));
    }
    let mut file = FileOpenOptions::new()
        .write(true)
        .open(path)
        .map_err(EraseError::unmodified)?;
    let filesz: FileSz = file
        .metadata()
        .map_err(EraseError::unmodified)?
        .len();
    // nothing below may be assumed to leave the file intact
    let zeros = vec![0u8; ERASE_BLOCK_SZ];
    let mut remain: FileSz = filesz;
    while remain > 0 {
        let len = std::cmp::min(remain, ERASE_BLOCK_SZ as FileSz) as usize;
        file.write_all(&zeros[..len])
            .map_err(EraseError::modified)?;
        remain -= len as FileSz;
    }
    file.sync_all().map_err(EraseError::modified)?;
    file.set_len(0).map_err(EraseError::modified)?;
    file.sync_all().map_err(EraseError::modified)?;
    drop(file);
    std::fs::remove_file(path).map_err(EraseError::modified)?;
    defx!("erased {} bytes", filesz);

    Ok(())
}

/// Keep `candidate` at its temporary path; return that path if it could be
/// kept.
fn keep_candidate(candidate: NamedTempFile) -> Option<FPath> {
    match candidate.keep() {
        Ok((_file, pathbuf)) => Some(pathbuf.to_string_lossy().to_string()),
        Err(_err) => {
            defñ!("keep failed {:?}", _err);
            None
        }
    }
}

/// Replace the file at `path` with `candidate`.
///
/// `candidate` must already be flushed and synced and must be in the same
/// directory as `path`.
pub fn replace(path: &FPath, candidate: NamedTempFile) -> RedactResult<()> {
    replace_with(path, candidate, secure_erase)
}

/// Like `replace` but the original is erased by `erase`.
pub(crate) fn replace_with<E>(path: &FPath, candidate: NamedTempFile, erase: E) -> RedactResult<()>
where
    E: FnOnce(&Path) -> Result<(), EraseError>,
{
    defn!("{:?} with {:?}", path, candidate.path());
    let original: &Path = Path::new(path);

    // `candidate` is removed on drop
    if let Err(err) = clone_attributes(original, candidate.path()) {
        defx!("clone_attributes failed {:?}", err);
        return Err(RedactError::AttributeClone {
            path: path.clone(),
            err,
        });
    }

    if let Err(EraseError { err, modified }) = erase(original) {
        defx!("erase failed {:?}, modified {}", err, modified);
        // an unmodified original needs no copy; `candidate` is removed on drop
        let orphan: Option<FPath> = if modified { keep_candidate(candidate) } else { None };
        return Err(RedactError::SecureErase {
            path: path.clone(),
            modified,
            orphan,
            err,
        });
    }

    if let Err(err) = candidate.persist(original) {
        defx!("persist failed {:?}", err.error);
        // the candidate is the only copy of the redacted data
        return Err(RedactError::Replace {
            path: path.clone(),
            orphan: keep_candidate(err.file),
            err: err.error,
        });
    }
    defx!();

    Ok(())
}
