// src/debug/helpers.rs

//! Miscellaneous helper functions for testing.

use crate::common::FPath;
use crate::data::utmpx::Utmpx;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[allow(unused_imports)]
use ::si_trace_print::{defo, defñ};

#[doc(hidden)]
pub use ::tempfile::tempdir;
#[doc(hidden)]
pub use ::tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Temporary directories default to this name prefix.
///
/// Makes it easier to find and delete directories remaining after an
/// aborted test run.
pub const STR_TEMPDIR_PREFIX: &str = "tmp-utredact-test-";

/// Create a temporary directory
pub fn create_temp_dir() -> TempDir {
    defñ!();
    match ::tempfile::Builder::new()
        .prefix(STR_TEMPDIR_PREFIX)
        .tempdir()
    {
        Ok(val) => val,
        Err(err) => panic!("tempfile::Builder::new().tempdir() return Err {}", err),
    }
}

/// Small helper to join `name` to the `TempDir` path as a `FPath`.
pub fn tempdir_fpath(tempdir: &TempDir, name: &str) -> FPath {
    let pathb: PathBuf = tempdir.path().join(name);

    FPath::from(pathb.to_str().unwrap())
}

/// Testing helper function to write a `[u8]` to file `name` within
/// `tempdir`. Returns the path of the file.
pub fn create_file_bytes_in_tmpdir(
    data: &[u8],
    name: &str,
    tempdir: &TempDir,
) -> FPath {
    let fpath = tempdir_fpath(tempdir, name);
    defo!("File::create({:?})", fpath);
    let mut file = match File::create(&fpath) {
        Ok(val) => val,
        Err(err) => panic!("File::create({:?}) return Err {}", fpath, err),
    };
    if let Err(err) = file.write_all(data) {
        panic!("File::write_all({:?}) return Err {}", fpath, err);
    }

    fpath
}

/// Testing helper function to write `entries` as a log file `name`
/// within `tempdir`.
pub fn create_log_in_tmpdir(
    entries: &[Utmpx],
    name: &str,
    tempdir: &TempDir,
) -> FPath {
    create_file_bytes_in_tmpdir(&entries_to_bytes(entries), name, tempdir)
}

/// Concatenate the on-disk form of `entries`.
pub fn entries_to_bytes(entries: &[Utmpx]) -> Vec<u8> {
    let mut data: Vec<u8> = Vec::with_capacity(entries.iter().map(|e| e.len()).sum());
    for entry in entries.iter() {
        data.extend_from_slice(entry.as_bytes());
    }

    data
}

/// Read the entire file at `fpath`; panic on failure.
pub fn read_file_bytes(fpath: &FPath) -> Vec<u8> {
    match std::fs::read(fpath) {
        Ok(val) => val,
        Err(err) => panic!("std::fs::read({:?}) return Err {}", fpath, err),
    }
}

/// Names of all directory entries within `tempdir`, sorted.
pub fn tempdir_names(tempdir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(tempdir.path())
        .unwrap()
        .map(|de| de.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();

    names
}
