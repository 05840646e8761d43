// src/common.rs

//! Common imports, type aliases, and other globals for _utredactlib_.
//! (avoids circular imports)

use std::fmt;
use std::io::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub use std::fs::File;
pub use std::path::Path;

// TODO: use `std::path::PathBuf` for `FPath`
/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;
pub type FPaths = Vec<FPath>;
pub type FileMetadata = std::fs::Metadata;
pub type FileOpenOptions = std::fs::OpenOptions;
/// File size in bytes
pub type FileSz = u64;
/// Byte offset into a file
pub type FileOffset = u64;
/// A general-purpose counting type.
pub type Count = u64;

/// Default location of the `utmp` file (currently logged in sessions).
pub const UTMP_FPATH: &str = "/var/run/utmp";
/// Default location of the `wtmp` file (history of logins and logouts).
pub const WTMP_FPATH: &str = "/var/log/wtmp";
/// Default location of the `btmp` file (failed login attempts).
pub const BTMP_FPATH: &str = "/var/log/btmp";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// custom Results enums
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `Result` Extended
/// for entry reading functions
#[derive(Debug, PartialEq)]
pub enum ResultS3<T, E> {
    /// Contains the success data
    Found(T),
    /// File is empty, or other condition that means "Done", nothing to
    /// return, but no bad errors happened.
    ///
    /// A trailing partial entry is "Done".
    Done,
    /// Contains the error value, something bad happened
    Err(E),
}

impl<T, E> ResultS3<T, E> {
    /// Returns `true` if the result is [`Found`, 'Done`].
    #[allow(dead_code)]
    #[must_use = "if you intended to assert that this is ok, consider `.unwrap()` instead"]
    #[inline(always)]
    pub const fn is_ok(&self) -> bool {
        matches!(*self, ResultS3::Found(_) | ResultS3::Done)
    }

    /// Returns `true` if the result is [`Err`].
    #[allow(dead_code)]
    #[must_use = "if you intended to assert that this is err, consider `.unwrap_err()` instead"]
    #[inline(always)]
    pub const fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// Returns `true` if the result is [`Found`].
    #[inline(always)]
    pub const fn is_found(&self) -> bool {
        matches!(*self, ResultS3::Found(_))
    }

    /// Returns `true` if the result is [`Done`].
    #[inline(always)]
    pub const fn is_done(&self) -> bool {
        matches!(*self, ResultS3::Done)
    }
}

impl<T, E> fmt::Display for ResultS3<T, E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultS3::Found(_) => write!(f, "ResultS3::Found"),
            ResultS3::Done => write!(f, "ResultS3::Done"),
            ResultS3::Err(err) => write!(f, "ResultS3::Err({})", err),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A failed rewrite of one log file.
///
/// Every variant is fatal for the file being rewritten. The variants differ
/// in how much of the original file may remain:
///
/// | variant          | original file                            |
/// |------------------|------------------------------------------|
/// | `Io`             | untouched                                |
/// | `AttributeClone` | untouched                                |
/// | `SecureErase`    | zeroed or removed only if `modified`     |
/// | `Replace`        | erased; redacted data left at `orphan`   |
/// | `Lookup`         | untouched (never opened)                 |
#[derive(Debug)]
pub enum RedactError {
    /// `open`, `read`, `write`, `stat`, or creating the candidate file failed.
    Io {
        op: &'static str,
        path: FPath,
        err: Error,
    },
    /// Copying owner, group, or mode bits onto the candidate file failed.
    AttributeClone {
        path: FPath,
        err: Error,
    },
    /// Overwriting, truncating, or unlinking the original file failed.
    /// If the original was `modified` the redacted copy is kept at `orphan`
    /// when it could be kept. Otherwise `orphan` is `None` and the candidate
    /// file is removed.
    SecureErase {
        path: FPath,
        modified: bool,
        orphan: Option<FPath>,
        err: Error,
    },
    /// Renaming the candidate file over the erased original failed.
    /// The redacted copy is kept at `orphan` when it could be kept.
    Replace {
        path: FPath,
        orphan: Option<FPath>,
        err: Error,
    },
    /// A user name could not be resolved in the passwd database.
    Lookup {
        user: String,
        reason: String,
    },
}

impl RedactError {
    /// Wrap an [`Error`] from operation `op` upon `path`.
    ///
    /// [`Error`]: std::io::Error
    pub fn io(op: &'static str, path: &FPath, err: Error) -> RedactError {
        RedactError::Io {
            op,
            path: path.clone(),
            err,
        }
    }

    /// Path of the log file this error refers to, if any.
    pub fn path(&self) -> Option<&FPath> {
        match self {
            RedactError::Io { path, .. }
            | RedactError::AttributeClone { path, .. }
            | RedactError::SecureErase { path, .. }
            | RedactError::Replace { path, .. } => Some(path),
            RedactError::Lookup { .. } => None,
        }
    }

    /// Could the original file contents be lost?
    pub const fn original_at_risk(&self) -> bool {
        matches!(
            self,
            RedactError::SecureErase { modified: true, .. } | RedactError::Replace { .. }
        )
    }
}

impl fmt::Display for RedactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedactError::Io { op, path, err } => {
                write!(f, "{} failed for {:?}: {}", op, path, err)
            }
            RedactError::AttributeClone { path, err } => {
                write!(
                    f,
                    "copying owner and permissions from {:?} failed: {}; file left unmodified",
                    path, err
                )
            }
            RedactError::SecureErase { path, modified: false, err, .. } => {
                write!(f, "erasing {:?} failed: {}; file left unmodified", path, err)
            }
            RedactError::SecureErase { path, orphan: Some(orphan), err, .. } => {
                write!(
                    f,
                    "erasing {:?} failed: {}; the file may already be zeroed or truncated, the redacted copy remains at {:?}",
                    path, err, orphan
                )
            }
            RedactError::SecureErase { path, orphan: None, err, .. } => {
                write!(
                    f,
                    "erasing {:?} failed: {}; the file may already be zeroed or truncated",
                    path, err
                )
            }
            RedactError::Replace { path, orphan: Some(orphan), err } => {
                write!(
                    f,
                    "renaming {:?} to {:?} failed: {}; the original is erased, the redacted copy remains at {:?}",
                    orphan, path, err, orphan
                )
            }
            RedactError::Replace { path, orphan: None, err } => {
                write!(
                    f,
                    "renaming the redacted copy to {:?} failed: {}; the original is erased and the redacted copy is lost",
                    path, err
                )
            }
            RedactError::Lookup { user, reason } => {
                write!(f, "failed to find the user ID for {:?}: {}", user, reason)
            }
        }
    }
}

impl std::error::Error for RedactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RedactError::Io { err, .. }
            | RedactError::AttributeClone { err, .. }
            | RedactError::SecureErase { err, .. }
            | RedactError::Replace { err, .. } => Some(err),
            RedactError::Lookup { .. } => None,
        }
    }
}

/// `Result` for the per-file redaction functions.
pub type RedactResult<T> = std::result::Result<T, RedactError>;
