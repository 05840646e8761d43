// src/redact/redactor.rs

//! Implements a [`LogRedactor`], the per-file driver.
//!
//! For one file path a `LogRedactor`
//!
//! 1. opens the file for reading
//! 2. creates a candidate file in the same directory
//! 3. streams every entry through a new [`SessionClassifier`], writing kept
//!    entries to the candidate
//! 4. replaces the original with the candidate, see [`replace`]
//!
//! Any failure before step 4 leaves the original untouched and removes the
//! candidate.
//!
//! [`LogRedactor`]: self::LogRedactor
//! [`SessionClassifier`]: crate::redact::classifier::SessionClassifier
//! [`replace`]: crate::redact::replacer::replace

use crate::common::{Count, FPath, File, RedactError, RedactResult};
use crate::redact::classifier::{HostSessionPolicy, SessionClassifier};
use crate::redact::predicate::Filters;
use crate::redact::replacer::replace;
use crate::redact::rewriter::{rewrite_entries, RewriteCounts};

use std::fmt;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ::nix::unistd::User;
use ::tempfile::NamedTempFile;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Prefix of candidate file names.
pub const CANDIDATE_PREFIX: &str = ".x";

/// Outcome of one successful [`LogRedactor::redact_path`].
///
/// [`LogRedactor::redact_path`]: self::LogRedactor#method.redact_path
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RedactSummary {
    pub path: FPath,
    /// Whole entries read.
    pub total: Count,
    /// Entries removed.
    pub redacted: Count,
    /// Bytes of a trailing partial entry that were dropped.
    pub bytes_trailing: usize,
    /// The original file was not modified.
    pub dry_run: bool,
}

impl RedactSummary {
    fn new(path: &FPath, counts: RewriteCounts, dry_run: bool) -> RedactSummary {
        RedactSummary {
            path: path.clone(),
            total: counts.total,
            redacted: counts.redacted,
            bytes_trailing: counts.bytes_trailing,
            dry_run,
        }
    }

    pub const fn kept(&self) -> Count {
        self.total - self.redacted
    }
}

impl fmt::Display for RedactSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.dry_run {
            true => write!(
                f,
                "Would redact {} out of {} records in {}",
                self.redacted, self.total, self.path
            ),
            false => write!(f, "Redacted {} out of {} records in {}", self.redacted, self.total, self.path),
        }
    }
}

/// Redacts log files according to one set of [`Filters`].
///
/// Each call to `redact_path` is independent; no session state carries
/// over between files.
///
/// [`Filters`]: crate::redact::predicate::Filters
#[derive(Clone, Debug)]
pub struct LogRedactor {
    filters: Filters,
    host_policy: HostSessionPolicy,
    dry_run: bool,
}

impl LogRedactor {
    pub fn new(filters: Filters) -> LogRedactor {
        LogRedactor {
            filters,
            host_policy: HostSessionPolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_host_policy(mut self, host_policy: HostSessionPolicy) -> LogRedactor {
        self.host_policy = host_policy;
        self
    }

    /// Classify and count but never modify any file.
    pub fn with_dry_run(mut self, dry_run: bool) -> LogRedactor {
        self.dry_run = dry_run;
        self
    }

    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    pub const fn host_policy(&self) -> HostSessionPolicy {
        self.host_policy
    }

    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Redact the log file at `path` in place.
    pub fn redact_path(&self, path: &FPath) -> RedactResult<RedactSummary> {
        self.redact_path_with(path, |file| file)
    }

    /// Like `redact_path` but candidate writes go through the writer
    /// returned by `wrap`.
    pub(crate) fn redact_path_with<W, F>(&self, path: &FPath, wrap: F) -> RedactResult<RedactSummary>
    where
        W: Write,
        F: FnOnce(File) -> W,
    {
        defn!("{:?} dry_run {}", path, self.dry_run);
        let input: File = match File::open(path) {
            Ok(val) => val,
            Err(err) => {
                defx!("open failed {:?}", err);
                return Err(RedactError::io("open", path, err));
            }
        };
        let mut classifier = SessionClassifier::new(&self.filters, self.host_policy);

        if self.dry_run {
            let counts = rewrite_entries(BufReader::new(input), &mut std::io::sink(), &mut classifier, path)?;
            defx!("dry run {:?}", counts);
            return Ok(RedactSummary::new(path, counts, true));
        }

        // a symbolic link is followed; the file it points to is replaced
        let target: FPath = match std::fs::canonicalize(path) {
            Ok(pathbuf) => pathbuf.to_string_lossy().to_string(),
            Err(err) => {
                defx!("canonicalize failed {:?}", err);
                return Err(RedactError::io("resolve", path, err));
            }
        };
        defo!("target {:?}", target);

        // same directory so the final rename never crosses filesystems
        let candidate: NamedTempFile = ::tempfile::Builder::new()
            .prefix(CANDIDATE_PREFIX)
            .tempfile_in(candidate_dir(&target))
            .map_err(|err| RedactError::io("create candidate file", path, err))?;
        defo!("candidate {:?}", candidate.path());
        let file: File = candidate
            .as_file()
            .try_clone()
            .map_err(|err| RedactError::io("create candidate file", path, err))?;
        let mut writer = BufWriter::new(wrap(file));
        let counts = rewrite_entries(BufReader::new(input), &mut writer, &mut classifier, path)?;
        writer
            .flush()
            .map_err(|err| RedactError::io("write", path, err))?;
        drop(writer);
        candidate
            .as_file()
            .sync_all()
            .map_err(|err| RedactError::io("sync", path, err))?;

        replace(&target, candidate)?;
        defx!("{:?}", counts);

        Ok(RedactSummary::new(path, counts, false))
    }
}

/// Directory of `path`, or `.` if `path` has no directory part.
fn candidate_dir(path: &FPath) -> &Path {
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Find `user` in the passwd database.
///
/// Returns the user ID.
pub fn lookup_user(user: &str) -> RedactResult<u32> {
    defñ!("{:?}", user);
    match User::from_name(user) {
        Ok(Some(entry)) => Ok(entry.uid.as_raw()),
        Ok(None) => Err(RedactError::Lookup {
            user: user.to_string(),
            reason: String::from("no such user"),
        }),
        Err(errno) => Err(RedactError::Lookup {
            user: user.to_string(),
            reason: errno.desc().to_string(),
        }),
    }
}
