// src/redact/predicate.rs

//! Implements [`Filters`], the user-chosen criteria for redaction, and the
//! first stage of deciding the fate of each entry.
//!
//! Precedence is fixed:
//!
//! 1. age cutoff; an entry written before the cutoff is always kept
//! 2. host; an entry from a matching host is always redacted
//! 3. everything else is decided by the [`SessionClassifier`]
//!
//! [`Filters`]: self::Filters
//! [`SessionClassifier`]: crate::redact::classifier::SessionClassifier

use crate::data::utmpx::{field_matches, tv_sec_type, Utmpx};

use std::fmt;

/// Result of [`Filters::evaluate`].
///
/// [`Filters::evaluate`]: self::Filters#method.evaluate
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// The entry predates the age cutoff. Overrides all other rules.
    KeepUnconditionally,
    /// The entry's `ut_host` matches the host filter.
    RedactByHost,
    /// Defer to session tracking.
    Evaluate,
}

/// The active redaction filters. Any may be absent.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Filters {
    user: Option<Vec<u8>>,
    host: Option<Vec<u8>>,
    cutoff: Option<tv_sec_type>,
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Filters")
            .field("user", &self.user.as_ref().map(|u| String::from_utf8_lossy(u).to_string()))
            .field("host", &self.host.as_ref().map(|h| String::from_utf8_lossy(h).to_string()))
            .field("cutoff", &self.cutoff)
            .finish()
    }
}

impl Filters {
    /// Create new `Filters`. An empty `user` or `host` is treated as absent.
    ///
    /// `cutoff` is seconds since the Unix epoch; entries written before it
    /// are never redacted.
    pub fn new(
        user: Option<&str>,
        host: Option<&str>,
        cutoff: Option<tv_sec_type>,
    ) -> Filters {
        let nonempty = |s: &str| -> Option<Vec<u8>> {
            match s.is_empty() {
                true => None,
                false => Some(s.as_bytes().to_vec()),
            }
        };
        Filters {
            user: user.and_then(nonempty),
            host: host.and_then(nonempty),
            cutoff,
        }
    }

    pub fn user(&self) -> Option<&[u8]> {
        self.user.as_deref()
    }

    pub fn host(&self) -> Option<&[u8]> {
        self.host.as_deref()
    }

    pub const fn cutoff(&self) -> Option<tv_sec_type> {
        self.cutoff
    }

    /// No user and no host; nothing could ever be redacted.
    pub const fn is_empty(&self) -> bool {
        self.user.is_none() && self.host.is_none()
    }

    /// Does the entry's `ut_user` match the user filter?
    pub fn user_matches(&self, entry: &Utmpx) -> bool {
        match &self.user {
            Some(user) => field_matches(entry.ut_user(), user),
            None => false,
        }
    }

    /// Does the entry's `ut_host` match the host filter?
    pub fn host_matches(&self, entry: &Utmpx) -> bool {
        match &self.host {
            Some(host) => field_matches(entry.ut_host(), host),
            None => false,
        }
    }

    /// Is the entry older than the age cutoff?
    pub fn predates_cutoff(&self, entry: &Utmpx) -> bool {
        match self.cutoff {
            Some(cutoff) => entry.tv_sec() < cutoff,
            None => false,
        }
    }

    /// The first stage of deciding the fate of `entry`.
    pub fn evaluate(&self, entry: &Utmpx) -> Verdict {
        if self.predates_cutoff(entry) {
            return Verdict::KeepUnconditionally;
        }
        if self.host_matches(entry) {
            return Verdict::RedactByHost;
        }

        Verdict::Evaluate
    }
}
