// src/redact/classifier.rs

//! Implements a [`SessionClassifier`], which decides for each [`Utmpx`] of
//! one file whether it is kept or redacted.
//!
//! Entries are classified strictly in file order. A logout entry does not
//! name its user, so a logout is redacted only when an earlier redacted
//! login on the same line is still open. The placeholder `LOGIN_PROCESS`
//! entry that immediately follows a redacted logout is redacted too.
//!
//! [`SessionClassifier`]: self::SessionClassifier
//! [`Utmpx`]: crate::data::utmpx::Utmpx

use crate::data::utmpx::{UtType, Utmpx};
use crate::redact::predicate::{Filters, Verdict};
use crate::redact::tracker::SessionTracker;

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// How entries redacted by a host match take part in session tracking.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HostSessionPolicy {
    /// Host-matched entries are redacted and otherwise ignored. Their
    /// logouts are only redacted if they also match the host.
    #[default]
    Bypass,
    /// Host-matched logins are tracked so their anonymous logouts and
    /// following `LOGIN_PROCESS` placeholders are redacted too.
    Track,
}

/// Why an entry was redacted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedactReason {
    /// `ut_host` matched the host filter.
    Host,
    /// `USER_PROCESS` by the target user.
    UserLogin,
    /// `DEAD_PROCESS` naming the target user.
    UserLogout,
    /// Anonymous `DEAD_PROCESS` on a tracked line.
    TrackedLogout,
    /// `LOGIN_PROCESS` directly after a redacted logout.
    LoginPlaceholder,
}

/// Result of [`SessionClassifier::classify`].
///
/// [`SessionClassifier::classify`]: self::SessionClassifier#method.classify
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Keep,
    Redact(RedactReason),
}

impl Decision {
    pub const fn is_redact(&self) -> bool {
        matches!(self, Decision::Redact(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decision::Keep => write!(f, "keep"),
            Decision::Redact(reason) => write!(f, "redact ({:?})", reason),
        }
    }
}

/// Classifies the entries of one file, in order.
///
/// Create a new `SessionClassifier` for each file; session state never
/// carries over from one file to another.
#[derive(Debug)]
pub struct SessionClassifier<'a> {
    filters: &'a Filters,
    host_policy: HostSessionPolicy,
    tracker: SessionTracker,
    /// The previous entry was a redacted logout.
    pending_login: bool,
}

impl<'a> SessionClassifier<'a> {
    pub fn new(filters: &'a Filters, host_policy: HostSessionPolicy) -> SessionClassifier<'a> {
        SessionClassifier {
            filters,
            host_policy,
            tracker: SessionTracker::new(),
            pending_login: false,
        }
    }

    pub const fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub const fn pending_login(&self) -> bool {
        self.pending_login
    }

    /// Decide the fate of the next `entry` in file order.
    pub fn classify(&mut self, entry: &Utmpx) -> Decision {
        defn!("{:?}", entry);
        // only the entry directly after a redacted logout may consume it
        let pending: bool = std::mem::replace(&mut self.pending_login, false);
        let ut_type = entry.ut_type();
        if ut_type == UtType::BootTime {
            self.tracker.reset();
        }

        let decision = match self.filters.evaluate(entry) {
            Verdict::KeepUnconditionally => Decision::Keep,
            Verdict::RedactByHost => {
                if self.host_policy == HostSessionPolicy::Track {
                    self.track_host_entry(entry);
                }
                Decision::Redact(RedactReason::Host)
            }
            Verdict::Evaluate => self.classify_session(entry, ut_type, pending),
        };
        defx!("{}", decision);

        decision
    }

    fn track_host_entry(&mut self, entry: &Utmpx) {
        match entry.ut_type() {
            UtType::UserProcess => self.tracker.observe_login(entry.ut_line()),
            UtType::DeadProcess => {
                if self.tracker.observe_logout(entry.ut_line()) {
                    self.pending_login = true;
                }
            }
            _ => {}
        }
    }

    fn classify_session(&mut self, entry: &Utmpx, ut_type: UtType, pending: bool) -> Decision {
        let user_match: bool = self.filters.user_matches(entry);
        match ut_type {
            UtType::UserProcess if user_match => {
                self.tracker.observe_login(entry.ut_line());
                Decision::Redact(RedactReason::UserLogin)
            }
            UtType::DeadProcess if user_match => {
                self.tracker.observe_logout(entry.ut_line());
                Decision::Redact(RedactReason::UserLogout)
            }
            UtType::DeadProcess if entry.user_is_empty() => {
                if self.tracker.observe_logout(entry.ut_line()) {
                    self.pending_login = true;
                    Decision::Redact(RedactReason::TrackedLogout)
                } else {
                    Decision::Keep
                }
            }
            UtType::LoginProcess if pending => Decision::Redact(RedactReason::LoginPlaceholder),
            _ => Decision::Keep,
        }
    }
}
