// src/redact/tracker.rs

//! Implements a [`SessionTracker`], the set of terminal lines with an open
//! session belonging to a redacted user.
//!
//! When a user logs out, the login service writes a `DEAD_PROCESS` entry
//! for the same `ut_line` with an empty `ut_user`. So the logout entry can
//! only be tied to its login entry by the line, e.g. for user Fred on `tty1`:
//!
//! ```text
//! USER_PROCESS  user: Fred   line: tty1  03/06/2018 09:05:19
//! DEAD_PROCESS  user:        line: tty1  03/06/2018 09:05:40
//! LOGIN_PROCESS user: LOGIN  line: tty1  03/06/2018 09:05:40
//! ```
//!
//! [`SessionTracker`]: self::SessionTracker

use crate::data::utmpx::{trim_nul, UT_LINESIZE};

use std::collections::HashSet;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A `ut_line` normalized so every byte after the first NUL is also NUL.
pub type LineKey = [u8; UT_LINESIZE];

/// Normalize a `ut_line` field into a [`LineKey`].
pub fn line_key(line: &[u8]) -> LineKey {
    let line = trim_nul(line);
    let mut key: LineKey = [0; UT_LINESIZE];
    let len = std::cmp::min(line.len(), UT_LINESIZE);
    key[..len].copy_from_slice(&line[..len]);

    key
}

/// Tracks which lines currently hold a session that is being redacted.
///
/// Owned by one pass over one file. Holds at most one key per open session.
#[derive(Debug, Default)]
pub struct SessionTracker {
    lines: HashSet<LineKey>,
}

impl SessionTracker {
    pub fn new() -> SessionTracker {
        SessionTracker {
            lines: HashSet::new(),
        }
    }

    /// A matched login was seen on `line`.
    pub fn observe_login(&mut self, line: &[u8]) {
        let key = line_key(line);
        let _inserted = self.lines.insert(key);
        defñ!("line {:?} inserted {}", String::from_utf8_lossy(trim_nul(&key)), _inserted);
    }

    /// A logout was seen on `line`. Returns `true` if `line` was tracked,
    /// which means the logout belongs to a redacted session. The line is
    /// no longer tracked afterward.
    pub fn observe_logout(&mut self, line: &[u8]) -> bool {
        let removed = self.lines.remove(&line_key(line));
        defñ!("line {:?} removed {}", String::from_utf8_lossy(trim_nul(line)), removed);

        removed
    }

    /// Forget all tracked lines. A reboot ends every session.
    pub fn reset(&mut self) {
        defñ!("clear {} lines", self.lines.len());
        self.lines.clear();
    }

    pub fn contains(&self, line: &[u8]) -> bool {
        self.lines.contains(&line_key(line))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
