// src/lib.rs

//! _utredactlib_ removes entries from the login accounting files `utmp`,
//! `wtmp`, and `btmp`, keeping each login session consistent.
//!
//! Redacting a user's login entry without its logout entry leaves an
//! anonymous logout behind. _utredactlib_ pairs each redacted login with the
//! later logout on the same terminal line and removes both.
//!
//! Start with [`LogRedactor`].
//!
//! [`LogRedactor`]: crate::redact::redactor::LogRedactor

pub mod common;
pub mod data;
pub mod debug;
pub mod readers;
pub mod redact;
#[cfg(test)]
pub mod tests;
