// src/redact/mod.rs

//! Session-consistent redaction of login accounting files.
//!
//! A [`LogRedactor`] rewrites one file at a time. Each entry is first judged
//! by the [`Filters`], then by a [`SessionClassifier`] which pairs logins
//! with their anonymous logouts using a [`SessionTracker`]. Kept entries are
//! written by [`rewrite_entries`] to a candidate file which finally
//! [`replace`]s the original.
//!
//! [`LogRedactor`]: crate::redact::redactor::LogRedactor
//! [`Filters`]: crate::redact::predicate::Filters
//! [`SessionClassifier`]: crate::redact::classifier::SessionClassifier
//! [`SessionTracker`]: crate::redact::tracker::SessionTracker
//! [`rewrite_entries`]: crate::redact::rewriter::rewrite_entries
//! [`replace`]: crate::redact::replacer::replace

pub mod classifier;
pub mod predicate;
pub mod redactor;
pub mod replacer;
pub mod rewriter;
pub mod tracker;
