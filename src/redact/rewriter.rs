// src/redact/rewriter.rs

//! Streams the entries of one file through a [`SessionClassifier`], writing
//! each kept entry, unchanged, to an output.
//!
//! [`SessionClassifier`]: crate::redact::classifier::SessionClassifier

use crate::common::{Count, FPath, RedactError, RedactResult, ResultS3};
use crate::data::utmpx::Utmpx;
use crate::readers::utmpxreader::UtmpxReader;
use crate::redact::classifier::{Decision, SessionClassifier};

use std::io::{Read, Write};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Tallies of one pass over one file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RewriteCounts {
    /// Whole entries read.
    pub total: Count,
    /// Entries not written to the output.
    pub redacted: Count,
    /// Bytes of a trailing partial entry. These are never written.
    pub bytes_trailing: usize,
}

/// Read every whole entry from `input`, classify it, and write kept entries
/// to `output` byte-for-byte. Relative order of kept entries is preserved.
///
/// `path` is only used for error messages.
pub fn rewrite_entries<R: Read, W: Write>(
    input: R,
    output: &mut W,
    classifier: &mut SessionClassifier,
    path: &FPath,
) -> RedactResult<RewriteCounts> {
    defn!("{:?}", path);
    let mut reader = UtmpxReader::new(input);
    let mut counts = RewriteCounts::default();
    loop {
        let entry: Utmpx = match reader.next_entry() {
            ResultS3::Found(entry) => entry,
            ResultS3::Done => break,
            ResultS3::Err(err) => {
                defx!("read error {:?}", err);
                return Err(RedactError::io("read", path, err));
            }
        };
        counts.total += 1;
        match classifier.classify(&entry) {
            Decision::Keep => {
                if let Err(err) = output.write_all(entry.as_bytes()) {
                    defx!("write error {:?}", err);
                    return Err(RedactError::io("write", path, err));
                }
            }
            Decision::Redact(_reason) => {
                defo!("redact @{} {:?}", entry.fileoffset_begin(), _reason);
                counts.redacted += 1;
            }
        }
    }
    counts.bytes_trailing = reader.bytes_trailing();
    defx!("{:?}", counts);

    Ok(counts)
}
