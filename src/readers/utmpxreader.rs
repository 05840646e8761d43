// src/readers/utmpxreader.rs

//! Implements a [`UtmpxReader`],
//! the driver of deriving [`Utmpx`s] from a [utmpx format] file.
//!
//! The reader moves forward only. Each entry is read exactly once, in file
//! order. There is no lookback and no caching of prior entries.
//!
//! [`UtmpxReader`]: self::UtmpxReader
//! [`Utmpx`s]: crate::data::utmpx::Utmpx
//! [utmpx format]: https://en.wikipedia.org/wiki/Utmp

use crate::common::{
    Count,
    FileOffset,
    ResultS3,
};
use crate::data::utmpx::{
    Utmpx,
    UTMPX_SZ,
};

use std::fmt;
use std::io::{Error, ErrorKind, Read};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// UtmpxReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`UtmpxReader::next_entry`] result.
///
/// - `Found` is the next entry.
/// - `Done` is end of stream; no more whole entries remain. Any bytes of a
///   trailing partial entry are counted in
///   [`UtmpxReader::bytes_trailing`].
/// - `Err` is a read failure.
///
/// [`UtmpxReader::next_entry`]: self::UtmpxReader#method.next_entry
/// [`UtmpxReader::bytes_trailing`]: self::UtmpxReader#method.bytes_trailing
pub type ResultS3UtmpxFind = ResultS3<Utmpx, Error>;

/// A specialized reader that reads [utmpx] entries, in order, from
/// any [`Read`].
///
/// _XXX: not a rust "Reader"; does not implement trait [`Read`]._
///
/// [utmpx]: https://en.wikipedia.org/wiki/Utmp
/// [`Read`]: std::io::Read
pub struct UtmpxReader<R: Read> {
    reader: R,
    /// `FileOffset` of the next entry to read.
    fileoffset: FileOffset,
    /// `Count` of `Utmpx`s read.
    entries_processed: Count,
    /// Bytes of a trailing partial entry found at end of stream.
    bytes_trailing: usize,
    /// Has `Done` been returned?
    done: bool,
}

impl<R: Read> fmt::Debug for UtmpxReader<R> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("UtmpxReader")
            .field("fileoffset", &self.fileoffset)
            .field("entries_processed", &self.entries_processed)
            .field("bytes_trailing", &self.bytes_trailing)
            .field("done", &self.done)
            .finish()
    }
}

impl<R: Read> UtmpxReader<R> {
    pub fn new(reader: R) -> UtmpxReader<R> {
        UtmpxReader {
            reader,
            fileoffset: 0,
            entries_processed: 0,
            bytes_trailing: 0,
            done: false,
        }
    }

    /// `Count` of `Utmpx`s read by this `UtmpxReader`.
    #[inline(always)]
    pub const fn count_entries_processed(&self) -> Count {
        self.entries_processed
    }

    /// `FileOffset` one past the last whole entry read.
    #[inline(always)]
    pub const fn fileoffset(&self) -> FileOffset {
        self.fileoffset
    }

    /// Count of bytes at the end of the stream too few to form an entry.
    /// Only meaningful after `next_entry` returned `Done`.
    #[inline(always)]
    pub const fn bytes_trailing(&self) -> usize {
        self.bytes_trailing
    }

    /// Read the next [`Utmpx`].
    ///
    /// Short reads are retried until a whole entry is read or the
    /// underlying reader returns zero bytes.
    ///
    /// [`Utmpx`]: crate::data::utmpx::Utmpx
    pub fn next_entry(&mut self) -> ResultS3UtmpxFind {
        defn!("@{}", self.fileoffset);
        if self.done {
            defx!("already done; return Done");
            return ResultS3::Done;
        }
        let mut buffer: [u8; UTMPX_SZ] = [0; UTMPX_SZ];
        let mut at: usize = 0;
        while at < UTMPX_SZ {
            match self.reader.read(&mut buffer[at..]) {
                Ok(0) => break,
                Ok(count) => at += count,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    defx!("read error {:?}; return Err", err);
                    return ResultS3::Err(err);
                }
            }
        }
        if at < UTMPX_SZ {
            self.done = true;
            self.bytes_trailing = at;
            defx!("read {} bytes of {}; return Done", at, UTMPX_SZ);
            return ResultS3::Done;
        }
        let entry = match Utmpx::from_buffer(&buffer, self.fileoffset) {
            Some(val) => val,
            None => {
                // `buffer` is always `UTMPX_SZ` here
                self.done = true;
                defx!("from_buffer failed; return Done");
                return ResultS3::Done;
            }
        };
        self.fileoffset += UTMPX_SZ as FileOffset;
        self.entries_processed += 1;
        defx!("return Found({:?})", entry);

        ResultS3::Found(entry)
    }
}
