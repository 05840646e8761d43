// src/tests/utmpxreader_tests.rs

//! tests for `utmpxreader.rs`

#![allow(non_snake_case)]

use crate::common::{FileOffset, ResultS3};
use crate::data::utmpx::{Utmpx, UTMPX_SZ};
use crate::debug::helpers::entries_to_bytes;
use crate::readers::utmpxreader::UtmpxReader;
use crate::tests::common::ENTRIES_ALICE_BOB;

use std::io::{Cursor, Error, ErrorKind, Read};

use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Returns at most `chunk` bytes per `read`, and `Interrupted` before every
/// other read.
struct ChunkedReader {
    data: Cursor<Vec<u8>>,
    chunk: usize,
    interrupt: bool,
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(Error::new(ErrorKind::Interrupted, "interrupted"));
        }
        let len = std::cmp::min(buf.len(), self.chunk);
        self.data.read(&mut buf[..len])
    }
}

/// Returns `data` then fails.
struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(Error::new(ErrorKind::Other, "device gone")),
            count => Ok(count),
        }
    }
}

/// Read every entry; panic on `Err`.
fn read_all<R: Read>(reader: &mut UtmpxReader<R>) -> Vec<Utmpx> {
    let mut entries: Vec<Utmpx> = Vec::new();
    loop {
        match reader.next_entry() {
            ResultS3::Found(entry) => entries.push(entry),
            ResultS3::Done => break,
            ResultS3::Err(err) => panic!("next_entry() returned Err {}", err),
        }
    }

    entries
}

#[test]
fn test_UtmpxReader_empty() {
    let mut reader = UtmpxReader::new(Cursor::new(Vec::<u8>::new()));
    assert!(reader.next_entry().is_done());
    assert_eq!(reader.count_entries_processed(), 0);
    assert_eq!(reader.bytes_trailing(), 0);
}

#[test]
fn test_UtmpxReader_entries_in_order() {
    let data = entries_to_bytes(&ENTRIES_ALICE_BOB);
    let mut reader = UtmpxReader::new(Cursor::new(data));
    let entries = read_all(&mut reader);
    assert_eq!(entries.len(), ENTRIES_ALICE_BOB.len());
    for (at, (entry, expect)) in entries.iter().zip(ENTRIES_ALICE_BOB.iter()).enumerate() {
        assert_eq!(entry.as_bytes(), expect.as_bytes(), "entry {}", at);
        assert_eq!(entry.fileoffset_begin(), (at * UTMPX_SZ) as FileOffset);
    }
    assert_eq!(reader.count_entries_processed(), 5);
    assert_eq!(reader.fileoffset(), (5 * UTMPX_SZ) as FileOffset);
    assert_eq!(reader.bytes_trailing(), 0);
    // stays done
    assert!(reader.next_entry().is_done());
}

#[test_case(1)]
#[test_case(100)]
#[test_case(UTMPX_SZ - 1)]
fn test_UtmpxReader_trailing_partial(trailing: usize) {
    let mut data = entries_to_bytes(&ENTRIES_ALICE_BOB[..2]);
    data.extend_from_slice(&ENTRIES_ALICE_BOB[2].as_bytes()[..trailing]);
    let mut reader = UtmpxReader::new(Cursor::new(data));
    let entries = read_all(&mut reader);
    assert_eq!(entries.len(), 2);
    assert_eq!(reader.bytes_trailing(), trailing);
    assert_eq!(reader.fileoffset(), (2 * UTMPX_SZ) as FileOffset);
}

#[test_case(1)]
#[test_case(7)]
#[test_case(UTMPX_SZ + 3)]
fn test_UtmpxReader_short_reads(chunk: usize) {
    let data = entries_to_bytes(&ENTRIES_ALICE_BOB);
    let mut reader = UtmpxReader::new(ChunkedReader {
        data: Cursor::new(data),
        chunk,
        interrupt: false,
    });
    let entries = read_all(&mut reader);
    assert_eq!(entries.len(), ENTRIES_ALICE_BOB.len());
    assert_eq!(entries[4].as_bytes(), ENTRIES_ALICE_BOB[4].as_bytes());
    assert_eq!(reader.bytes_trailing(), 0);
}

#[test]
fn test_UtmpxReader_read_error() {
    let data = entries_to_bytes(&ENTRIES_ALICE_BOB[..1]);
    let mut reader = UtmpxReader::new(FailingReader {
        data: Cursor::new(data),
    });
    assert!(reader.next_entry().is_found());
    match reader.next_entry() {
        ResultS3::Err(err) => assert_eq!(err.kind(), ErrorKind::Other),
        ret => panic!("expected Err, got {}", ret),
    }
}
