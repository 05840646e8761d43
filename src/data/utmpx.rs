// src/data/utmpx.rs

//! Implement [`Utmpx`], one fixed-size [`utmpx`] record of a `utmp`, `wtmp`,
//! or `btmp` file (sometimes referred to as the older [`utmp`] C struct).
//!
//! A `Utmpx` holds the exact bytes read from the file. Field accessors decode
//! from those bytes, and [`Utmpx::as_bytes`] returns them unchanged, so an
//! entry that is kept is written back byte-for-byte, padding and reserved
//! bytes included.
//!
//! [`Utmpx`]: self::Utmpx
//! [`Utmpx::as_bytes`]: self::Utmpx#method.as_bytes
//! [`utmpx`]: https://man7.org/linux/man-pages/man5/utmp.5.html
//! [`utmp`]: https://elixir.bootlin.com/glibc/glibc-2.37/source/bits/utmp.h#L57

use crate::common::FileOffset;
#[cfg(any(debug_assertions, test))]
use crate::debug::printers::buffer_to_String_noraw;

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The on-disk layout shared by Linux glibc on x86_64, x86, and aarch64.
///
/// The `ut_session` and `ut_tv` fields are 32 bits on all these platforms
/// so files may be shared between 32-bit and 64-bit programs.
#[allow(non_camel_case_types)]
pub mod linux_gnu {
    use crate::common::FileOffset;
    use std::mem::size_of;

    use ::const_format::assertcp_eq;
    use ::memoffset::offset_of;

    pub const UT_LINESIZE: usize = 32;
    pub const UT_IDSIZE: usize = 4;
    pub const UT_NAMESIZE: usize = 32;
    pub const UT_HOSTSIZE: usize = 256;

    #[doc(hidden)]
    #[derive(Clone, Copy)]
    #[repr(C, align(4))]
    pub struct __timeval {
        pub tv_sec: i32,
        pub tv_usec: i32,
    }

    #[doc(hidden)]
    #[derive(Clone, Copy)]
    #[repr(C, align(2))]
    pub struct __exit_status {
        pub e_termination: i16,
        pub e_exit: i16,
    }

    /// Layout of the `utmpx` struct. Never instantiated; it exists so the
    /// field offsets below are derived by the compiler.
    ///
    /// ```text
    /// utmpx                   sizeof 384
    /// utmpx.ut_type      @  0 sizeof   2
    /// utmpx.ut_pid       @  4 sizeof   4
    /// utmpx.ut_line      @  8 sizeof  32
    /// utmpx.ut_id        @ 40 sizeof   4
    /// utmpx.ut_user      @ 44 sizeof  32
    /// utmpx.ut_host      @ 76 sizeof 256
    /// utmpx.ut_exit      @332 sizeof   4
    /// utmpx.ut_session   @336 sizeof   4
    /// utmpx.ut_tv.tv_sec @340 sizeof   4
    /// utmpx.ut_tv.tv_usec@344 sizeof   4
    /// utmpx.ut_addr_v6   @348 sizeof  16
    /// ```
    #[doc(hidden)]
    #[allow(dead_code)]
    #[derive(Clone, Copy)]
    #[repr(C, align(4))]
    pub struct utmpx {
        pub ut_type: i16,
        pub ut_pid: i32,
        pub ut_line: [u8; UT_LINESIZE],
        pub ut_id: [u8; UT_IDSIZE],
        pub ut_user: [u8; UT_NAMESIZE],
        pub ut_host: [u8; UT_HOSTSIZE],
        pub ut_exit: __exit_status,
        pub ut_session: i32,
        pub ut_tv: __timeval,
        pub ut_addr_v6: [i32; 4],
        pub __glibc_reserved: [u8; 20],
    }

    /// [`size_of::<utmpx>`]; 384.
    ///
    /// [`size_of::<utmpx>`]: std::mem::size_of
    pub const UTMPX_SZ: usize = size_of::<utmpx>();
    /// [`UTMPX_SZ`] as a [`FileOffset`].
    ///
    /// [`FileOffset`]: crate::common::FileOffset
    pub const UTMPX_SZ_FO: FileOffset = UTMPX_SZ as FileOffset;

    pub const UT_TYPE_OFFSET: usize = offset_of!(utmpx, ut_type);
    pub const UT_PID_OFFSET: usize = offset_of!(utmpx, ut_pid);
    pub const UT_LINE_OFFSET: usize = offset_of!(utmpx, ut_line);
    pub const UT_ID_OFFSET: usize = offset_of!(utmpx, ut_id);
    pub const UT_USER_OFFSET: usize = offset_of!(utmpx, ut_user);
    pub const UT_HOST_OFFSET: usize = offset_of!(utmpx, ut_host);
    pub const UT_TV_SEC_OFFSET: usize = offset_of!(utmpx, ut_tv) + offset_of!(__timeval, tv_sec);
    pub const UT_TV_USEC_OFFSET: usize = offset_of!(utmpx, ut_tv) + offset_of!(__timeval, tv_usec);

    assertcp_eq!(UTMPX_SZ, 384);
    assertcp_eq!(UT_TYPE_OFFSET, 0);
    assertcp_eq!(UT_PID_OFFSET, 4);
    assertcp_eq!(UT_LINE_OFFSET, 8);
    assertcp_eq!(UT_ID_OFFSET, 40);
    assertcp_eq!(UT_USER_OFFSET, 44);
    assertcp_eq!(UT_HOST_OFFSET, 76);
    assertcp_eq!(offset_of!(utmpx, ut_exit), 332);
    assertcp_eq!(offset_of!(utmpx, ut_session), 336);
    assertcp_eq!(UT_TV_SEC_OFFSET, 340);
    assertcp_eq!(UT_TV_USEC_OFFSET, 344);
    assertcp_eq!(offset_of!(utmpx, ut_addr_v6), 348);
    assertcp_eq!(offset_of!(utmpx, __glibc_reserved), 364);
}

pub use linux_gnu::{
    UTMPX_SZ,
    UTMPX_SZ_FO,
    UT_HOSTSIZE,
    UT_LINESIZE,
    UT_NAMESIZE,
};
use linux_gnu::{
    UT_HOST_OFFSET,
    UT_LINE_OFFSET,
    UT_PID_OFFSET,
    UT_TV_SEC_OFFSET,
    UT_TV_USEC_OFFSET,
    UT_TYPE_OFFSET,
    UT_USER_OFFSET,
};

/// Seconds since the Unix epoch, as stored in `ut_tv.tv_sec`.
#[allow(non_camel_case_types)]
pub type tv_sec_type = i64;

/// Map [`.ut_type`] value, implied in the index offset, to a `str`
/// representation.
///
/// See [`man utmp`].
///
/// [`.ut_type`]: https://docs.rs/uapi/0.2.10/uapi/c/struct.utmpx.html#structfield.ut_type
/// [`man utmp`]: https://man7.org/linux/man-pages/man5/utmp.5.html
pub const UT_TYPE_VAL_TO_STR: &[&str] = &[
    "EMPTY",
    "RUN_LVL",
    "BOOT_TIME",
    "NEW_TIME",
    "OLD_TIME",
    "INIT_PROCESS",
    "LOGIN_PROCESS",
    "USER_PROCESS",
    "DEAD_PROCESS",
    "ACCOUNTING",
];

/// The `ut_type` of a [`Utmpx`].
///
/// ```text
/// #define EMPTY         0 /* Record does not contain valid info */
/// #define RUN_LVL       1 /* Change in system run-level (see init(8)) */
/// #define BOOT_TIME     2 /* Time of system boot (in ut_tv) */
/// #define NEW_TIME      3 /* Time after system clock change (in ut_tv) */
/// #define OLD_TIME      4 /* Time before system clock change (in ut_tv) */
/// #define INIT_PROCESS  5 /* Process spawned by init(8) */
/// #define LOGIN_PROCESS 6 /* Session leader process for user login */
/// #define USER_PROCESS  7 /* Normal process */
/// #define DEAD_PROCESS  8 /* Terminated process */
/// #define ACCOUNTING    9 /* Not implemented */
/// ```
///
/// Values outside that range are carried as `Unknown`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UtType {
    Empty,
    RunLvl,
    BootTime,
    NewTime,
    OldTime,
    InitProcess,
    LoginProcess,
    UserProcess,
    DeadProcess,
    Accounting,
    Unknown(i16),
}

impl UtType {
    pub const fn from_i16(val: i16) -> UtType {
        match val {
            0 => UtType::Empty,
            1 => UtType::RunLvl,
            2 => UtType::BootTime,
            3 => UtType::NewTime,
            4 => UtType::OldTime,
            5 => UtType::InitProcess,
            6 => UtType::LoginProcess,
            7 => UtType::UserProcess,
            8 => UtType::DeadProcess,
            9 => UtType::Accounting,
            _ => UtType::Unknown(val),
        }
    }

    pub const fn as_i16(&self) -> i16 {
        match self {
            UtType::Empty => 0,
            UtType::RunLvl => 1,
            UtType::BootTime => 2,
            UtType::NewTime => 3,
            UtType::OldTime => 4,
            UtType::InitProcess => 5,
            UtType::LoginProcess => 6,
            UtType::UserProcess => 7,
            UtType::DeadProcess => 8,
            UtType::Accounting => 9,
            UtType::Unknown(val) => *val,
        }
    }

    /// Name as used in `utmp.h`, or `"UNKNOWN"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            UtType::Unknown(_) => "UNKNOWN",
            _ => UT_TYPE_VAL_TO_STR[self.as_i16() as usize],
        }
    }
}

impl fmt::Display for UtType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UtType::Unknown(val) => write!(f, "UNKNOWN({})", val),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// fixed-width string fields
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The bytes of a NUL-padded fixed-width `field` up to, and not including,
/// the first NUL. A field without any NUL is returned whole.
pub fn trim_nul(field: &[u8]) -> &[u8] {
    match field.iter().position(|b| *b == 0) {
        Some(at) => &field[..at],
        None => field,
    }
}

/// Compare a fixed-width NUL-padded `field` to a user-passed `pattern`.
///
/// Only the first `min(pattern length, field length)` bytes are compared,
/// where field length is the length up to the first NUL. Writers of these
/// files truncate long names to the field width and some write shorter
/// names than others, so a full-buffer equality would miss entries.
///
/// An empty field or an empty pattern never matches.
pub fn field_matches(field: &[u8], pattern: &[u8]) -> bool {
    let field = trim_nul(field);
    if field.is_empty() || pattern.is_empty() {
        return false;
    }
    let len = std::cmp::min(field.len(), pattern.len());

    field[..len] == pattern[..len]
}

/// Copy `val` into fixed-width `field`, truncating to the field width.
/// Remaining bytes of `field` are set to NUL.
fn set_field(field: &mut [u8], val: &[u8]) {
    let len = std::cmp::min(field.len(), val.len());
    field[..len].copy_from_slice(&val[..len]);
    for b in field[len..].iter_mut() {
        *b = 0;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Utmpx
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One user accounting record and the [`FileOffset`] where it began.
///
/// [`FileOffset`]: crate::common::FileOffset
#[derive(Clone, Eq, PartialEq)]
pub struct Utmpx {
    /// The exact bytes of the entry.
    buffer: [u8; UTMPX_SZ],
    /// The byte offset into the file where the entry begins.
    fileoffset: FileOffset,
}

impl Utmpx {
    /// Decode one entry from the start of `buffer`.
    ///
    /// Returns `None` if `buffer` holds fewer than [`UTMPX_SZ`] bytes,
    /// i.e. a truncated entry.
    pub fn from_buffer(buffer: &[u8], fileoffset: FileOffset) -> Option<Utmpx> {
        if buffer.len() < UTMPX_SZ {
            defñ!("buffer too small; {}, require {}", buffer.len(), UTMPX_SZ);
            return None;
        }
        let mut buffer_: [u8; UTMPX_SZ] = [0; UTMPX_SZ];
        buffer_.copy_from_slice(&buffer[..UTMPX_SZ]);

        Some(Utmpx { buffer: buffer_, fileoffset })
    }

    /// Create a new `Utmpx` from field values. Other fields are zero.
    ///
    /// Strings longer than their field are truncated.
    pub fn new(
        ut_type: UtType,
        ut_pid: i32,
        ut_line: &str,
        ut_user: &str,
        ut_host: &str,
        tv_sec: i32,
    ) -> Utmpx {
        let mut buffer: [u8; UTMPX_SZ] = [0; UTMPX_SZ];
        buffer[UT_TYPE_OFFSET..UT_TYPE_OFFSET + 2].copy_from_slice(&ut_type.as_i16().to_ne_bytes());
        buffer[UT_PID_OFFSET..UT_PID_OFFSET + 4].copy_from_slice(&ut_pid.to_ne_bytes());
        set_field(&mut buffer[UT_LINE_OFFSET..UT_LINE_OFFSET + UT_LINESIZE], ut_line.as_bytes());
        set_field(&mut buffer[UT_USER_OFFSET..UT_USER_OFFSET + UT_NAMESIZE], ut_user.as_bytes());
        set_field(&mut buffer[UT_HOST_OFFSET..UT_HOST_OFFSET + UT_HOSTSIZE], ut_host.as_bytes());
        buffer[UT_TV_SEC_OFFSET..UT_TV_SEC_OFFSET + 4].copy_from_slice(&tv_sec.to_ne_bytes());

        Utmpx { buffer, fileoffset: 0 }
    }

    /// Set the [`FileOffset`] of this entry.
    ///
    /// [`FileOffset`]: crate::common::FileOffset
    pub fn with_fileoffset(mut self, fileoffset: FileOffset) -> Utmpx {
        self.fileoffset = fileoffset;

        self
    }

    #[inline(always)]
    fn i16_at(&self, at: usize) -> i16 {
        i16::from_ne_bytes([self.buffer[at], self.buffer[at + 1]])
    }

    #[inline(always)]
    fn i32_at(&self, at: usize) -> i32 {
        i32::from_ne_bytes([
            self.buffer[at],
            self.buffer[at + 1],
            self.buffer[at + 2],
            self.buffer[at + 3],
        ])
    }

    pub fn ut_type(&self) -> UtType {
        UtType::from_i16(self.i16_at(UT_TYPE_OFFSET))
    }

    pub fn ut_pid(&self) -> i32 {
        self.i32_at(UT_PID_OFFSET)
    }

    /// The full fixed-width `ut_line` field, NUL padding included.
    pub fn ut_line(&self) -> &[u8] {
        &self.buffer[UT_LINE_OFFSET..UT_LINE_OFFSET + UT_LINESIZE]
    }

    /// The full fixed-width `ut_user` field, NUL padding included.
    pub fn ut_user(&self) -> &[u8] {
        &self.buffer[UT_USER_OFFSET..UT_USER_OFFSET + UT_NAMESIZE]
    }

    /// The full fixed-width `ut_host` field, NUL padding included.
    pub fn ut_host(&self) -> &[u8] {
        &self.buffer[UT_HOST_OFFSET..UT_HOST_OFFSET + UT_HOSTSIZE]
    }

    /// `ut_tv.tv_sec`; the time the entry was written.
    pub fn tv_sec(&self) -> tv_sec_type {
        self.i32_at(UT_TV_SEC_OFFSET) as tv_sec_type
    }

    pub fn tv_usec(&self) -> i32 {
        self.i32_at(UT_TV_USEC_OFFSET)
    }

    /// `ut_user` is empty, as it is for logout entries.
    pub fn user_is_empty(&self) -> bool {
        trim_nul(self.ut_user()).is_empty()
    }

    /// The exact bytes of this entry, as read or created.
    pub const fn as_bytes(&self) -> &[u8; UTMPX_SZ] {
        &self.buffer
    }

    /// Copy of the exact bytes of this entry.
    pub const fn encode(&self) -> [u8; UTMPX_SZ] {
        self.buffer
    }

    pub const fn len(&self) -> usize {
        UTMPX_SZ
    }

    /// Clippy recommends `fn is_empty` since there is a `len()`.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// [`FileOffset`] at beginning of the `Utmpx` (inclusive).
    ///
    /// [`FileOffset`]: crate::common::FileOffset
    pub const fn fileoffset_begin(&self) -> FileOffset {
        self.fileoffset
    }

    /// [`FileOffset`] at one byte past ending of the `Utmpx` (exclusive).
    ///
    /// [`FileOffset`]: crate::common::FileOffset
    pub const fn fileoffset_end(&self) -> FileOffset {
        self.fileoffset + UTMPX_SZ_FO
    }

    /// `Utmpx` to `String` using printable chars for non-printable and/or
    /// formatting characters.
    #[doc(hidden)]
    #[allow(non_snake_case)]
    #[cfg(any(debug_assertions, test))]
    pub fn to_String_noraw(&self) -> String {
        format!(
            "@{} ut_type {} ut_pid {} ut_line '{}' ut_user '{}' ut_host '{}' tv_sec {}",
            self.fileoffset,
            self.ut_type(),
            self.ut_pid(),
            buffer_to_String_noraw(self.ut_line()),
            buffer_to_String_noraw(self.ut_user()),
            buffer_to_String_noraw(self.ut_host()),
            self.tv_sec(),
        )
    }
}

impl fmt::Debug for Utmpx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Utmpx")
            .field("fileoffset", &self.fileoffset)
            .field("ut_type", &self.ut_type())
            .field("ut_pid", &self.ut_pid())
            .field("ut_line", &String::from_utf8_lossy(trim_nul(self.ut_line())))
            .field("ut_user", &String::from_utf8_lossy(trim_nul(self.ut_user())))
            .field("ut_host", &String::from_utf8_lossy(trim_nul(self.ut_host())))
            .field("tv_sec", &self.tv_sec())
            .finish()
    }
}
