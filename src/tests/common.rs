// src/tests/common.rs

//! Common test fixtures.

#![allow(non_upper_case_globals)]

use crate::data::utmpx::{UtType, Utmpx};

use ::lazy_static::lazy_static;

pub const TV_SEC_BOOT: i32 = 1_600_000_000;
/// Ten minutes after boot.
pub const TV_SEC_1: i32 = TV_SEC_BOOT + 600;
pub const TV_SEC_2: i32 = TV_SEC_1 + 60;
pub const TV_SEC_3: i32 = TV_SEC_2 + 60;
pub const TV_SEC_4: i32 = TV_SEC_3 + 60;
pub const TV_SEC_5: i32 = TV_SEC_4 + 60;

pub const HOST_REMOTE: &str = "203.0.113.7";
pub const HOST_OTHER: &str = "198.51.100.20";

/// `USER_PROCESS`; a user logged in on `line`.
pub fn login(user: &str, line: &str, host: &str, tv_sec: i32) -> Utmpx {
    Utmpx::new(UtType::UserProcess, 1000, line, user, host, tv_sec)
}

/// `DEAD_PROCESS` without a user; the session on `line` ended.
pub fn logout(line: &str, tv_sec: i32) -> Utmpx {
    Utmpx::new(UtType::DeadProcess, 1000, line, "", "", tv_sec)
}

/// `DEAD_PROCESS` from `host` without a user.
pub fn logout_host(line: &str, host: &str, tv_sec: i32) -> Utmpx {
    Utmpx::new(UtType::DeadProcess, 1000, line, "", host, tv_sec)
}

/// `DEAD_PROCESS` naming `user`.
pub fn logout_user(user: &str, line: &str, tv_sec: i32) -> Utmpx {
    Utmpx::new(UtType::DeadProcess, 1000, line, user, "", tv_sec)
}

/// `LOGIN_PROCESS`; the getty waiting on `line`.
pub fn login_placeholder(line: &str, tv_sec: i32) -> Utmpx {
    Utmpx::new(UtType::LoginProcess, 1001, line, "LOGIN", "", tv_sec)
}

/// `BOOT_TIME`
pub fn boot(tv_sec: i32) -> Utmpx {
    Utmpx::new(UtType::BootTime, 0, "~", "reboot", "6.1.0-18-amd64", tv_sec)
}

lazy_static! {
    /// Two overlapping sessions, alice on tty1 and bob on tty2.
    ///
    /// Redacting alice keeps only entries 1 and 4 (zero-based).
    pub static ref ENTRIES_ALICE_BOB: Vec<Utmpx> = vec![
        login("alice", "tty1", "", TV_SEC_1),
        login("bob", "tty2", "", TV_SEC_2),
        logout("tty1", TV_SEC_3),
        login_placeholder("tty1", TV_SEC_3),
        logout("tty2", TV_SEC_4),
    ];

    /// A boot, one remote session from `HOST_REMOTE`, one local session.
    pub static ref ENTRIES_REMOTE: Vec<Utmpx> = vec![
        boot(TV_SEC_BOOT),
        login("carol", "pts/0", HOST_REMOTE, TV_SEC_1),
        login("dave", "tty1", "", TV_SEC_2),
        logout("pts/0", TV_SEC_3),
        logout("tty1", TV_SEC_4),
        login_placeholder("tty1", TV_SEC_4),
    ];
}
