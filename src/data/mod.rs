// src/data/mod.rs

//! The `data` module is specialized data containers for entries of
//! fixed-size login accounting files.
//!
//! ## Definitions of data
//!
//! ### Utmpx
//!
//! A [`Utmpx`] is one [`utmpx`] structure read from a `utmp`, `wtmp`, or
//! `btmp` file. It is read by a [`UtmpxReader`].
//!
//! A `Utmpx` represents one login, logout, or system event.
//!
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`utmpx`]: https://man7.org/linux/man-pages/man5/utmp.5.html
//! [`UtmpxReader`]: crate::readers::utmpxreader::UtmpxReader

pub mod utmpx;
