// src/readers/mod.rs

//! "Readers" for _utredactlib_.
//!
//! A [`UtmpxReader`] reads [`Utmpx`s] from a file, in order, once.
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`Read`]: std::io::Read
//! [`Utmpx`s]: crate::data::utmpx::Utmpx
//! [`UtmpxReader`]: crate::readers::utmpxreader::UtmpxReader

pub mod utmpxreader;
