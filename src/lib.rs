//! # NextBASIC
//!
//! Converts NextBASIC program text to the tokenised form the ZX Spectrum
//! Next loads, and back again.
//!
//! A line such as `10 PRINT "hi": GO TO 10` becomes a record of keyword
//! bytes and literal text. Decimal numbers carry a hidden 5-byte binary
//! value, which is skipped when the line is turned back into text.
//! ```
//! use nextbasic::lang::{decode, lex, Dialect};
//!
//! let statement = lex("10 print 1", Dialect::V208).unwrap();
//! let bytes = statement.to_bytes().unwrap();
//! assert_eq!(decode(&bytes).unwrap(), "10 PRINT 1");
//! ```
//!
//! Whole files go through [`file::file2bas`] and [`file::file2txt`], which
//! understand `#autoline`, `#autostart`, `#program`, `#bank` and
//! `#define` directives and write TAP or +3DOS files.

pub mod file;
pub mod lang;
