#![allow(dead_code)]

use nextbasic::lang::{decode, lex, Dialect, Error, Statement};

pub fn parse(line: &str) -> Statement {
    lex(line, Dialect::V208).unwrap()
}

/// The whole record of a line.
pub fn bytes(line: &str) -> Vec<u8> {
    parse(line).to_bytes().unwrap()
}

/// Text of a line after encoding and decoding it.
pub fn round_trip(line: &str) -> String {
    decode(&bytes(line)).unwrap()
}

/// Tokenize then validate.
pub fn check(line: &str, dialect: Dialect) -> Result<(), Error> {
    lex(line, dialect).and_then(|s| s.validate(dialect))
}
