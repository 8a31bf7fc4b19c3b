/*!
# Rust Language Module

This Rust module provides lexical analysis, validation and the tokenised
binary form of NextBASIC program lines.

*/

#[macro_use]
mod error;
pub mod chars;
pub mod codec;
pub mod codes;
mod lex;
pub mod number;
mod scope;
mod statement;
pub mod token;
mod validate;

pub use codec::{decode, encode};
pub use error::Error;
pub use error::ErrorCode;
pub use lex::{lex, lex_with_line_number, parse_line_number};
pub use scope::{Scope, ScopeStack};
pub use statement::Statement;
pub use token::{Kind, Token};
pub use validate::{validate_line_number, validate_statement};

/// Optional BASIC line number. `None` for directives.
pub type LineNumber = Option<u16>;

/// Character span within a source line.
pub type Column = std::ops::Range<usize>;

/// Highest line number a program may use.
pub const MAX_LINE_NUMBER: u16 = 9999;

/// The two generations of the NextBASIC grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    V207,
    V208,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::V208
    }
}

impl std::str::FromStr for Dialect {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "207" | "V207" | "FIRST" => Ok(Dialect::V207),
            "208" | "V208" | "LATEST" => Ok(Dialect::V208),
            _ => Err(error!(BadDirective; format!("Unknown parser: {} - try \"208\"", s))),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Dialect::V207 => write!(f, "207"),
            Dialect::V208 => write!(f, "208"),
        }
    }
}
