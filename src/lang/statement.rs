use super::codec;
use super::token::{Kind, Token};
use super::{lex, validate_statement, Dialect, Error, LineNumber};

/// One tokenised source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub line_number: LineNumber,
    pub tokens: Vec<Token>,
}

impl Statement {
    pub fn new(line_number: LineNumber, tokens: Vec<Token>) -> Statement {
        Statement {
            line_number,
            tokens,
        }
    }

    pub fn parse(line: &str, dialect: Dialect) -> Result<Statement, Error> {
        lex(line, dialect)
    }

    /// Check the grammar. Directives always pass.
    pub fn validate(&self, dialect: Dialect) -> Result<(), Error> {
        if self.is_directive() {
            return Ok(());
        }
        validate_statement(&self.tokens, self.line_number, dialect)
    }

    pub fn is_directive(&self) -> bool {
        self.directive().is_some()
    }

    /// The directive token of a `#` line.
    pub fn directive(&self) -> Option<&Token> {
        self.tokens.first().filter(|t| t.kind == Kind::Directive)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        codec::encode(self.number()?, &self.tokens)
    }

    /// Encode, failing when the record is larger than `limit`.
    pub fn to_bytes_within(&self, limit: usize) -> Result<Vec<u8>, Error> {
        codec::encode_within(self.number()?, &self.tokens, limit)
    }

    fn number(&self) -> Result<u16, Error> {
        self.line_number
            .ok_or_else(|| error!(InvalidLineNumber; "Line number is missing"))
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s: String = self.tokens.iter().map(|t| t.to_string()).collect();
        match self.line_number {
            Some(number) => write!(f, "{} {}", number, s),
            None => write!(f, "{}", s),
        }
    }
}
