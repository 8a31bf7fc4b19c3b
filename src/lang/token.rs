use super::codes;

/// What a [`Token`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Keyword,
    Identifier,
    /// A decimal literal outside an integer expression. Carries a hidden
    /// number block when encoded.
    Number,
    /// A decimal literal inside an integer expression.
    LiteralNumber,
    Binary,
    Hex,
    StringLiteral,
    Symbol,
    Comment,
    DotCommand,
    Directive,
    StatementSeparator,
    Whitespace,
    Unknown,
    /// A `#name` reference to a `#define` value.
    Define,
    DefFnArg,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: Kind,
    /// Source text of the token. Keywords hold their canonical upper case
    /// spelling.
    pub text: String,
    /// Byte code for keywords.
    pub code: Option<u8>,
    /// Parsed value of numeric literals.
    pub numeric: Option<f64>,
    /// True when the literal appeared in an integer expression.
    pub integer: bool,
    /// Character offset in the source line.
    pub pos: usize,
    /// Not written to the tokenised form.
    pub skip: bool,
    /// The literal is a line number reference, such as after `GO TO`.
    pub line_number: bool,
}

impl Token {
    pub fn new<S: Into<String>>(kind: Kind, text: S, pos: usize) -> Token {
        Token {
            kind,
            text: text.into(),
            code: None,
            numeric: None,
            integer: false,
            pos,
            skip: false,
            line_number: false,
        }
    }

    /// A keyword token using the table's spelling for `code`.
    pub fn keyword(code: u8, pos: usize) -> Token {
        let text = codes::text(code).unwrap_or_default();
        Token {
            code: Some(code),
            ..Token::new(Kind::Keyword, text, pos)
        }
    }

    pub fn with_numeric(self, numeric: f64) -> Token {
        Token {
            numeric: Some(numeric),
            ..self
        }
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == Kind::Keyword && self.text == text
    }

    pub fn is_code(&self, code: u8) -> bool {
        self.kind == Kind::Keyword && self.code == Some(code)
    }

    pub fn is_symbol(&self, text: &str) -> bool {
        self.kind == Kind::Symbol && self.text == text
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == Kind::Whitespace
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// For directives: the name without the leading `#`.
    pub fn directive_name(&self) -> Option<&str> {
        if self.kind != Kind::Directive {
            return None;
        }
        self.text.trim_start_matches('#').split(' ').next()
    }

    /// For directives: everything after the name.
    pub fn directive_arg(&self) -> Option<&str> {
        if self.kind != Kind::Directive {
            return None;
        }
        self.text.splitn(2, ' ').nth(1)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword() {
        let t = Token::keyword(codes::GO_TO, 3);
        assert_eq!(t.text, "GO TO");
        assert!(t.is_code(0xec));
        assert!(t.is_keyword("GO TO"));
        assert!(!t.is_symbol("GO TO"));
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn test_directive_parts() {
        let t = Token::new(Kind::Directive, "#autostart 10", 0);
        assert_eq!(t.directive_name(), Some("autostart"));
        assert_eq!(t.directive_arg(), Some("10"));
        let t = Token::new(Kind::Directive, "#autostart", 0);
        assert_eq!(t.directive_arg(), None);
    }
}
