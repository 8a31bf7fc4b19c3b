use super::{Column, LineNumber};

#[derive(Clone, PartialEq)]
pub struct Error {
    code: u16,
    line_number: LineNumber,
    column: Column,
    message: String,
    source: Option<(usize, String)>,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, ..$col:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_column($col)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, ..$col:expr;  $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_column($col)
            .message($msg)
    };
    ($err:ident, $line:expr, ..$col:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .in_column($col)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
    ($err:ident, $line:expr, ..$col:expr;  $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .in_column($col)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            line_number: None,
            column: 0..0,
            message: String::new(),
            source: None,
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn line_number(&self) -> LineNumber {
        self.line_number
    }

    pub fn column(&self) -> Column {
        self.column.clone()
    }

    /// The free-text part of the error, without code or position.
    pub fn detail(&self) -> &str {
        &self.message
    }

    pub fn in_line_number(self, line: LineNumber) -> Error {
        Error {
            line_number: line,
            ..self
        }
    }

    pub fn in_column(self, column: &Column) -> Error {
        Error {
            column: column.clone(),
            ..self
        }
    }

    pub fn message<S: Into<String>>(self, message: S) -> Error {
        debug_assert!(self.message.is_empty());
        Error {
            message: message.into(),
            ..self
        }
    }

    /// Attach the 1-based index and text of the source line.
    pub fn in_source(self, index: usize, text: &str) -> Error {
        Error {
            source: Some((index, text.to_string())),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SyntaxError = 2,
    LexicalError = 3,
    Overflow = 6,
    InvalidLineNumber = 8,
    OutOfRangeCharacter = 9,
    UndefinedDefine = 10,
    BadDirective = 11,
    CorruptData = 12,
    InternalError = 51,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let code_str = match self.code {
            2 => "SYNTAX ERROR",
            3 => "LEXICAL ERROR",
            6 => "OVERFLOW",
            8 => "INVALID LINE NUMBER",
            9 => "OUT OF RANGE CHARACTER",
            10 => "UNDEFINED DEFINE",
            11 => "BAD DIRECTIVE",
            12 => "CORRUPT DATA",
            51 => "INTERNAL ERROR",
            _ => "",
        };
        let mut suffix = String::new();
        if let Some(line_number) = self.line_number {
            suffix.push_str(&format!(" {}", line_number));
        }
        if (0..0) != self.column {
            suffix.push_str(&format!(" ({}..{})", self.column.start, self.column.end));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if code_str.is_empty() {
            write!(f, "PROGRAM ERROR {}", self.code)?;
        } else {
            write!(f, "{}", code_str)?;
        }
        if !suffix.is_empty() {
            write!(f, " IN{}", suffix)?;
        }
        if let Some((index, text)) = &self.source {
            write!(f, " #{}\n> {}", index, text)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = error!(SyntaxError, Some(10), ..&(3..5); "IF statement must have THEN");
        assert_eq!(
            e.to_string(),
            "SYNTAX ERROR IN 10 (3..5); IF statement must have THEN"
        );
        assert_eq!(error!(Overflow).to_string(), "OVERFLOW");
    }

    #[test]
    fn test_source_context() {
        let e = error!(InvalidLineNumber; "Line number is missing").in_source(4, "PRINT 1");
        assert_eq!(
            e.to_string(),
            "INVALID LINE NUMBER IN; Line number is missing #4\n> PRINT 1"
        );
        assert_eq!(e.detail(), "Line number is missing");
    }
}
