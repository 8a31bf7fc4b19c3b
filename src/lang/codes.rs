//! The keyword table: byte codes and their text, both directions.

use super::Dialect;
use std::collections::HashMap;

pub const STATEMENT_SEP: u8 = 0x3a;
pub const SEMICOLON: u8 = 0x3b;
pub const EOL: u8 = 0x0d;
pub const TIME: u8 = 0x81;
pub const PRIVATE: u8 = 0x82;
pub const ELSEIF: u8 = 0x83;
pub const ENDIF: u8 = 0x84;
pub const UNTIL: u8 = 0x8e;
pub const DEFPROC: u8 = 0x91;
pub const ELSE: u8 = 0x98;
pub const BANK: u8 = 0x9a;
pub const CODE: u8 = 0xaf;
pub const BIN: u8 = 0xc4;
pub const THEN: u8 = 0xcb;
pub const DEF_FN: u8 = 0xce;
pub const OPEN_HASH: u8 = 0xd3;
pub const CLOSE_HASH: u8 = 0xd4;
pub const CIRCLE: u8 = 0xd8;
pub const REM: u8 = 0xea;
pub const FOR: u8 = 0xeb;
pub const GO_TO: u8 = 0xec;
pub const GO_SUB: u8 = 0xed;
pub const INPUT: u8 = 0xee;
pub const LOAD: u8 = 0xef;
pub const POKE: u8 = 0xf4;
pub const PRINT: u8 = 0xf5;
pub const PLOT: u8 = 0xf6;
pub const IF: u8 = 0xfa;
pub const DRAW: u8 = 0xfc;
pub const CLEAR: u8 = 0xfd;

static KEYWORDS: &[(u8, &str)] = &[
    (0x3a, ":"),
    (0x3b, ";"),
    (0x3c, "<"),
    (0x3e, ">"),
    (0x81, "TIME"),
    (0x82, "PRIVATE"),
    (0x83, "IF"),
    (0x84, "ENDIF"),
    (0x85, "EXIT"),
    (0x86, "REF"),
    (0x87, "PEEK$"),
    (0x88, "REG"),
    (0x89, "DPOKE"),
    (0x8a, "DPEEK"),
    (0x8b, "MOD"),
    (0x8c, "<<"),
    (0x8d, ">>"),
    (0x8e, "UNTIL"),
    (0x8f, "ERROR"),
    (0x90, "ON"),
    (0x91, "DEFPROC"),
    (0x92, "ENDPROC"),
    (0x93, "PROC"),
    (0x94, "LOCAL"),
    (0x95, "DRIVER"),
    (0x96, "WHILE"),
    (0x97, "REPEAT"),
    (0x98, "ELSE"),
    (0x99, "REMOUNT"),
    (0x9a, "BANK"),
    (0x9b, "TILE"),
    (0x9c, "LAYER"),
    (0x9d, "PALETTE"),
    (0x9e, "SPRITE"),
    (0x9f, "PWD"),
    (0xa0, "CD"),
    (0xa1, "MKDIR"),
    (0xa2, "RMDIR"),
    (0xa3, "SPECTRUM"),
    (0xa4, "PLAY"),
    (0xa5, "RND"),
    (0xa6, "INKEY$"),
    (0xa7, "PI"),
    (0xa8, "FN"),
    (0xa9, "POINT"),
    (0xaa, "SCREEN$"),
    (0xab, "ATTR"),
    (0xac, "AT"),
    (0xad, "TAB"),
    (0xae, "VAL$"),
    (0xaf, "CODE"),
    (0xb0, "VAL"),
    (0xb1, "LEN"),
    (0xb2, "SIN"),
    (0xb3, "COS"),
    (0xb4, "TAN"),
    (0xb5, "ASN"),
    (0xb6, "ACS"),
    (0xb7, "ATN"),
    (0xb8, "LN"),
    (0xb9, "EXP"),
    (0xba, "INT"),
    (0xbb, "SQR"),
    (0xbc, "SGN"),
    (0xbd, "ABS"),
    (0xbe, "PEEK"),
    (0xbf, "IN"),
    (0xc0, "USR"),
    (0xc1, "STR$"),
    (0xc2, "CHR$"),
    (0xc3, "NOT"),
    (0xc4, "BIN"),
    (0xc5, "OR"),
    (0xc6, "AND"),
    (0xc7, "<="),
    (0xc8, ">="),
    (0xc9, "<>"),
    (0xca, "LINE"),
    (0xcb, "THEN"),
    (0xcc, "TO"),
    (0xcd, "STEP"),
    (0xce, "DEF FN"),
    (0xcf, "CAT"),
    (0xd0, "FORMAT"),
    (0xd1, "MOVE"),
    (0xd2, "ERASE"),
    (0xd3, "OPEN #"),
    (0xd4, "CLOSE #"),
    (0xd5, "MERGE"),
    (0xd6, "VERIFY"),
    (0xd7, "BEEP"),
    (0xd8, "CIRCLE"),
    (0xd9, "INK"),
    (0xda, "PAPER"),
    (0xdb, "FLASH"),
    (0xdc, "BRIGHT"),
    (0xdd, "INVERSE"),
    (0xde, "OVER"),
    (0xdf, "OUT"),
    (0xe0, "LPRINT"),
    (0xe1, "LLIST"),
    (0xe2, "STOP"),
    (0xe3, "READ"),
    (0xe4, "DATA"),
    (0xe5, "RESTORE"),
    (0xe6, "NEW"),
    (0xe7, "BORDER"),
    (0xe8, "CONTINUE"),
    (0xe9, "DIM"),
    (0xea, "REM"),
    (0xeb, "FOR"),
    (0xec, "GO TO"),
    (0xed, "GO SUB"),
    (0xee, "INPUT"),
    (0xef, "LOAD"),
    (0xf0, "LIST"),
    (0xf1, "LET"),
    (0xf2, "PAUSE"),
    (0xf3, "NEXT"),
    (0xf4, "POKE"),
    (0xf5, "PRINT"),
    (0xf6, "PLOT"),
    (0xf7, "RUN"),
    (0xf8, "SAVE"),
    (0xf9, "RANDOMIZE"),
    (0xfa, "IF"),
    (0xfb, "CLS"),
    (0xfc, "DRAW"),
    (0xfd, "CLEAR"),
    (0xfe, "RETURN"),
    (0xff, "COPY"),
];

static ALIASES: &[(&str, u8)] = &[
    ("GOTO", GO_TO),
    ("GOSUB", GO_SUB),
    ("RAND", 0xf9),
    ("CONT", 0xe8),
];

thread_local!(
    static TEXT_TO_CODE: HashMap<&'static str, u8> = KEYWORDS
        .iter()
        .filter(|(code, _)| *code != ELSEIF)
        .map(|(code, text)| (*text, *code))
        .chain(ALIASES.iter().cloned())
        .collect();
);

/// Keywords added by the later dialect.
fn is_v208_only(code: u8) -> bool {
    (TIME..=0x86).contains(&code)
}

/// The display text of a byte code, if it is a keyword.
pub fn text(code: u8) -> Option<&'static str> {
    KEYWORDS
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|i| KEYWORDS[i].1)
}

/// The byte code of upper case keyword text within a dialect.
pub fn code(text: &str, dialect: Dialect) -> Option<u8> {
    let code = TEXT_TO_CODE.with(|ttc| ttc.get(text).copied())?;
    if dialect == Dialect::V207 && is_v208_only(code) {
        return None;
    }
    Some(code)
}

static USES_LINE_NUMBERS: &[&str] = &[
    "GO SUB", "GO TO", "LIST", "LINE", "LLIST", "RESTORE", "RUN", "CODE", "EXIT",
];

static OPERATORS: &[&str] = &[
    "AND", "OR", "NOT", "MOD", "-", "*", "/", "<", ">", "<=", ">=", "<>", "&", "|", "^", "!",
    ">>", "<<", "INT",
];

static INT_FUNCTIONS: &[&str] = &[
    "IN", "REG", "PEEK", "DPEEK", "USR", "BIN", "RND", "BANK", "SPRITE", "INT", "ABS", "SGN",
];

static FUNCTIONS: &[&str] = &[
    "ABS", "ACS", "ASN", "ATN", "ATTR", "CHR$", "CODE", "COS", "EXP", "FN", "IN", "INKEY$",
    "INT", "LEN", "PEEK", "PEEK$", "PI", "POINTER", "REG", "RND", "SCREEN$", "SGN", "SIN",
    "SQR", "STR$", "TAN", "USR", "VAL", "VAL$",
];

static PRINT_MODIFIERS: &[&str] = &[
    "INK", "PAPER", "FLASH", "INVERSE", "OVER", "BRIGHT", "POINT", "AT", "LINE", "TO", "BIN",
    "TAB", "TIME",
];

/// Keywords after which `$` is a plain symbol rather than a hex prefix.
static STRING_ALT_FUNCTIONS: &[&str] = &["TIME"];

/// Keywords whose numeric argument is a line number.
pub fn uses_line_numbers(text: &str) -> bool {
    USES_LINE_NUMBERS.contains(&text)
}

pub fn is_operator(text: &str) -> bool {
    OPERATORS.contains(&text)
}

/// Keywords and operators that may appear inside an integer expression.
pub fn is_int_function(text: &str) -> bool {
    INT_FUNCTIONS.contains(&text) || is_operator(text)
}

/// Keywords that may directly follow an integer function without ending
/// the integer expression, such as `BANK n USR`.
pub fn int_function_followers(text: &str) -> Option<&'static [&'static str]> {
    match text {
        "SPRITE" => Some(&["CONTINUE", "AT", "OVER"]),
        "BANK" => Some(&["USR", "PEEK", "DPEEK"]),
        "ABS" => Some(&["*"]),
        _ => None,
    }
}

pub fn is_function(text: &str) -> bool {
    FUNCTIONS.contains(&text)
}

pub fn is_print_modifier(text: &str) -> bool {
    PRINT_MODIFIERS.contains(&text)
}

pub fn is_string_alt_function(text: &str) -> bool {
    STRING_ALT_FUNCTIONS.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_directions() {
        assert_eq!(text(0xf5), Some("PRINT"));
        assert_eq!(text(0x3c), Some("<"));
        assert_eq!(text(0x41), None);
        assert_eq!(code("PRINT", Dialect::V208), Some(0xf5));
        assert_eq!(code("DEF FN", Dialect::V208), Some(DEF_FN));
        assert_eq!(code("GOTO", Dialect::V208), Some(GO_TO));
    }

    #[test]
    fn test_elseif_renders_as_if() {
        assert_eq!(text(ELSEIF), Some("IF"));
        assert_eq!(code("IF", Dialect::V208), Some(IF));
    }

    #[test]
    fn test_dialect_additions() {
        assert_eq!(code("PRIVATE", Dialect::V208), Some(PRIVATE));
        assert_eq!(code("PRIVATE", Dialect::V207), None);
        assert_eq!(code("ENDIF", Dialect::V207), None);
        assert_eq!(code("PEEK$", Dialect::V207), Some(0x87));
    }

    #[test]
    fn test_table_is_sorted() {
        assert!(KEYWORDS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_int_functions() {
        assert!(is_int_function("PEEK"));
        assert!(is_int_function("<<"));
        assert!(!is_int_function("PRINT"));
        assert_eq!(int_function_followers("BANK"), Some(&["USR", "PEEK", "DPEEK"][..]));
        assert_eq!(int_function_followers("PEEK"), None);
    }
}
