//! Single character predicates used by the tokenizer.

pub fn is_directive(c: char) -> bool {
    c == '#'
}

pub fn is_hex_symbol(c: char) -> bool {
    c == '@' || c == '$'
}

pub fn is_binary_symbol(c: char) -> bool {
    c == '@'
}

pub fn is_cmp_operator_start(c: char) -> bool {
    c == '<' || c == '>'
}

pub fn is_cmp_operator(c: char) -> bool {
    c == '<' || c == '=' || c == '>'
}

pub fn is_int_expression(c: char) -> bool {
    c == '%'
}

pub fn is_binary(c: char) -> bool {
    c == '0' || c == '1'
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_start_of_float(c: char) -> bool {
    c == '.'
}

/// Hex digits, including the `$` prefix itself.
pub fn is_hex(c: char) -> bool {
    c == '$' || c.is_ascii_hexdigit()
}

pub fn is_statement_sep(c: char) -> bool {
    c == ':'
}

pub fn is_space(c: char) -> bool {
    c == ' '
}

/// Characters that end an integer expression.
pub fn is_literal_reset(c: char) -> bool {
    c == '=' || c == ',' || c == ';' || c == ':'
}

pub fn is_symbol(c: char) -> bool {
    "=~!,;-+/*()<>#%${}[]|&^".contains(c)
}

pub fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_define(c: char) -> bool {
    is_alpha(c) || c == '_'
}

pub fn is_quote(c: char) -> bool {
    c == '"'
}

pub fn is_start_of_comment(c: char) -> bool {
    c == ';'
}

pub fn is_alpha_num(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

pub fn is_dot_command(c: char) -> bool {
    c == '.'
}

/// Binary digits or the fractional point.
pub fn is_binary_or_point(c: char) -> bool {
    is_binary(c) || c == '.'
}

/// Hex digits or the fractional point.
pub fn is_hex_or_point(c: char) -> bool {
    is_hex(c) || c == '.'
}

static BLOCK_GLYPHS: [char; 15] = [
    '\u{259D}', '\u{2598}', '\u{2580}', '\u{2597}', '\u{2590}', '\u{259A}', '\u{259C}', '\u{2596}',
    '\u{259E}', '\u{258C}', '\u{259B}', '\u{2584}', '\u{259F}', '\u{2599}', '\u{2588}',
];

/// The printable form of a machine character byte that has no direct
/// Latin-1 equivalent: the pound sign, block graphics and UDG escapes.
pub fn glyph(byte: u8) -> Option<String> {
    match byte {
        96 => Some("\u{a3}".to_string()),
        127 => Some("\u{a9}".to_string()),
        128 => Some("\u{80}".to_string()),
        129..=143 => Some(BLOCK_GLYPHS[(byte - 129) as usize].to_string()),
        144..=164 => Some(format!("\\{}", (b'A' + (byte - 144)) as char)),
        _ => None,
    }
}

/// Replace printable glyphs with the machine characters they stand for.
pub fn from_glyphs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\u{a3}' => out.push('`'),
            '\u{a9}' => out.push('\u{7f}'),
            '\\' => match chars.peek() {
                Some(&udg @ 'A'..='U') => {
                    chars.next();
                    out.push((0x90 + (udg as u8 - b'A')) as char);
                }
                _ => out.push(c),
            },
            _ => match BLOCK_GLYPHS.iter().position(|g| *g == c) {
                Some(i) => out.push((0x81 + i as u8) as char),
                None => out.push(c),
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert!(is_hex('$'));
        assert!(is_hex('f'));
        assert!(is_hex('E'));
        assert!(!is_hex('g'));
        assert!(!is_hex('.'));
        assert!(is_hex_or_point('.'));
    }

    #[test]
    fn test_symbols() {
        assert!(is_symbol('~'));
        assert!(is_symbol('%'));
        assert!(!is_symbol('"'));
        assert!(!is_symbol('_'));
        assert!(is_literal_reset(':'));
        assert!(!is_literal_reset('+'));
    }

    #[test]
    fn test_identifier_chars() {
        assert!(is_alpha_num('_'));
        assert!(is_alpha_num('$'));
        assert!(is_alpha_num('9'));
        assert!(!is_alpha('9'));
        assert!(is_define('_'));
        assert!(!is_define('1'));
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(from_glyphs("PRINT \"\u{a3}\\A\u{2588}\""), "PRINT \"`\u{90}\u{8f}\"");
        assert_eq!(from_glyphs("a\\z"), "a\\z");
        assert_eq!(glyph(96).as_deref(), Some("\u{a3}"));
        assert_eq!(glyph(144).as_deref(), Some("\\A"));
        assert_eq!(glyph(143).as_deref(), Some("\u{2588}"));
        assert_eq!(glyph(65), None);
    }
}
