//! Tokenised line records.
//!
//! A record is the big endian line number, the little endian length of
//! the payload, then the payload itself ending in `0x0D`. Keywords are
//! single bytes and decimal literals carry a hidden 6-byte number block.

use super::chars;
use super::codes;
use super::number;
use super::token::{Kind, Token};
use super::{Error, MAX_LINE_NUMBER};

/// Largest record, header included, that may be stored in a bank.
pub const BANK_LINE_LIMIT: usize = 256;

/// Prefix of bank data.
pub const BANK_MARKER: &[u8] = b"BC";

const BANK_PADDING: u16 = 0x8080;

/// Encode one line into its record.
pub fn encode(line_number: u16, tokens: &[Token]) -> Result<Vec<u8>, Error> {
    let mut payload = vec![];
    for (index, token) in tokens.iter().enumerate() {
        let err = |e: Error| {
            e.in_line_number(Some(line_number))
                .in_column(&(token.pos..token.pos + token.len()))
        };
        if let (Kind::Keyword, Some(code)) = (token.kind, token.code) {
            payload.push(code);
            if code == codes::PRIVATE
                && !tokens
                    .get(index + 1)
                    .map_or(false, |t| t.is_code(codes::CLEAR))
            {
                payload.extend_from_slice(&number::EMPTY_BLOCK);
            }
            continue;
        }
        match token.kind {
            Kind::Number => {
                let value = token
                    .numeric
                    .unwrap_or_else(|| number::parse_decimal(&token.text));
                push_text(&mut payload, &token.text).map_err(err)?;
                payload.extend_from_slice(&number::number_block(value).map_err(err)?);
            }
            Kind::Binary | Kind::Hex if !token.integer => {
                push_text(&mut payload, &token.text).map_err(err)?;
                let value = token.numeric.unwrap_or(0.0);
                payload.extend_from_slice(&number::number_block(value).map_err(err)?);
            }
            Kind::DefFnArg => {
                push_text(&mut payload, &token.text).map_err(err)?;
                payload.extend_from_slice(&number::EMPTY_BLOCK);
            }
            _ if !token.skip => push_text(&mut payload, &token.text).map_err(err)?,
            _ => {}
        }
    }
    payload.push(codes::EOL);

    if payload.len() > u16::max_value() as usize {
        return Err(error!(Overflow, Some(line_number); "Line is too long"));
    }
    let mut record = Vec::with_capacity(payload.len() + 4);
    record.extend_from_slice(&line_number.to_be_bytes());
    record.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    record.append(&mut payload);
    Ok(record)
}

/// Encode one line and fail if the record exceeds `limit` bytes.
pub fn encode_within(line_number: u16, tokens: &[Token], limit: usize) -> Result<Vec<u8>, Error> {
    let record = encode(line_number, tokens)?;
    if record.len() > limit {
        return Err(error!(Overflow, Some(line_number); format!(
            "Tokenised line length of {} bytes exceeded for banked code on line #{}",
            limit, line_number
        )));
    }
    Ok(record)
}

fn push_text(payload: &mut Vec<u8>, text: &str) -> Result<(), Error> {
    for c in text.chars() {
        let byte = c as u32;
        if byte > 0xff {
            return Err(error!(OutOfRangeCharacter; format!(
                "Character {:?} does not fit in a byte",
                c
            )));
        }
        payload.push(byte as u8);
    }
    Ok(())
}

/// Decode a run of records into text, one line per record.
///
/// Data starting with `BC` is bank data: `0x80` padding after the last
/// record ends it, as does any incomplete tail. A zero length or a line
/// number beyond 9999 ends the program.
pub fn decode(data: &[u8]) -> Result<String, Error> {
    let (banked, mut rest) = match data.strip_prefix(BANK_MARKER) {
        Some(rest) => (true, rest),
        None => (false, data),
    };
    let mut lines = vec![];
    loop {
        if rest.len() < 4 {
            if rest.is_empty() || banked {
                break;
            }
            return Err(error!(CorruptData; format!(
                "{} stray bytes after last line",
                rest.len()
            )));
        }
        let line_number = u16::from_be_bytes([rest[0], rest[1]]);
        let length = u16::from_le_bytes([rest[2], rest[3]]);
        if length == 0 {
            break;
        }
        if line_number > MAX_LINE_NUMBER {
            if !(banked && line_number == BANK_PADDING) {
                tracing::warn!(line_number, length, "line number beyond 9999 ends the program");
            }
            break;
        }
        let end = 4 + length as usize;
        let body = rest.get(4..end).ok_or_else(|| {
            error!(CorruptData, Some(line_number); format!(
                "Line needs {} bytes but only {} remain",
                length,
                rest.len() - 4
            ))
        })?;
        let line = decode_line(line_number, body);
        tracing::trace!(line = %line, "decoded");
        lines.push(line);
        rest = &rest[end..];
    }
    tracing::debug!(lines = lines.len(), banked, "decoded records");
    Ok(lines.join("\n"))
}

fn decode_line(line_number: u16, body: &[u8]) -> String {
    let mut text = format!("{} ", line_number);
    let mut last: Option<u8> = None;
    let mut last_non_whitespace: Option<u8> = None;
    let mut in_string = false;
    let mut in_comment = false;
    let mut index = 0;

    while index < body.len() {
        let c = body[index];
        index += 1;
        if c == codes::EOL {
            break;
        }
        let peek = body.get(index).copied();

        if in_string || in_comment {
            match chars::glyph(c) {
                Some(glyph) => text.push_str(&glyph),
                None => text.push(char::from(c)),
            }
        } else if c == codes::SEMICOLON {
            if matches!(last_non_whitespace, None | Some(codes::STATEMENT_SEP)) {
                in_comment = true;
            }
            text.push(';');
            if peek.and_then(codes::text).is_some() {
                text.push(' ');
            }
        } else if c == codes::STATEMENT_SEP {
            text.push(':');
            if peek == Some(codes::SEMICOLON) {
                text.push(' ');
            }
        } else if let Some(keyword) = codes::text(c) {
            if c == codes::REM {
                in_comment = true;
            }
            let spaced = match last {
                Some(codes::STATEMENT_SEP) => true,
                Some(l) => codes::text(l).is_none() && l != b' ',
                None => false,
            };
            if spaced {
                text.push(' ');
            }
            text.push_str(keyword);
            text.push(' ');
        } else if c == number::NUMBER_MARKER {
            index += 5;
        } else {
            text.push(char::from(c));
        }

        if c == b'"' {
            in_string = !in_string;
        }
        if c != b' ' {
            last_non_whitespace = Some(c);
        }
        last = Some(c);
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let tokens = vec![Token::keyword(codes::REM, 3)];
        let bytes = encode(10, &tokens).unwrap();
        assert_eq!(bytes, vec![0x00, 0x0a, 0x02, 0x00, 0xea, 0x0d]);
        let bytes = encode(1000, &tokens).unwrap();
        assert_eq!(&bytes[..2], &[0x03, 0xe8]);
    }

    #[test]
    fn test_private_block() {
        let tokens = vec![
            Token::keyword(codes::PRIVATE, 3),
            Token::new(Kind::Identifier, "t", 11),
        ];
        let bytes = encode(10, &tokens).unwrap();
        assert_eq!(&bytes[4..11], &[0x82, 0x0e, 0, 0, 0, 0, 0]);

        let tokens = vec![
            Token::keyword(codes::PRIVATE, 3),
            Token::keyword(codes::CLEAR, 11),
        ];
        let bytes = encode(10, &tokens).unwrap();
        assert_eq!(&bytes[4..], &[0x82, 0xfd, 0x0d]);
    }

    #[test]
    fn test_skipped_tokens() {
        let mut directive = Token::new(Kind::Directive, "#autostart", 0);
        directive.skip = true;
        let tokens = vec![directive, Token::new(Kind::Identifier, "a", 0)];
        assert_eq!(encode(1, &tokens).unwrap(), vec![0, 1, 2, 0, b'a', 0x0d]);
    }

    #[test]
    fn test_out_of_range_character() {
        let tokens = vec![Token::new(Kind::StringLiteral, "\"\u{2603}\"", 9)];
        let e = encode(10, &tokens).unwrap_err();
        assert_eq!(e.code(), 9);
        assert_eq!(e.column(), 9..12);
    }

    #[test]
    fn test_bank_limit() {
        let text = format!("\"{}\"", "x".repeat(250));
        let tokens = vec![Token::new(Kind::StringLiteral, text, 3)];
        let e = encode_within(20, &tokens, BANK_LINE_LIMIT).unwrap_err();
        assert_eq!(
            e.detail(),
            "Tokenised line length of 256 bytes exceeded for banked code on line #20"
        );
        assert!(encode_within(20, &tokens, 1024).is_ok());
    }

    #[test]
    fn test_decode_spacing() {
        let data = [
            0x00, 0xca, 0x08, 0x00, 0xfa, 0xa6, 0x3d, 0x22, 0x73, 0x22, 0xcb, 0x0d,
        ];
        assert_eq!(decode(&data).unwrap(), "202 IF INKEY$ =\"s\" THEN");
        let data = [0x00, 0x0a, 0x05, 0x00, 0xf5, 0x61, 0x3a, 0xf5, 0x0d];
        assert_eq!(decode(&data).unwrap(), "10 PRINT a: PRINT");
    }

    #[test]
    fn test_decode_comment() {
        let data = [0x00, 0x0a, 0x06, 0x00, 0x3b, 0x20, 0xf5, 0x22, 0x60, 0x0d];
        assert_eq!(decode(&data).unwrap(), "10 ; \u{f5}\"£");
    }

    #[test]
    fn test_decode_skips_number_block() {
        let data = [
            0x00, 0x0a, 0x09, 0x00, 0xf5, 0x31, 0x0e, 0x00, 0x00, 0x01, 0x00, 0x00, 0x0d,
        ];
        assert_eq!(decode(&data).unwrap(), "10 PRINT 1");
    }

    #[test]
    fn test_decode_bank() {
        let mut data = b"BC".to_vec();
        data.extend_from_slice(&[0x00, 0x01, 0x02, 0x00, 0xfb, 0x0d]);
        data.extend_from_slice(&[0x80; 16]);
        assert_eq!(decode(&data).unwrap(), "1 CLS");
    }

    #[test]
    fn test_decode_end_of_program() {
        let data = [0x00, 0x01, 0x02, 0x00, 0xfb, 0x0d, 0x27, 0x10, 0x02, 0x00, 0xfb, 0x0d];
        assert_eq!(decode(&data).unwrap(), "1 CLS");
        assert_eq!(decode(&[0x00, 0x01, 0x02]).unwrap_err().code(), 12);
        let data = [0x00, 0x01, 0x09, 0x00, 0xfb, 0x0d];
        assert_eq!(decode(&data).unwrap_err().line_number(), Some(1));
        assert_eq!(decode(&[]).unwrap(), "");
        assert_eq!(decode(&[0, 0, 0, 0]).unwrap(), "");
    }
}
