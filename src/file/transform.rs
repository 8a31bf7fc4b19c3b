use crate::error;
use crate::lang::{codes, decode, lex, Dialect, Error, Kind, Statement, Token};
use std::collections::HashMap;
use std::path::Path;

/// Bytes poked by one generated statement.
const POKE_BLOCK: usize = 256;

/// Substitute `#NAME` references with the tokens of their `#define`.
/// A changed line is run through encode and decode so the tokens read as
/// if the value had been typed in place.
pub fn expand_defines(
    mut statement: Statement,
    defines: &HashMap<String, Statement>,
    dialect: Dialect,
) -> Result<Statement, Error> {
    let line_number = statement.line_number;
    let mut modified = false;
    let mut tokens: Vec<Token> = Vec::with_capacity(statement.tokens.len());
    for token in std::mem::take(&mut statement.tokens) {
        if token.kind != Kind::Define || token.text == "#" {
            tokens.push(token);
            continue;
        }
        let define = defines.get(&token.text[1..]).ok_or_else(|| {
            error!(UndefinedDefine, line_number, ..&(token.pos..token.pos + token.len());
                format!("{} is unknown and not in a #define statement", token.text))
        })?;
        tokens.extend(define.tokens.iter().cloned());
        modified = true;
    }
    statement.tokens = tokens;
    if modified && !statement.is_directive() {
        let text = decode(&statement.to_bytes()?)?;
        tracing::trace!(line = %text, "define replaced");
        statement = lex(&text, dialect)?;
    }
    Ok(statement)
}

fn remove_trailing_whitespace(tokens: &mut Vec<Token>) {
    if tokens.last().map_or(false, |t| t.is_whitespace()) {
        tokens.pop();
    }
}

/// Drop a trailing `REM` or `;` comment with its separator. Returns `None`
/// when nothing is left of the line.
pub fn strip_comment(mut statement: Statement) -> Option<Statement> {
    let tokens = &mut statement.tokens;
    if tokens.last().map_or(false, |t| t.kind == Kind::Comment) {
        tokens.pop();
        remove_trailing_whitespace(tokens);
        tokens.pop();
        remove_trailing_whitespace(tokens);
        if tokens
            .last()
            .map_or(false, |t| t.kind == Kind::StatementSeparator)
        {
            tokens.pop();
            remove_trailing_whitespace(tokens);
        }
    }
    if statement.tokens.is_empty() {
        None
    } else {
        Some(statement)
    }
}

/// Replace `LOAD "file" CODE [offset[,length]]` and `LOAD "file" BANK n
/// [offset[,length]]` with `POKE` statements holding the file contents,
/// read from `dir`. Each statement pokes at most 256 bytes. The first
/// takes the place of the `LOAD`, the rest follow on consecutive line
/// numbers.
pub fn inline_load(statement: Statement, dir: &Path) -> Result<Vec<Statement>, Error> {
    let mut result = vec![];
    let mut current = statement;
    let mut index = 0;
    while index < current.tokens.len() {
        if !current.tokens[index].is_code(codes::LOAD) {
            index += 1;
            continue;
        }
        let load = match LoadCode::read(&current.tokens, index) {
            Some(load) => load,
            None => {
                index += 1;
                continue;
            }
        };
        let line_number = current.line_number;
        let pos = current.tokens[index].pos;
        let path = dir.join(&load.filename);
        let data = std::fs::read(&path).map_err(|_| {
            error!(InternalError, line_number, ..&(pos..pos + 4);
                format!("Cannot find or read \"{}\".", path.display()))
        })?;
        let length = load.length.unwrap_or(data.len()).min(data.len());
        let offset = load.offset.unwrap_or(0);
        tracing::debug!(path = %path.display(), length, offset, "inline load");

        let mut blocks = data[..length].chunks(POKE_BLOCK);
        let first = poke_tokens(load.bank, offset, blocks.next().unwrap_or_default(), pos);
        let used = first.len();
        let trailer = current.tokens.split_off(load.end);
        current.tokens.truncate(index);
        current.tokens.extend(first);
        current.tokens.extend(trailer);
        index += used;

        for (k, block) in blocks.enumerate() {
            let start = offset + (k + 1) * POKE_BLOCK;
            let line = line_number.map(|n| n.saturating_add(k as u16 + 1));
            result.push(Statement::new(line, poke_tokens(load.bank, start, block, 0)));
        }
    }
    result.insert(0, current);
    Ok(result)
}

/// The parts of a `LOAD` statement that can be inlined.
struct LoadCode {
    filename: String,
    bank: Option<u16>,
    offset: Option<usize>,
    length: Option<usize>,
    /// Index of the first token after the statement.
    end: usize,
}

impl LoadCode {
    fn read(tokens: &[Token], at: usize) -> Option<LoadCode> {
        let mut cursor = Cursor { tokens, index: at + 1 };
        let spec = cursor.next()?;
        if spec.kind != Kind::StringLiteral {
            return None;
        }
        let filename = spec.text.trim_matches('"').to_string();
        // drive switches such as LOAD "c:"
        if filename.len() == 2 && filename.ends_with(':') {
            return None;
        }
        let modifier = cursor.next()?;
        let bank = if modifier.is_code(codes::BANK) {
            let number = cursor.number()?;
            Some(number as u16)
        } else if modifier.is_code(codes::CODE) {
            None
        } else {
            return None;
        };
        let offset = cursor.number();
        let length = offset.and_then(|_| cursor.number());
        Some(LoadCode {
            filename,
            bank,
            offset: offset.map(|n| n as usize),
            length: length.map(|n| n as usize),
            end: cursor.index,
        })
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<&'a Token> {
        while let Some(token) = self.tokens.get(self.index) {
            self.index += 1;
            if !token.is_whitespace() {
                return Some(token);
            }
        }
        None
    }

    /// A number, optionally after a `,` and the `%` of an integer literal.
    /// The cursor only moves when one is found.
    fn number(&mut self) -> Option<f64> {
        let start = self.index;
        let mut token = self.next();
        if token.map_or(false, |t| t.is_symbol(",")) {
            token = self.next();
        }
        if token.map_or(false, |t| t.is_symbol("%")) {
            token = self.next();
        }
        match token {
            Some(t) if matches!(t.kind, Kind::Number | Kind::LiteralNumber) => t.numeric,
            _ => {
                self.index = start;
                None
            }
        }
    }
}

fn int_literal(value: usize, pos: usize) -> Vec<Token> {
    let mut literal =
        Token::new(Kind::LiteralNumber, value.to_string(), pos).with_numeric(value as f64);
    literal.integer = true;
    vec![Token::new(Kind::Symbol, "%", pos), literal]
}

/// `[BANK %n] POKE %offset,%b,%b...`
fn poke_tokens(bank: Option<u16>, offset: usize, block: &[u8], pos: usize) -> Vec<Token> {
    let mut tokens = vec![];
    if let Some(bank) = bank {
        tokens.push(Token::keyword(codes::BANK, pos));
        tokens.extend(int_literal(bank as usize, pos));
    }
    tokens.push(Token::keyword(codes::POKE, pos));
    tokens.extend(int_literal(offset, pos));
    for byte in block {
        tokens.push(Token::new(Kind::Symbol, ",", pos));
        tokens.extend(int_literal(*byte as usize, pos));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Statement {
        lex(line, Dialect::V208).unwrap()
    }

    fn text(statement: &Statement) -> String {
        decode(&statement.to_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_strip_comments() {
        let stripped = strip_comment(parse("10 PRINT 1: REM done")).unwrap();
        assert_eq!(text(&stripped), "10 PRINT 1");
        assert!(strip_comment(parse("20 REM only")).is_none());
        let kept = strip_comment(parse("30 PRINT 2")).unwrap();
        assert_eq!(kept.line_number, Some(30));
    }

    #[test]
    fn test_undefined() {
        let e = expand_defines(parse("10 PRINT #SPEED"), &HashMap::new(), Dialect::V208)
            .unwrap_err();
        assert_eq!(e.code(), 10);
        assert_eq!(e.detail(), "#SPEED is unknown and not in a #define statement");
    }

    #[test]
    fn test_load_arguments() {
        let s = parse("10 LOAD \"a.bin\" CODE 32768,2: CLS");
        let load = LoadCode::read(&s.tokens, 0).unwrap();
        assert_eq!(load.filename, "a.bin");
        assert_eq!(load.bank, None);
        assert_eq!(load.offset, Some(32768));
        assert_eq!(load.length, Some(2));
        assert!(s.tokens[load.end].kind == Kind::StatementSeparator);

        let s = parse("10 LOAD \"a.bin\" BANK 20");
        let load = LoadCode::read(&s.tokens, 0).unwrap();
        assert_eq!(load.bank, Some(20));
        assert_eq!(load.offset, None);
        assert_eq!(load.end, s.tokens.len());

        assert!(LoadCode::read(&parse("10 LOAD \"c:\"").tokens, 0).is_none());
        assert!(LoadCode::read(&parse("10 LOAD \"game\"").tokens, 0).is_none());
        assert!(LoadCode::read(&parse("10 LOAD \"s.scr\" SCREEN$").tokens, 0).is_none());
    }

    #[test]
    fn test_poke_tokens() {
        let tokens = poke_tokens(Some(20), 0, &[1, 255], 0);
        let s = Statement::new(Some(10), tokens);
        assert_eq!(text(&s), "10 BANK %20 POKE %0,%1,%255");
    }

    #[test]
    fn test_missing_file() {
        let statement = parse("10 LOAD \"nothing-here.bin\" CODE");
        let e = inline_load(statement, Path::new("/nonexistent")).unwrap_err();
        assert_eq!(e.code(), 51);
        assert!(e.detail().starts_with("Cannot find or read"));
    }
}
