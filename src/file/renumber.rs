use crate::error;
use crate::lang::{decode, lex, Dialect, Error, Kind, Statement, Token, MAX_LINE_NUMBER};
use std::collections::HashMap;

/// Which lines to renumber and how.
#[derive(Debug, Clone, PartialEq)]
pub struct Renumber {
    pub dialect: Dialect,
    /// First existing line to renumber. All lines when absent.
    pub start: Option<u16>,
    /// Last existing line to renumber.
    pub end: Option<u16>,
    /// New number of the first renumbered line. Defaults to `start`.
    pub base: Option<u16>,
    pub step: u16,
    /// Add a fixed amount to each line instead of counting from `base`.
    pub inc: Option<u16>,
    pub relocate: bool,
}

impl Default for Renumber {
    fn default() -> Self {
        Renumber {
            dialect: Dialect::default(),
            start: None,
            end: None,
            base: None,
            step: 10,
            inc: None,
            relocate: false,
        }
    }
}

enum Entry {
    Text(String),
    Line(Statement),
}

struct Listing {
    entries: Vec<Entry>,
}

impl Listing {
    fn read(text: &str, dialect: Dialect) -> Result<Listing, Error> {
        let mut entries = vec![];
        for (index, line) in text.split('\n').enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                entries.push(Entry::Text(line.to_string()));
                continue;
            }
            let statement = lex(trimmed, dialect).map_err(|e| e.in_source(index + 1, line))?;
            entries.push(Entry::Line(statement));
        }
        Ok(Listing { entries })
    }

    fn statements(&mut self) -> impl Iterator<Item = &mut Statement> {
        self.entries.iter_mut().filter_map(|e| match e {
            Entry::Line(statement) => Some(statement),
            Entry::Text(_) => None,
        })
    }

    fn line_numbers(&mut self) -> Vec<u16> {
        self.statements().filter_map(|s| s.line_number).collect()
    }

    /// Point every line number reference at `target(old)`.
    fn retarget<F: Fn(u16) -> Option<u16>>(&mut self, target: F) {
        for statement in self.statements() {
            for token in statement.tokens.iter_mut() {
                if let Some(old) = reference(token) {
                    if let Some(new) = target(old).filter(|new| *new != old) {
                        set_reference(token, new);
                    }
                }
            }
        }
    }

    fn write(self) -> Result<String, Error> {
        let mut lines = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            lines.push(match entry {
                Entry::Text(text) => text,
                Entry::Line(statement) => decode(&statement.to_bytes()?)?,
            });
        }
        Ok(lines.join("\n"))
    }
}

fn reference(token: &Token) -> Option<u16> {
    if !token.line_number {
        return None;
    }
    match token.kind {
        Kind::Number | Kind::LiteralNumber | Kind::Binary | Kind::Hex => {}
        _ => return None,
    }
    let value = token.numeric?;
    if value.fract() == 0.0 && value >= 0.0 && value <= MAX_LINE_NUMBER as f64 {
        Some(value as u16)
    } else {
        None
    }
}

fn set_reference(token: &mut Token, line: u16) {
    token.kind = if token.integer {
        Kind::LiteralNumber
    } else {
        Kind::Number
    };
    token.text = line.to_string();
    token.numeric = Some(line as f64);
}

/// Renumber lines and the `GO TO`, `GO SUB`, `RUN` and similar
/// references to them. A reference to a missing line follows the next
/// line after it.
pub fn renumber(text: &str, options: &Renumber) -> Result<String, Error> {
    if options.relocate {
        return Err(error!(InvalidLineNumber; "Relocating lines is not supported"));
    }
    let mut listing = Listing::read(text, options.dialect)?;
    let lines = listing.line_numbers();
    let first = options.start.unwrap_or(0);
    let last = options.end.unwrap_or(MAX_LINE_NUMBER);

    let mut map = HashMap::new();
    let mut next = u32::from(options.base.or(options.start).unwrap_or(10));
    for &old in lines.iter().filter(|n| (first..=last).contains(*n)) {
        let new = match options.inc {
            Some(inc) => u32::from(old) + u32::from(inc),
            None => {
                let new = next;
                next += u32::from(options.step);
                new
            }
        };
        if new > u32::from(MAX_LINE_NUMBER) {
            return Err(error!(InvalidLineNumber, Some(old);
                format!("No room for line {} (would be {})", old, new)));
        }
        map.insert(old, new as u16);
    }
    tracing::debug!(renumbered = map.len(), "renumber");

    listing.retarget(|target| {
        let line = lines.iter().copied().filter(|n| *n >= target).min()?;
        Some(map.get(&line).copied().unwrap_or(line))
    });
    for statement in listing.statements() {
        if let Some(new) = statement.line_number.and_then(|n| map.get(&n)) {
            statement.line_number = Some(*new);
        }
    }
    listing.write()
}

/// Swap a line's statements with its neighbour, keeping both line numbers
/// in place. References to either line follow the statements.
pub fn shift(text: &str, line: u16, forward: bool, dialect: Dialect) -> Result<String, Error> {
    let mut listing = Listing::read(text, dialect)?;
    let lines = listing.line_numbers();
    let index = lines
        .iter()
        .position(|n| *n == line)
        .ok_or_else(|| error!(InvalidLineNumber, Some(line); format!("Line {} not found", line)))?;
    let other = match forward {
        true => lines.get(index + 1).copied(),
        false => index.checked_sub(1).map(|i| lines[i]),
    };
    let other = match other {
        Some(other) => other,
        None => return listing.write(),
    };

    {
        let mut pair: Vec<&mut Statement> = listing
            .statements()
            .filter(|s| s.line_number == Some(line) || s.line_number == Some(other))
            .collect();
        if let [a, b] = pair.as_mut_slice() {
            std::mem::swap(&mut a.tokens, &mut b.tokens);
        }
    }
    listing.retarget(|target| match target {
        t if t == line => Some(other),
        t if t == other => Some(line),
        _ => None,
    });
    listing.write()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_target_follows_next_line() {
        let src = "10 GO TO 15\n20 PRINT 1";
        let options = Renumber {
            start: Some(20),
            base: Some(100),
            ..Renumber::default()
        };
        let res = renumber(src, &options).unwrap();
        assert_eq!(res, "10 GO TO 100\n100 PRINT 1");
    }

    #[test]
    fn test_relocate() {
        let options = Renumber {
            relocate: true,
            ..Renumber::default()
        };
        assert!(renumber("10 CLS", &options).is_err());
    }

    #[test]
    fn test_shift_edges() {
        let src = "10 CLS\n20 PRINT 1";
        assert_eq!(shift(src, 20, true, Dialect::V208).unwrap(), src);
        assert!(shift(src, 30, true, Dialect::V208).is_err());
    }
}
