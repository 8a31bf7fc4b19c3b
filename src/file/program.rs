use super::header::{self, Container, Format, NO_AUTOSTART};
use super::{expand_defines, inline_load, strip_comment, Autoline};
use crate::error;
use crate::lang::codec::BANK_LINE_LIMIT;
use crate::lang::{
    decode, lex, lex_with_line_number, parse_line_number, validate_line_number, Dialect, Error,
    LineNumber, Statement,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// Settings for reading a whole source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub dialect: Dialect,
    /// Check grammar and line order while reading.
    pub validate: bool,
    /// The program itself is encoded for a bank.
    pub bank: bool,
    /// Keep `#` lines as directive statements.
    pub keep_directives: bool,
    pub strip_comments: bool,
    /// Substitute `#NAME` references.
    pub defines: bool,
    /// Inline `LOAD "file" CODE` and `LOAD "file" BANK` as `POKE`
    /// statements, reading the files from this directory.
    pub inline_load: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            dialect: Dialect::default(),
            validate: true,
            bank: false,
            keep_directives: false,
            strip_comments: false,
            defines: false,
            inline_load: None,
        }
    }
}

/// Lines after a `#bank` or `#bankfile` directive, written to their own file.
#[derive(Debug, Clone, PartialEq)]
pub struct BankSplit {
    pub filename: String,
    /// Number of program statements read before the split.
    pub line: usize,
    pub statements: Vec<Statement>,
    sources: Vec<Source>,
}

impl BankSplit {
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        statements_to_bytes(&self.statements, &self.sources, true)
    }
}

/// 1-based index and text of the source line a statement came from.
type Source = (usize, String);

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub autostart: Option<u16>,
    pub filename: Option<String>,
    pub defines: HashMap<String, Statement>,
    pub bank_splits: Vec<BankSplit>,
    pub autoline: Autoline,
    sources: Vec<Source>,
    bank: bool,
}

impl Program {
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        statements_to_bytes(&self.statements, &self.sources, self.bank)
    }
}

fn statements_to_bytes(
    statements: &[Statement],
    sources: &[Source],
    bank: bool,
) -> Result<Vec<u8>, Error> {
    let mut bytes = vec![];
    for (statement, (index, line)) in statements.iter().zip(sources) {
        if statement.is_directive() {
            continue;
        }
        let record = if bank {
            statement.to_bytes_within(BANK_LINE_LIMIT)
        } else {
            statement.to_bytes()
        }
        .map_err(|e| e.in_source(*index, line))?;
        bytes.extend_from_slice(&record);
    }
    tracing::debug!(statements = statements.len(), bytes = bytes.len(), bank, "encoded");
    Ok(bytes)
}

/// Apply the optional transforms, keeping each statement paired with its
/// source line.
fn transform(
    statements: Vec<Statement>,
    sources: Vec<Source>,
    options: &Options,
    defines: &HashMap<String, Statement>,
) -> Result<(Vec<Statement>, Vec<Source>), Error> {
    let mut kept = Vec::with_capacity(statements.len());
    let mut kept_sources = Vec::with_capacity(sources.len());
    for (mut statement, (index, line)) in statements.into_iter().zip(sources) {
        let in_source = |e: Error| e.in_source(index, &line);
        if options.defines {
            statement = expand_defines(statement, defines, options.dialect).map_err(in_source)?;
        }
        if options.strip_comments {
            statement = match strip_comment(statement) {
                Some(statement) => statement,
                None => continue,
            };
        }
        let expanded = match &options.inline_load {
            Some(dir) => inline_load(statement, dir).map_err(in_source)?,
            None => vec![statement],
        };
        for statement in expanded {
            kept.push(statement);
            kept_sources.push((index, line.clone()));
        }
    }
    Ok((kept, kept_sources))
}

fn lex_line(line: &str, autoline: &mut Autoline, dialect: Dialect) -> Result<Statement, Error> {
    match autoline.next() {
        Some(number) => lex_with_line_number(line, Some(number), dialect),
        None => lex(line, dialect),
    }
}

fn source_lines(text: &str) -> std::str::Split<'_, char> {
    text.split(if text.contains('\r') { '\r' } else { '\n' })
}

/// Read a whole source file into statements, following its directives.
pub fn parse_lines(text: &str, options: &Options) -> Result<Program, Error> {
    let dialect = options.dialect;
    let mut autoline = Autoline::default();
    let mut statements: Vec<Statement> = vec![];
    let mut sources: Vec<Source> = vec![];
    let mut bank_splits: Vec<BankSplit> = vec![];
    let mut defines = HashMap::new();
    let mut filename: Option<String> = None;
    let mut autostart: Option<u16> = None;
    let mut autostart_pending = false;
    let mut last_line: LineNumber = None;

    for (index, line) in source_lines(text).enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let in_source = |e: Error| e.in_source(index + 1, line);
        let directive = line.starts_with('#');

        if directive {
            let arg = line.split(' ').nth(1);
            if line.starts_with("#program ") {
                filename = arg.map(str::to_string);
            }
            if line.starts_with("#bankfile ") || line.starts_with("#bank ") {
                let name = arg
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| in_source(error!(BadDirective; "Bank name is missing")))?;
                let filename = if line.starts_with("#bank ") {
                    format!("{}-{}.bnk", filename.as_deref().unwrap_or("untitled"), name)
                } else {
                    name.to_string()
                };
                tracing::debug!(%filename, "bank split");
                autoline.reset();
                last_line = None;
                bank_splits.push(BankSplit {
                    filename,
                    line: statements.len(),
                    statements: vec![],
                    sources: vec![],
                });
            }
            if line.starts_with("#autoline") {
                autoline.parse(line).map_err(in_source)?;
            }
            if line.starts_with("#autostart") {
                match arg.and_then(|a| a.parse::<u16>().ok()) {
                    Some(n) => {
                        autostart = Some(n);
                        autostart_pending = false;
                    }
                    None => autostart_pending = true,
                }
            }
            if line.get(..8).map_or(false, |p| p.eq_ignore_ascii_case("#define ")) {
                let mut parts = line[8..].splitn(2, '=');
                let key = parts.next().unwrap_or_default().trim().to_string();
                let value = parts.next().unwrap_or_default().trim();
                let define =
                    lex_with_line_number(value, Some(0), dialect).map_err(in_source)?;
                defines.insert(key, define);
            }
            if !options.keep_directives {
                continue;
            }
        }

        if autostart_pending {
            autostart = if autoline.active {
                Some(autoline.number)
            } else {
                parse_line_number(line).ok().and_then(|(n, _)| n)
            };
            autostart_pending = false;
        }

        let statement = if directive {
            lex(line, dialect)
        } else {
            lex_line(line, &mut autoline, dialect)
        }
        .map_err(in_source)?;

        if options.validate {
            statement.validate(dialect).map_err(in_source)?;
            if !directive {
                validate_line_number(statement.line_number, last_line).map_err(in_source)?;
            }
        }
        if !directive {
            last_line = statement.line_number;
        }

        let source = (index + 1, line.to_string());
        match bank_splits.last_mut() {
            Some(split) => {
                split.statements.push(statement);
                split.sources.push(source);
            }
            None => {
                statements.push(statement);
                sources.push(source);
            }
        }
    }

    let (statements, sources) = transform(statements, sources, options, &defines)?;
    for split in bank_splits.iter_mut() {
        let (kept, kept_sources) = transform(
            std::mem::take(&mut split.statements),
            std::mem::take(&mut split.sources),
            options,
            &defines,
        )?;
        split.statements = kept;
        split.sources = kept_sources;
    }

    tracing::debug!(
        statements = statements.len(),
        banks = bank_splits.len(),
        ?autostart,
        "parsed program"
    );

    Ok(Program {
        statements,
        autostart,
        filename,
        defines,
        bank_splits,
        autoline,
        sources,
        bank: options.bank,
    })
}

/// Check every line, collecting one error per bad line.
pub fn validate(text: &str, dialect: Dialect) -> Vec<Error> {
    let mut errors = vec![];
    let mut autoline = Autoline::default();
    let mut last_line: LineNumber = None;

    for (index, line) in source_lines(text).enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            if line.starts_with("#autoline") {
                if let Err(e) = autoline.parse(line) {
                    errors.push(e.in_source(index + 1, line));
                }
            }
            if line.starts_with("#bank") {
                autoline.reset();
                last_line = None;
            }
            continue;
        }
        let checked = lex_line(line, &mut autoline, dialect).and_then(|statement| {
            validate_line_number(statement.line_number, last_line)?;
            statement.validate(dialect)?;
            Ok(statement.line_number)
        });
        last_line = match checked {
            Ok(line_number) => line_number,
            Err(e) => {
                errors.push(e.in_source(index + 1, line));
                None
            }
        };
    }
    errors
}

/// Normalise source text by running each line through encode and decode.
/// With `autoline` the lines carry no numbers, though a leading number
/// followed by a space is kept.
pub fn format_text(text: &str, dialect: Dialect, autoline: bool) -> Result<String, Error> {
    text.split('\n')
        .map(|line| format_line(line, dialect, autoline))
        .collect::<Result<Vec<_>, _>>()
        .map(|lines| lines.join("\n"))
}

fn format_line(line: &str, dialect: Dialect, autoline: bool) -> Result<String, Error> {
    if line.starts_with('#') || line.trim().is_empty() {
        return Ok(line.to_string());
    }
    if !autoline {
        let statement = lex(line, dialect)?;
        return decode(&statement.to_bytes()?);
    }

    let (number, body) = match split_number(line) {
        Some((number, body)) => (Some(number), body),
        None => (None, line),
    };
    let statement = lex_with_line_number(body, Some(10), dialect)?;
    let text = decode(&statement.to_bytes()?)?;
    let text = text.splitn(2, ' ').nth(1).unwrap_or_default();
    Ok(match number {
        Some(number) => format!("{} {}", number, text),
        None => text.to_string(),
    })
}

fn split_number(line: &str) -> Option<(&str, &str)> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let body = rest.trim_start();
    if body.len() == rest.len() || body.is_empty() {
        return None;
    }
    Some((&line[..digits], body))
}

/// The encoded program, plus any bank files split off by directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    pub bytes: Vec<u8>,
    pub banks: Vec<(String, Vec<u8>)>,
}

/// Encode source text into a file.
pub fn file2bas(src: &str, options: &Options, container: &Container) -> Result<Output, Error> {
    let program = parse_lines(src, options)?;
    let bytes = program.to_bytes()?;
    let autostart = program
        .autostart
        .or(container.autostart)
        .unwrap_or(NO_AUTOSTART);
    let filename = program
        .filename
        .clone()
        .or_else(|| container.filename.clone())
        .unwrap_or_else(|| "untitled".to_string());

    if container.headerless {
        let bytes = if options.bank {
            [crate::lang::codec::BANK_MARKER, &bytes[..]].concat()
        } else {
            bytes
        };
        return Ok(Output {
            bytes,
            banks: vec![],
        });
    }

    if container.format == Format::Tap {
        return Ok(Output {
            bytes: header::tap_file(&bytes, &filename, autostart)?,
            banks: vec![],
        });
    }

    let bytes = if options.bank {
        header::bank_file(&bytes, options.dialect)?
    } else {
        header::plus3dos_file(&bytes, autostart)?
    };
    let mut banks = vec![];
    for split in program.bank_splits.iter() {
        let file = header::bank_file(&split.to_bytes()?, options.dialect)?;
        banks.push((split.filename.clone(), file));
    }
    Ok(Output { bytes, banks })
}

/// Decode a file back into source text, ending with a newline.
pub fn file2txt(data: &[u8], format: Format, headerless: bool) -> Result<String, Error> {
    if data.is_empty() {
        return Err(error!(CorruptData; "No data to decode"));
    }
    let text = if headerless {
        decode(data)?
    } else {
        match format {
            Format::Tap => header::tap2txt(data)?,
            Format::Plus3Dos => header::plus3dos2txt(data)?,
        }
    };
    Ok(text + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_number() {
        assert_eq!(split_number("10 .install file"), Some(("10", ".install file")));
        assert_eq!(split_number("PRINT 1"), None);
        assert_eq!(split_number("10"), None);
        assert_eq!(split_number("10PRINT"), None);
    }

    #[test]
    fn test_directives() {
        let src = "#program demo\n#autostart\n#autoline 100,5\nCLS\nPAUSE 0\n#bank extra\nCLS\n";
        let program = parse_lines(src, &Options::default()).unwrap();
        assert_eq!(program.filename.as_deref(), Some("demo"));
        assert_eq!(program.autostart, Some(100));
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.statements[1].line_number, Some(105));
        assert_eq!(program.bank_splits.len(), 1);
        let split = &program.bank_splits[0];
        assert_eq!(split.filename, "demo-extra.bnk");
        assert_eq!(split.line, 2);
        assert_eq!(split.statements[0].line_number, Some(100));
    }

    #[test]
    fn test_error_context() {
        let e = parse_lines("10 CLS\n\n10 CLS", &Options::default()).unwrap_err();
        assert_eq!(e.detail(), "Duplicate line number on 10");
        assert!(e.to_string().ends_with("#3\n> 10 CLS"));
    }
}
