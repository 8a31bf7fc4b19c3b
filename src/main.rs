//! # nextbasic
//!
//! Command line front end: `nextbasic txt2bas` and `nextbasic bas2txt`.

use ansi_term::Style;
use clap::{Args, Parser, Subcommand};
use nextbasic::error;
use nextbasic::file::{self, Container, Format, Options};
use nextbasic::lang::{Dialect, Error};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[arg(short, long, global = true, default_value_t = Level::WARN)]
    log_level: Level,
}

#[derive(Subcommand)]
enum Command {
    /// Convert NextBASIC text to a tokenised file
    Txt2bas(Txt2Bas),
    /// Convert a tokenised file back to NextBASIC text
    Bas2txt(Bas2Txt),
}

#[derive(Args)]
struct Files {
    /// Input file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// `3dos` or `tap`, taken from the file extension when absent
    #[arg(short, long)]
    format: Option<Format>,

    /// Omit the file header
    #[arg(short = 'H', long)]
    headerless: bool,
}

#[derive(Args)]
struct Txt2Bas {
    #[command(flatten)]
    files: Files,

    /// Validate only and report every bad line
    #[arg(short, long)]
    test: bool,

    /// Print the tokens of every line
    #[arg(long)]
    tokens: bool,

    /// Encode the program for a bank
    #[arg(short, long)]
    bank: bool,

    /// Autostart line
    #[arg(short = 'A', long)]
    autostart: Option<u16>,

    /// Strip comments from the output
    #[arg(short = 'C', long)]
    comments_off: bool,

    /// Replace `#NAME` with `#define` values
    #[arg(short = 'D', long)]
    define: bool,

    /// Replace `LOAD "file" CODE` and `LOAD "file" BANK` with `POKE`
    /// statements holding the file, read from the current directory
    #[arg(short = 'L', long)]
    inline_load: bool,

    /// `207`, `208` or `latest`
    #[arg(short = 'P', long, default_value_t = Dialect::V208)]
    parser: Dialect,
}

#[derive(Args)]
struct Bas2Txt {
    #[command(flatten)]
    files: Files,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Command::Txt2bas(args) => txt2bas(args),
        Command::Bas2txt(args) => bas2txt(args),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{}", Style::new().bold().paint(error.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn internal(error: io::Error, path: Option<&Path>) -> Error {
    let msg = match path {
        Some(path) => format!("{}: {}", path.display(), error),
        None => error.to_string(),
    };
    error!(InternalError; msg)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, Error> {
    match path {
        Some(path) if path != Path::new("-") => fs::read(path).map_err(|e| internal(e, Some(path))),
        _ => {
            let mut data = vec![];
            io::stdin()
                .read_to_end(&mut data)
                .map_err(|e| internal(e, None))?;
            Ok(data)
        }
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::write(path, data).map_err(|e| internal(e, Some(path)))
        }
        _ => io::stdout()
            .write_all(data)
            .map_err(|e| internal(e, None)),
    }
}

/// UTF-8 text, or one char per byte when the input is not UTF-8.
fn text_of(data: Vec<u8>) -> String {
    match String::from_utf8(data) {
        Ok(text) => text,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

fn txt2bas(args: Txt2Bas) -> Result<bool, Error> {
    let files = &args.files;
    let text = text_of(read_input(files.input.as_deref())?);
    let dialect = args.parser;

    if args.test {
        let errors = file::validate(&text, dialect);
        let mut report = String::new();
        for error in errors.iter() {
            report.push_str(&format!(
                "{}\n{}^\n\n",
                Style::new().bold().paint(error.to_string()),
                " ".repeat(error.column().start + 2)
            ));
        }
        write_output(files.output.as_deref(), report.as_bytes())?;
        return Ok(errors.is_empty());
    }

    let options = Options {
        dialect,
        validate: false,
        bank: args.bank,
        keep_directives: false,
        strip_comments: args.comments_off,
        defines: args.define,
        inline_load: if args.inline_load {
            Some(PathBuf::from("."))
        } else {
            None
        },
    };

    if args.tokens {
        let program = file::parse_lines(&text, &options)?;
        let mut report = String::new();
        for statement in program.statements.iter() {
            let tokens: Vec<String> = statement
                .tokens
                .iter()
                .map(|t| format!("{:?} {:?}", t.kind, t.text))
                .collect();
            let number = statement
                .line_number
                .map_or_else(String::new, |n| n.to_string());
            report.push_str(&format!("{}: {}\n", number, tokens.join(", ")));
        }
        write_output(files.output.as_deref(), report.as_bytes())?;
        return Ok(true);
    }

    let container = Container {
        format: files
            .format
            .or_else(|| files.output.as_deref().map(Format::from_path))
            .unwrap_or_default(),
        headerless: files.headerless,
        filename: files
            .output
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().into_owned()),
        autostart: args.autostart,
    };
    let output = file::file2bas(&text, &options, &container)?;
    write_output(files.output.as_deref(), &output.bytes)?;

    let dir = files
        .output
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    for (name, bytes) in output.banks.iter() {
        let path = dir.join(name);
        tracing::info!(path = %path.display(), "writing bank");
        fs::write(&path, bytes).map_err(|e| internal(e, Some(&path)))?;
    }
    Ok(true)
}

fn bas2txt(args: Bas2Txt) -> Result<bool, Error> {
    let files = &args.files;
    let data = read_input(files.input.as_deref())?;
    let format = files
        .format
        .or_else(|| files.input.as_deref().map(Format::from_path))
        .unwrap_or_default();
    let text = file::file2txt(&data, format, files.headerless)?;
    write_output(files.output.as_deref(), text.as_bytes())?;
    Ok(true)
}
