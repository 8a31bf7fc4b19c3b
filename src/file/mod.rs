/*!
# Rust File Module

Whole source files: directives, bank splits, transforms, renumbering and
the TAP and +3DOS containers that wrap tokenised lines.

*/

mod autoline;
pub mod header;
mod program;
mod renumber;
mod transform;

pub use autoline::Autoline;
pub use header::{plus3dos2txt, tap2txt, Container, Format, NO_AUTOSTART};
pub use program::{
    file2bas, file2txt, format_text, parse_lines, validate, BankSplit, Options, Output, Program,
};
pub use renumber::{renumber, shift, Renumber};
pub use transform::{expand_defines, inline_load, strip_comment};
