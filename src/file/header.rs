//! TAP and +3DOS containers.

use crate::error;
use crate::lang::{codec, decode, Dialect, Error, MAX_LINE_NUMBER};

/// Stored autostart value meaning "do not run".
pub const NO_AUTOSTART: u16 = 0x8000;

const PLUS3DOS_SIGNATURE: &[u8] = b"PLUS3DOS";
const PLUS3DOS_HEADER_LEN: usize = 128;
const TAP_HEADER_LEN: usize = 21;
const BANK_SIZE: usize = 0x4000;
const BANK_AUTOSTART: u16 = 0xc000;
const BANK_FILL: u8 = 0x80;

const TYPE_PROGRAM: u8 = 0;
const TYPE_CODE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plus3Dos,
    Tap,
}

impl Default for Format {
    fn default() -> Self {
        Format::Plus3Dos
    }
}

impl std::str::FromStr for Format {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "3dos" | "plus3dos" | "bas" => Ok(Format::Plus3Dos),
            "tap" => Ok(Format::Tap),
            _ => Err(error!(BadDirective; format!("Unknown format: {}", s))),
        }
    }
}

impl Format {
    /// `.tap` files are tape images, everything else is +3DOS.
    pub fn from_path(path: &std::path::Path) -> Format {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tap") => Format::Tap,
            _ => Format::Plus3Dos,
        }
    }
}

/// How encoded program bytes are wrapped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    pub format: Format,
    /// Emit the raw records with no file header.
    pub headerless: bool,
    /// Tape name, used when the source has no `#program`.
    pub filename: Option<String>,
    /// Used when the source has no `#autostart`.
    pub autostart: Option<u16>,
}

fn checksum_xor(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

fn checksum_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// A 128-byte +3DOS header for a file of `file_len` bytes, header included.
pub fn plus3dos_header(
    file_len: usize,
    kind: u8,
    autostart: u16,
    offset: u16,
) -> Result<[u8; 128], Error> {
    let data_len = file_len.saturating_sub(PLUS3DOS_HEADER_LEN);
    if data_len > u16::max_value() as usize {
        return Err(error!(Overflow; "Program is too large for a +3DOS file"));
    }
    let mut header = [0u8; PLUS3DOS_HEADER_LEN];
    header[..8].copy_from_slice(PLUS3DOS_SIGNATURE);
    header[8] = 0x1a;
    header[9] = 1;
    header[10] = 0;
    header[11..15].copy_from_slice(&(file_len as u32).to_le_bytes());
    header[15] = kind;
    header[16..18].copy_from_slice(&(data_len as u16).to_le_bytes());
    header[18..20].copy_from_slice(&autostart.to_le_bytes());
    header[20..22].copy_from_slice(&offset.to_le_bytes());
    header[127] = checksum_sum(&header[..127]);
    Ok(header)
}

/// A BASIC program as a +3DOS file.
pub fn plus3dos_file(bytes: &[u8], autostart: u16) -> Result<Vec<u8>, Error> {
    let file_len = bytes.len() + PLUS3DOS_HEADER_LEN;
    let header = plus3dos_header(file_len, TYPE_PROGRAM, autostart, bytes.len() as u16)?;
    let mut file = Vec::with_capacity(file_len);
    file.extend_from_slice(&header);
    file.extend_from_slice(bytes);
    Ok(file)
}

/// Records as a +3DOS bank file: `BC`, the records, then `0x80` fill.
/// The earlier dialect fills a whole 16K bank.
pub fn bank_file(bytes: &[u8], dialect: Dialect) -> Result<Vec<u8>, Error> {
    let data_len = bytes.len() + codec::BANK_MARKER.len();
    let (file_len, offset) = match dialect {
        Dialect::V207 => {
            if data_len > BANK_SIZE {
                return Err(error!(Overflow; "Too large for bank"));
            }
            (BANK_SIZE + PLUS3DOS_HEADER_LEN, 0x8000)
        }
        Dialect::V208 => (data_len + 1 + PLUS3DOS_HEADER_LEN, 0x005a),
    };
    let header = plus3dos_header(file_len, TYPE_CODE, BANK_AUTOSTART, offset)?;
    let mut file = vec![BANK_FILL; file_len];
    file[..PLUS3DOS_HEADER_LEN].copy_from_slice(&header);
    let data = PLUS3DOS_HEADER_LEN..PLUS3DOS_HEADER_LEN + data_len;
    file[data.clone()][..2].copy_from_slice(codec::BANK_MARKER);
    file[data][2..].copy_from_slice(bytes);
    Ok(file)
}

/// A BASIC program as a tape image: header block then data block.
pub fn tap_file(bytes: &[u8], filename: &str, autostart: u16) -> Result<Vec<u8>, Error> {
    if bytes.len() + 2 > u16::max_value() as usize {
        return Err(error!(Overflow; "Program is too large for a tape block"));
    }
    let len = bytes.len() as u16;

    let mut header = vec![0x13, 0x00, 0x00, TYPE_PROGRAM];
    let mut name: Vec<u8> = filename
        .chars()
        .take(10)
        .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
        .collect();
    name.resize(10, b' ');
    header.extend_from_slice(&name);
    header.extend_from_slice(&len.to_le_bytes());
    header.extend_from_slice(&autostart.to_le_bytes());
    header.extend_from_slice(&len.to_le_bytes());
    header.push(checksum_xor(&header[2..]));

    let mut file = header;
    file.extend_from_slice(&(len + 2).to_le_bytes());
    let start = file.len();
    file.push(0xff);
    file.extend_from_slice(bytes);
    let checksum = checksum_xor(&file[start..]);
    file.push(checksum);
    Ok(file)
}

fn u16_at(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn with_autostart(text: String, autostart: u16) -> String {
    if autostart != 0 && autostart != NO_AUTOSTART && autostart <= MAX_LINE_NUMBER {
        format!("#autostart {}\n{}", autostart, text)
    } else {
        text
    }
}

/// Text of a tape image holding a BASIC program.
pub fn tap2txt(data: &[u8]) -> Result<String, Error> {
    let corrupt = || error!(CorruptData; "Tape header is incomplete");
    if data.len() < TAP_HEADER_LEN + 3 {
        return Err(corrupt());
    }
    let length = u16_at(data, 14).ok_or_else(corrupt)? as usize;
    let autostart = u16_at(data, 16).ok_or_else(corrupt)?;
    let start = TAP_HEADER_LEN + 3;
    let bytes = data.get(start..start + length).ok_or_else(|| {
        error!(CorruptData; format!(
            "Tape data block needs {} bytes but only {} remain",
            length,
            data.len() - start
        ))
    })?;
    Ok(with_autostart(decode(bytes)?, autostart))
}

/// Text of a +3DOS file holding a BASIC program or bank.
pub fn plus3dos2txt(data: &[u8]) -> Result<String, Error> {
    if data.len() < PLUS3DOS_HEADER_LEN || !data.starts_with(PLUS3DOS_SIGNATURE) {
        return Err(error!(CorruptData; "Missing +3DOS header"));
    }
    let corrupt = || error!(CorruptData; "+3DOS header is incomplete");
    let length = u16_at(data, 16).ok_or_else(corrupt)? as usize;
    let autostart = u16_at(data, 18).ok_or_else(corrupt)?;
    let end = (PLUS3DOS_HEADER_LEN + length).min(data.len());
    if end < PLUS3DOS_HEADER_LEN + length {
        tracing::warn!(length, available = data.len() - PLUS3DOS_HEADER_LEN, "short +3DOS file");
    }
    let text = decode(&data[PLUS3DOS_HEADER_LEN..end])?;
    Ok(with_autostart(text, autostart))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus3dos_header() {
        let header = plus3dos_header(128 + 6, TYPE_PROGRAM, 10, 6).unwrap();
        assert_eq!(&header[..8], b"PLUS3DOS");
        assert_eq!(header[8], 0x1a);
        assert_eq!(&header[11..15], &[134, 0, 0, 0]);
        assert_eq!(&header[16..22], &[6, 0, 10, 0, 6, 0]);
        let sum = header[..127].iter().map(|b| *b as u32).sum::<u32>() % 256;
        assert_eq!(header[127] as u32, sum);
    }

    #[test]
    fn test_tap_blocks() {
        let data = [0x00, 0x0a, 0x02, 0x00, 0xfb, 0x0d];
        let tap = tap_file(&data, "demo", NO_AUTOSTART).unwrap();
        assert_eq!(tap.len(), 21 + 2 + 1 + 6 + 1);
        assert_eq!(&tap[4..14], b"demo      ");
        assert_eq!(checksum_xor(&tap[2..21]), 0);
        assert_eq!(&tap[21..24], &[8, 0, 0xff]);
        assert_eq!(checksum_xor(&tap[23..]), 0);
        assert_eq!(tap2txt(&tap).unwrap(), "10 CLS");
    }

    #[test]
    fn test_bank_files() {
        let data = [0x00, 0x0a, 0x02, 0x00, 0xfb, 0x0d];
        let file = bank_file(&data, Dialect::V208).unwrap();
        assert_eq!(file.len(), 128 + 2 + 6 + 1);
        assert_eq!(&file[128..130], b"BC");
        assert_eq!(file[file.len() - 1], 0x80);
        assert_eq!(plus3dos2txt(&file).unwrap(), "10 CLS");

        let file = bank_file(&data, Dialect::V207).unwrap();
        assert_eq!(file.len(), 128 + 0x4000);
        assert_eq!(plus3dos2txt(&file).unwrap(), "10 CLS");
    }

    #[test]
    fn test_autostart_prefix() {
        let data = [0x00, 0x0a, 0x02, 0x00, 0xfb, 0x0d];
        let file = plus3dos_file(&data, 10).unwrap();
        assert_eq!(plus3dos2txt(&file).unwrap(), "#autostart 10\n10 CLS");
        let file = plus3dos_file(&data, NO_AUTOSTART).unwrap();
        assert_eq!(plus3dos2txt(&file).unwrap(), "10 CLS");
    }

    #[test]
    fn test_corrupt() {
        assert_eq!(plus3dos2txt(b"NOTADOSFILE").unwrap_err().code(), 12);
        assert_eq!(tap2txt(&[0x13, 0x00]).unwrap_err().code(), 12);
    }
}
