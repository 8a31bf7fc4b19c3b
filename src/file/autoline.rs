use crate::error;
use crate::lang::{Error, LineNumber};

/// Line number generator driven by `#autoline START[,STEP]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Autoline {
    pub number: u16,
    pub step: u16,
    pub active: bool,
    pub last: Option<u16>,
    pub start: u16,
}

impl Default for Autoline {
    fn default() -> Self {
        Autoline::new(10, 10)
    }
}

impl Autoline {
    pub fn new(number: u16, step: u16) -> Autoline {
        Autoline {
            number,
            step,
            active: false,
            last: None,
            start: number,
        }
    }

    /// The number for the next line, or `None` while inactive.
    pub fn next(&mut self) -> LineNumber {
        if !self.active {
            return None;
        }
        let number = self.number;
        self.last = Some(number);
        self.number = number.saturating_add(self.step);
        Some(number)
    }

    /// Hand back the number taken by the last `next`.
    pub fn prev(&mut self) {
        if let Some(last) = self.last.take() {
            self.number = last;
        }
    }

    pub fn reset(&mut self) {
        if !self.active {
            return;
        }
        self.number = self.start;
        self.last = None;
    }

    /// Read an `#autoline` directive. Without a start number numbering
    /// is switched off.
    pub fn parse(&mut self, line: &str) -> Result<(), Error> {
        let rest = match line.strip_prefix("#autoline") {
            Some(rest) => rest,
            None => return Err(error!(BadDirective; "#autoline expected")),
        };
        let args = parse_args(rest)
            .map_err(|_| error!(BadDirective; format!("Invalid directive: {}", line)))?;
        self.active = args.is_some();
        if let Some((number, step)) = args {
            self.number = number;
            self.start = number;
            self.step = step.unwrap_or(10);
            self.last = None;
        }
        Ok(())
    }
}

fn parse_args(rest: &str) -> Result<Option<(u16, Option<u16>)>, std::num::ParseIntError> {
    if !rest.starts_with(char::is_whitespace) {
        return Ok(None);
    }
    let (number, rest) = match digits(rest.trim_start()) {
        Some(split) => split,
        None => return Ok(None),
    };
    let number = number.parse()?;
    let step = match rest.trim_start().strip_prefix(',') {
        Some(rest) => match digits(rest.trim_start()) {
            Some((step, _)) => Some(step.parse()?),
            None => None,
        },
        None => None,
    };
    Ok(Some((number, step)))
}

fn digits(s: &str) -> Option<(&str, &str)> {
    let len = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if len == 0 {
        None
    } else {
        Some(s.split_at(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive() {
        let mut a = Autoline::default();
        assert_eq!(a.next(), None);
        a.reset();
        assert_eq!(a.number, 10);
    }

    #[test]
    fn test_parse() {
        let mut a = Autoline::default();
        a.parse("#autoline 100,5").unwrap();
        assert!(a.active);
        assert_eq!(a.next(), Some(100));
        assert_eq!(a.next(), Some(105));
        a.prev();
        assert_eq!(a.next(), Some(105));
        a.reset();
        assert_eq!(a.next(), Some(100));

        a.parse("#autoline 1 , 1").unwrap();
        assert_eq!((a.number, a.step), (1, 1));
        a.parse("#autoline 20").unwrap();
        assert_eq!((a.number, a.step), (20, 10));
        a.parse("#autoline").unwrap();
        assert!(!a.active);
    }

    #[test]
    fn test_bad_directive() {
        let mut a = Autoline::default();
        assert_eq!(a.parse("#autostart 10").unwrap_err().code(), 11);
        assert_eq!(a.parse("#autoline 99999").unwrap_err().code(), 11);
    }
}
