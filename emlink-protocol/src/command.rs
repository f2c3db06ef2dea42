//! Inbound commands
//!
//! A command is the payload of one start/stop delimited frame. Unknown
//! payloads are not an error; the node ignores them.

use crate::report::TempUnit;

/// Command received from the phone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Switch temperature reports to the given unit
    SetUnit(TempUnit),
}

impl Command {
    /// Parse a frame payload
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match payload {
            b"tempC" => Some(Command::SetUnit(TempUnit::Celsius)),
            b"tempF" => Some(Command::SetUnit(TempUnit::Fahrenheit)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(
            Command::parse(b"tempC"),
            Some(Command::SetUnit(TempUnit::Celsius))
        );
        assert_eq!(
            Command::parse(b"tempF"),
            Some(Command::SetUnit(TempUnit::Fahrenheit))
        );
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(Command::parse(b""), None);
        assert_eq!(Command::parse(b"tempc"), None);
        assert_eq!(Command::parse(b"tempCx"), None);
        assert_eq!(Command::parse(b" tempF"), None);
    }
}
