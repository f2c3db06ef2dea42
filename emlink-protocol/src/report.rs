//! Outbound temperature reports

use core::fmt::Write;

use heapless::String;

/// Longest report line, newline included
pub const REPORT_CAPACITY: usize = 16;

/// Temperature unit used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TempUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TempUnit {
    /// Unit suffix used on the wire
    pub const fn symbol(self) -> char {
        match self {
            TempUnit::Celsius => 'C',
            TempUnit::Fahrenheit => 'F',
        }
    }
}

/// One formatted report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    text: String<REPORT_CAPACITY>,
}

impl Report {
    /// Format `value` with one decimal, e.g. `"71.4 F\n"`
    ///
    /// Returns `None` if the value does not fit the line (only possible
    /// for garbage readings far outside the sensor range).
    pub fn temperature(value: f32, unit: TempUnit) -> Option<Self> {
        let mut text = String::new();
        writeln!(text, "{:.1} {}", value, unit.symbol()).ok()?;
        Some(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}
