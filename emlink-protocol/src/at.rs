//! HM-10 AT name programming
//!
//! The module only accepts AT commands while no central is connected. The
//! exchange is three request/response pairs, each matched byte for byte:
//!
//! | Request          | Expected response  |
//! |------------------|--------------------|
//! | `AT`             | `OK`               |
//! | `AT+NAME<name>`  | `OK+Set:<name>`    |
//! | `AT+RESET`       | `OK+RESET`         |
//!
//! No line terminators are sent or expected.

use heapless::String;

/// Longest name the module accepts
pub const MAX_NAME_LEN: usize = 12;

const STEP_CAPACITY: usize = 24;

/// Errors building the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AtError {
    /// Name is empty, too long or not printable ASCII
    InvalidName,
}

/// One request and its expected response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtStep {
    pub request: String<STEP_CAPACITY>,
    pub response: String<STEP_CAPACITY>,
}

impl AtStep {
    fn new(parts: &[&str], response: &[&str]) -> Self {
        Self {
            request: concat(parts),
            response: concat(response),
        }
    }
}

fn concat(parts: &[&str]) -> String<STEP_CAPACITY> {
    let mut s = String::new();
    for part in parts {
        let pushed = s.push_str(part);
        debug_assert!(pushed.is_ok(), "lengths bounded by MAX_NAME_LEN");
    }
    s
}

/// The full rename sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameExchange {
    steps: [AtStep; 3],
}

impl NameExchange {
    pub fn new(name: &str) -> Result<Self, AtError> {
        let printable = name.bytes().all(|b| b.is_ascii_graphic());
        if name.is_empty() || name.len() > MAX_NAME_LEN || !printable {
            return Err(AtError::InvalidName);
        }
        Ok(Self {
            steps: [
                AtStep::new(&["AT"], &["OK"]),
                AtStep::new(&["AT+NAME", name], &["OK+Set:", name]),
                AtStep::new(&["AT+RESET"], &["OK+RESET"]),
            ],
        })
    }

    pub fn steps(&self) -> &[AtStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_strings() {
        let exchange = NameExchange::new("Node7").unwrap();
        let steps = exchange.steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].request, "AT");
        assert_eq!(steps[0].response, "OK");
        assert_eq!(steps[1].request, "AT+NAMENode7");
        assert_eq!(steps[1].response, "OK+Set:Node7");
        assert_eq!(steps[2].request, "AT+RESET");
        assert_eq!(steps[2].response, "OK+RESET");
    }

    #[test]
    fn test_rejects_bad_names() {
        assert_eq!(NameExchange::new(""), Err(AtError::InvalidName));
        assert_eq!(
            NameExchange::new("ThirteenChars"),
            Err(AtError::InvalidName)
        );
        assert_eq!(NameExchange::new("two words"), Err(AtError::InvalidName));
    }

    #[test]
    fn test_longest_name_fits() {
        let exchange = NameExchange::new("TwelveChars!").unwrap();
        assert_eq!(exchange.steps()[1].response, "OK+Set:TwelveChars!");
    }
}
