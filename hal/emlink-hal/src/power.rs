//! Energy modes
//!
//! Modes are ordered from fully awake (`Em0`) to deepest (`Em4`). A deeper
//! mode stops more clocks and preserves less context; `Em4` loses RAM
//! retention and is never entered automatically.

/// Hardware energy mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnergyMode {
    Em0 = 0,
    Em1 = 1,
    Em2 = 2,
    Em3 = 3,
    Em4 = 4,
}

impl EnergyMode {
    /// Number of modes
    pub const COUNT: usize = 5;

    /// All modes, shallowest first
    pub const ALL: [EnergyMode; Self::COUNT] = [
        EnergyMode::Em0,
        EnergyMode::Em1,
        EnergyMode::Em2,
        EnergyMode::Em3,
        EnergyMode::Em4,
    ];

    /// Table index of this mode
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Mode for a table index
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(EnergyMode::Em0),
            1 => Some(EnergyMode::Em1),
            2 => Some(EnergyMode::Em2),
            3 => Some(EnergyMode::Em3),
            4 => Some(EnergyMode::Em4),
            _ => None,
        }
    }
}

/// Low-power mode entry
pub trait PowerPort {
    /// Enter `mode` and return once an interrupt wakes the core
    fn enter(&mut self, mode: EnergyMode);
}
