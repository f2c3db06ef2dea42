//! Event identifiers

use bitflags::bitflags;

bitflags! {
    /// Pending event bits
    ///
    /// Flags are declared in ascending bit order, which is also the
    /// dispatch order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Events: u32 {
        /// Timer reached COMP0 (period reload)
        const TIMER_COMP0 = 1 << 0;
        /// Timer reached COMP1 (end of active period)
        const TIMER_COMP1 = 1 << 1;
        /// Timer underflow, one per period
        const TIMER_UF = 1 << 2;
        /// Temperature reading completed on the bus
        const SENSOR_DONE = 1 << 3;
        /// Inbound frame finalized
        const LINK_RX_DONE = 1 << 4;
        /// Outbound transmission completed
        const LINK_TX_DONE = 1 << 5;
        /// Posted once at the end of setup
        const BOOT = 1 << 31;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Events {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Events({=u32:#x})", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_is_ascending() {
        let all = Events::all();
        let mut last = 0u32;
        for event in all.iter() {
            assert!(event.bits() > last);
            last = event.bits();
        }
        assert_eq!(last, Events::BOOT.bits());
    }
}
