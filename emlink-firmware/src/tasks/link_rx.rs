//! Link UART receive task
//!
//! Moves bytes from the HM-10 into [`LINK_RX`] and wakes the node task.

use defmt::*;
use embassy_rp::uart::{Async, UartRx};

use crate::channels::{LINK_RX, WAKE};

#[embassy_executor::task]
pub async fn link_rx_task(mut rx: UartRx<'static, Async>) {
    info!("Link RX task started");

    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => {
                trace!("RX: {=u8:#x}", byte[0]);
                if LINK_RX.try_send(byte[0]).is_err() {
                    warn!("Link RX channel full, dropping byte");
                }
                WAKE.signal(());
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
