//! Edge player task
//!
//! Plays one wheel edge per iteration, then sleeps for the interval the
//! engine programmed into the output timer. The lock is held only for the
//! edge itself; the sleep happens outside it.

use defmt::info;
use embassy_time::Timer;

use crate::channels::SharedEngine;
use crate::output::EdgeOutput;

#[embassy_executor::task]
pub async fn edge_task(engine: &'static SharedEngine, mut output: EdgeOutput<'static>) {
    info!("Edge player running");
    loop {
        let wait = engine.lock(|cell| {
            cell.borrow_mut().play_edge(&mut output);
            output.interval()
        });
        Timer::after(wait).await;
    }
}
