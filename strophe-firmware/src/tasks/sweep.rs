//! Sweep stepper task
//!
//! Fixed-cadence correction tick. A `Ticker` keeps the long-run rate
//! honest even when individual wakeups jitter.

use defmt::info;
use embassy_time::{Duration, Ticker};

use strophe_core::timing::SWEEP_TICK_HZ;

use crate::channels::SharedEngine;

#[embassy_executor::task]
pub async fn sweep_task(engine: &'static SharedEngine) {
    info!("Sweep stepper running at {} Hz", SWEEP_TICK_HZ);
    let mut ticker = Ticker::every(Duration::from_hz(SWEEP_TICK_HZ as u64));
    loop {
        ticker.next().await;
        engine.lock(|cell| cell.borrow_mut().correction_tick());
    }
}
