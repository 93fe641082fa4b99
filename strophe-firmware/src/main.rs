//! Strophe - Trigger Wheel Simulator Firmware
//!
//! Main firmware binary for RP2040-based signal generator boards.
//! Emulates crank and cam position sensor waveforms for bench testing
//! engine control units.
//!
//! Named after the Greek "strophe" meaning "a turning" - the waveforms
//! here are the electrical shadow of a turning trigger wheel.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_sync::blocking_mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use strophe_core::Engine;

use crate::channels::SharedEngine;
use crate::output::EdgeOutput;

mod channels;
mod output;
mod tasks;

// The engine must live forever for task references
static ENGINE: StaticCell<SharedEngine> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Strophe firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Output pin assignments are board-specific
    // (reference wiring: crank on GPIO2, cam on GPIO3)
    let crank = Output::new(p.PIN_2, Level::Low);
    let cam = Output::new(p.PIN_3, Level::Low);
    let edge_output = EdgeOutput::new(crank, cam);

    // Engine powers up holding its default wheel and speed
    let engine = ENGINE.init(Mutex::new(RefCell::new(Engine::new())));
    info!("Engine initialized");

    // Spawn tasks
    spawner.spawn(tasks::edge_task(engine, edge_output)).unwrap();
    spawner.spawn(tasks::sweep_task(engine)).unwrap();
    spawner.spawn(tasks::command_task(engine)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks.
    // Commands reach the engine through channels::COMMAND_CHANNEL; wire a
    // transport task here when the board grows a console.
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
