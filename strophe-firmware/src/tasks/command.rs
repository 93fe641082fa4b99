//! Command dispatcher task
//!
//! Drains the command channel and applies each request to the engine.
//! Rejections are logged, never fatal; the engine keeps its previous
//! state when a command fails validation.

use defmt::{info, warn};

use crate::channels::{SharedEngine, COMMAND_CHANNEL};

#[embassy_executor::task]
pub async fn command_task(engine: &'static SharedEngine) {
    info!("Command dispatcher running");
    loop {
        let command = COMMAND_CHANNEL.receive().await;
        let result = engine.lock(|cell| command.apply(&mut cell.borrow_mut()));
        match result {
            Ok(()) => info!("Applied {}", command),
            Err(error) => warn!("Rejected {}: {}", command, error),
        }
    }
}
