//!
//! This example runs a component described by a TOML file next to a
//! console component that talks to it over a local route.
//!
//! The console creates a `Float` variable in the component, writes an
//! increasing value to it and asks the component for its CID on every
//! update, logging every reply it gets back.
//!
//! Run it with `cargo run -p minimal-component -- component.toml`; without
//! an argument the component uses the default configuration.
//!

#![deny(missing_docs)]

use std::env;

use crossbeam::channel::unbounded;
use tracing::info;

use nrs::{
    core::{Executor, PortId},
    executors::SimpleExecutor,
    prelude::LocalRoute,
    ComponentConfig, ComponentError, ProcessComponent,
};

pub mod console;
use console::Console;

/// The port of the component the console is attached to
const CONSOLE_PORT: u8 = PortId::MAX;

fn main() -> Result<(), ComponentError> {
    let config = match env::args().nth(1) {
        Some(path) => ComponentConfig::from_file(path)?,
        None => ComponentConfig::default(),
    };
    nrs::logging::init(&config.log_level);

    let mut component = ProcessComponent::new(&config)?;
    let (component_end, console_end) =
        LocalRoute::pair(PortId::new(CONSOLE_PORT as u32)?, PortId::new(1)?);
    component.add_route(Box::new(component_end.with_cid("console")));
    let console = Console::new(console_end.with_cid(config.cid.as_str()))?;

    let (tx, rx) = unbounded();
    ctrlc::set_handler(move || tx.send(true).expect("Could not send interrupt"))
        .expect("Error setting Ctrl-C handler");

    info!(cid = config.cid.as_str(), "running until interrupted");
    let mut executor = SimpleExecutor::new_with(rx, vec![Box::new(component), Box::new(console)]);
    executor.update_loop();

    Ok(())
}
