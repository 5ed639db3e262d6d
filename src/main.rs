//! Entry point for the **winsplit** daemon.
//!
//! Connects to the X server, grabs the keypad bindings and runs the event
//! loop on the main thread until the process is interrupted.

use log::{error, info, warn};
use winsplit::bindings::KeyBindingTable;
use winsplit::catalog::Catalog;
use winsplit::config::Config;
use winsplit::dispatch::{discard_pending, Dispatcher};
use winsplit::placement::Placer;
use winsplit::x11::X11Display;

/// Read settings from the environment, falling back to defaults.
fn load_config() -> Config {
    match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config();
    let catalog = Catalog::builtin()?;

    let mut display = X11Display::connect()?;
    let desktop = display.desktop()?;

    let bindings = KeyBindingTable::build(&catalog, &config.accelerator_prefix, &display)?;
    discard_pending(&mut display)?;

    let placer = Placer::new(desktop, catalog).with_threshold(config.threshold);
    let dispatcher = Dispatcher::new(bindings, placer);

    info!(
        "winsplit running ({} bindings, prefix {}, threshold {} px)",
        dispatcher.bindings().len(),
        config.accelerator_prefix,
        config.threshold
    );
    println!("Running. Press CTRL+C to cancel.");

    let fd = display.raw_fd();
    winsplit::mainloop::run(dispatcher, display, fd)?;
    Ok(())
}
