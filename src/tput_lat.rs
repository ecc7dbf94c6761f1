// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;

use ccplot::{fatal, plot, Logger, Sweep, SweepConfig, VERSION};

fn main() {
    let config = SweepConfig::new();

    Logger::new()
        .label("tput_lat")
        .level(config.logging())
        .init()
        .expect("Failed to initialize logger");

    info!("tput-lat {} initializing...", VERSION);
    config.print();

    for app in config.apps() {
        let sweep = Sweep::collect(&config, app);
        sweep.print();

        let output = config.output_file(app);
        if let Err(e) = plot::plot_sweep(&sweep, &output) {
            fatal!("{}: {}", output.display(), e);
        }
        info!("saved {}", output.display());
    }
}
