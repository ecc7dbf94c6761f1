// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;

use ccplot::{fatal, plot, Breakdown, BreakdownConfig, Logger, VERSION};

fn main() {
    let config = BreakdownConfig::new();

    Logger::new()
        .label("lat_breakdown")
        .level(config.logging())
        .init()
        .expect("Failed to initialize logger");

    info!("lat-breakdown {} initializing...", VERSION);
    config.print();

    let breakdown = Breakdown::collect(&config);
    breakdown.print();
    if breakdown.is_empty() {
        warn!("no latency data found for {}", config.app());
    }

    let output = config.output_file();
    if let Err(e) = plot::plot_breakdown(
        &breakdown,
        config.series(),
        config.y_max(&breakdown),
        &output,
    ) {
        fatal!("{}: {}", output.display(), e);
    }

    info!("saved {}", output.display());
}
