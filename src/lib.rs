// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Charts for distributed transaction benchmarks: per-phase latency
//! breakdowns and throughput-latency curves over a coroutine sweep, read from
//! the text logs the benchmark driver writes.

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

mod breakdown;
mod config;
mod config_file;
mod error;
mod layout;
mod logger;
mod metric;
pub mod plot;
mod scan;
mod sweep;

pub use crate::breakdown::{Breakdown, Sample};
pub use crate::config::{BreakdownConfig, SweepConfig, VERSION};
pub use crate::config_file::{ConfigFile, SweepApp};
pub use crate::error::{Error, Result};
pub use crate::layout::LogLayout;
pub use crate::logger::Logger;
pub use crate::metric::Metric;
pub use crate::scan::LogFile;
pub use crate::sweep::{Curve, Point, Sweep};
