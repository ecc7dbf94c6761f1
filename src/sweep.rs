// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Error, LogFile, SweepApp, SweepConfig};

/// Throughput in M txn/s and average latency in ms of one run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    throughput: f64,
    latency: f64,
}

impl Point {
    pub fn new(throughput: f64, latency: f64) -> Self {
        Self {
            throughput,
            latency,
        }
    }

    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }

    /// Reads a point from a run log. Runs which report a zero or no value for
    /// either coordinate give no point.
    pub fn measure(log: &LogFile, throughput_marker: &str, latency_marker: &str) -> Option<Self> {
        let throughput = log.throughput(throughput_marker).filter(|v| *v != 0.0)?;
        let latency = log.average_latency(latency_marker).filter(|v| *v != 0.0)?;
        Some(Self::new(throughput, latency))
    }
}

/// The points of one algorithm under one protocol version, in sweep order.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    algorithm: String,
    version: String,
    points: Vec<Point>,
}

impl Curve {
    pub fn new(algorithm: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            version: version.into(),
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Throughput-latency curves of every algorithm and version for one app.
#[derive(Clone, Debug)]
pub struct Sweep {
    app: String,
    algorithms: Vec<String>,
    versions: Vec<String>,
    curves: Vec<Curve>,
}

impl Sweep {
    pub fn new(app: impl Into<String>, algorithms: &[String], versions: &[String]) -> Self {
        Self {
            app: app.into(),
            algorithms: algorithms.to_vec(),
            versions: versions.to_vec(),
            curves: Vec::new(),
        }
    }

    /// Walks `cor<N>` under the app's data directory for every coroutine
    /// count, building one curve per (algorithm, version).
    pub fn collect(config: &SweepConfig, app: &SweepApp) -> Self {
        let mut sweep = Self::new(app.name(), config.algorithms(), config.versions());
        let data = config.data_dir(app);

        for algorithm in config.algorithms() {
            for version in config.versions() {
                let mut curve = Curve::new(algorithm.as_str(), version.as_str());

                for coroutines in config.coroutines() {
                    let dir = data.join(format!("cor{}", coroutines));
                    let path = config.layout().path(&dir, algorithm, app.name(), version);
                    let log = match LogFile::open(&path) {
                        Ok(log) => log,
                        Err(e @ Error::MissingFile(_)) => {
                            debug!("{}", e);
                            continue;
                        }
                        Err(e) => {
                            error!("{}", e);
                            continue;
                        }
                    };

                    match Point::measure(
                        &log,
                        config.throughput_marker(),
                        config.latency_marker(),
                    ) {
                        Some(point) => {
                            debug!(
                                "{}: {:.3} M txn/s {:.3} ms",
                                path.display(),
                                point.throughput(),
                                point.latency()
                            );
                            curve.push(point);
                        }
                        None => warn!("incomplete run: {}", path.display()),
                    }
                }

                sweep.curves.push(curve);
            }
        }

        sweep
    }

    pub fn push(&mut self, curve: Curve) {
        self.curves.push(curve);
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn curve(&self, algorithm: &str, version: &str) -> Option<&Curve> {
        self.curves
            .iter()
            .find(|c| c.algorithm == algorithm && c.version == version)
    }

    /// Largest throughput and latency over the curves of `algorithm`, or zero
    /// when it has no points.
    pub fn bounds(&self, algorithm: &str) -> (f64, f64) {
        self.curves
            .iter()
            .filter(|c| c.algorithm == algorithm)
            .flat_map(|c| c.points.iter())
            .fold((0.0, 0.0), |(x, y): (f64, f64), p| {
                (x.max(p.throughput), y.max(p.latency))
            })
    }

    pub fn print(&self) {
        info!("-----");
        info!("Throughput-latency: {}", self.app);
        for curve in &self.curves {
            if curve.points.is_empty() {
                info!("{} {}: no data", curve.algorithm, curve.version);
                continue;
            }
            let points: Vec<String> = curve
                .points
                .iter()
                .map(|p| format!("({:.3}, {:.3})", p.throughput, p.latency))
                .collect();
            info!("{} {}: {}", curve.algorithm, curve.version, points.join(" "));
        }
        info!("-----");
    }
}
