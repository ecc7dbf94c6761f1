// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{BreakdownConfig, Error, LogFile, Metric};

/// One latency measurement, in microseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    metric: Metric,
    algorithm: String,
    version: String,
    value: f64,
}

impl Sample {
    pub fn new(
        metric: Metric,
        algorithm: impl Into<String>,
        version: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            metric,
            algorithm: algorithm.into(),
            version: version.into(),
            value,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Per-phase latencies of every algorithm under every protocol version for a
/// single application.
#[derive(Clone, Debug)]
pub struct Breakdown {
    app: String,
    algorithms: Vec<String>,
    versions: Vec<String>,
    samples: Vec<Sample>,
}

impl Breakdown {
    pub fn new(app: impl Into<String>, algorithms: &[String], versions: &[String]) -> Self {
        Self {
            app: app.into(),
            algorithms: algorithms.to_vec(),
            versions: versions.to_vec(),
            samples: Vec::new(),
        }
    }

    /// Scans the log of every (version, algorithm) pair for the configured
    /// series. Missing logs and metrics are reported and left out.
    pub fn collect(config: &BreakdownConfig) -> Self {
        let mut breakdown = Self::new(config.app(), config.algorithms(), config.versions());

        for version in config.versions() {
            for algorithm in config.algorithms() {
                let path = config
                    .layout()
                    .path(config.input(), algorithm, config.app(), version);
                let log = match LogFile::open(&path) {
                    Ok(log) => log,
                    Err(e @ Error::MissingFile(_)) => {
                        warn!("{}", e);
                        continue;
                    }
                    Err(e) => {
                        error!("{}", e);
                        continue;
                    }
                };
                debug!("scanning {}", path.display());

                for (metric, value) in log.metrics(config.series()) {
                    breakdown.record(Sample::new(
                        metric,
                        algorithm.as_str(),
                        version.as_str(),
                        value,
                    ));
                }
            }
        }

        breakdown
    }

    pub fn record(&mut self, sample: Sample) {
        self.samples.push(sample);
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

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn value(&self, version: &str, algorithm: &str, metric: Metric) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.metric == metric && s.algorithm == algorithm && s.version == version)
            .map(|s| s.value)
    }

    /// Values of `metric` under `version`, one per algorithm in order.
    pub fn series(&self, version: &str, metric: Metric) -> Vec<Option<f64>> {
        self.algorithms
            .iter()
            .map(|algorithm| self.value(version, algorithm, metric))
            .collect()
    }

    /// Largest value among the given metrics.
    pub fn max_value(&self, metrics: &[Metric]) -> Option<f64> {
        self.samples
            .iter()
            .filter(|s| metrics.contains(&s.metric))
            .map(|s| s.value)
            .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))))
    }

    pub fn print(&self) {
        info!("-----");
        info!("Latency breakdown: {} (us)", self.app);
        for version in &self.versions {
            for algorithm in &self.algorithms {
                let values: Vec<String> = Metric::ALL
                    .iter()
                    .filter_map(|&metric| {
                        self.value(version, algorithm, metric)
                            .map(|v| format!("{}: {:.2}", metric, v))
                    })
                    .collect();
                if values.is_empty() {
                    info!("{} {}: no data", version, algorithm);
                } else {
                    info!("{} {}: {}", version, algorithm, values.join(" "));
                }
            }
        }
        info!("-----");
    }
}
