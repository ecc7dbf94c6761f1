// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Error, LogLayout, Metric, Result};

use log::LevelFilter;
use serde_derive::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Optional TOML file overriding the built-in experiment matrix.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    general: General,
    #[serde(default)]
    breakdown: Breakdown,
    #[serde(default)]
    sweep: Sweep,
}

impl ConfigFile {
    pub fn general(&self) -> &General {
        &self.general
    }

    pub fn breakdown(&self) -> &Breakdown {
        &self.breakdown
    }

    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ConfigFile =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.general.cores == 0 {
            return Err(Error::Config("general.cores must be positive".to_owned()));
        }
        self.general.logging()?;
        for (section, list) in &[
            ("breakdown.algorithms", &self.breakdown.algorithms),
            ("breakdown.versions", &self.breakdown.versions),
            ("sweep.algorithms", &self.sweep.algorithms),
            ("sweep.versions", &self.sweep.versions),
        ] {
            if list.is_empty() {
                return Err(Error::Config(format!("{} must not be empty", section)));
            }
        }
        if let Some((app, _)) = self.breakdown.ylim.iter().find(|(_, v)| **v <= 0.0) {
            return Err(Error::Config(format!(
                "breakdown.ylim.{} must be positive",
                app
            )));
        }
        Ok(())
    }
}

fn default_cores() -> usize {
    4
}

fn default_prefix() -> String {
    "drtmh-nocc".to_owned()
}

fn default_suffix() -> String {
    ".log_0".to_owned()
}

fn default_logging() -> String {
    "info".to_owned()
}

fn default_versions() -> Vec<String> {
    vec!["rpc".to_owned(), "onesided".to_owned()]
}

fn default_breakdown_algorithms() -> Vec<String> {
    ["nowait", "waitdie", "occ", "mvcc", "sundial"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_series() -> Vec<Metric> {
    vec![
        Metric::Read,
        Metric::Lock,
        Metric::Validate,
        Metric::Log,
        Metric::Release,
        Metric::Commit,
        Metric::Renew,
    ]
}

fn default_ylim() -> BTreeMap<String, f64> {
    let mut ylim = BTreeMap::new();
    ylim.insert("bank".to_owned(), 12.0);
    ylim.insert("ycsb".to_owned(), 40.0);
    ylim.insert("tpcc".to_owned(), 15.0);
    ylim
}

fn default_sweep_algorithms() -> Vec<String> {
    ["occ", "nowait", "waitdie", "mvcc", "sundial"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_coroutines() -> Vec<usize> {
    (1..=19).step_by(2).collect()
}

fn default_throughput_marker() -> String {
    "System throughput".to_owned()
}

fn default_latency_marker() -> String {
    "bench_listener2.cc:279".to_owned()
}

fn default_apps() -> Vec<SweepApp> {
    vec![
        SweepApp::new("bank", "finaldata/increasing_cor_num_bank"),
        SweepApp::new("ycsb", "finaldata/increasing_cor_num/routine_28_with_calvin"),
        SweepApp::new("tpcc", "finaldata/increasing_cor_num_bank"),
    ]
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    #[serde(default = "default_cores")]
    cores: usize,
    #[serde(default = "default_prefix")]
    prefix: String,
    #[serde(default = "default_suffix")]
    suffix: String,
    #[serde(default = "default_logging")]
    logging: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            cores: default_cores(),
            prefix: default_prefix(),
            suffix: default_suffix(),
            logging: default_logging(),
        }
    }
}

impl General {
    pub fn layout(&self) -> LogLayout {
        LogLayout::new(self.prefix.clone(), self.suffix.clone(), self.cores)
    }

    pub fn logging(&self) -> Result<LevelFilter> {
        self.logging
            .parse()
            .map_err(|_| Error::Config(format!("unknown logging level: {}", self.logging)))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakdown {
    #[serde(default = "default_breakdown_algorithms")]
    algorithms: Vec<String>,
    #[serde(default = "default_versions")]
    versions: Vec<String>,
    #[serde(default = "default_series")]
    series: Vec<Metric>,
    /// Upper bound of the latency axis per application, in microseconds.
    #[serde(default = "default_ylim")]
    ylim: BTreeMap<String, f64>,
}

impl Default for Breakdown {
    fn default() -> Self {
        Self {
            algorithms: default_breakdown_algorithms(),
            versions: default_versions(),
            series: default_series(),
            ylim: default_ylim(),
        }
    }
}

impl Breakdown {
    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn series(&self) -> &[Metric] {
        &self.series
    }

    pub fn ylim(&self, app: &str) -> Option<f64> {
        self.ylim.get(app).copied()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sweep {
    #[serde(default = "default_sweep_algorithms")]
    algorithms: Vec<String>,
    #[serde(default = "default_versions")]
    versions: Vec<String>,
    #[serde(default = "default_coroutines")]
    coroutines: Vec<usize>,
    #[serde(default = "default_throughput_marker")]
    throughput_marker: String,
    #[serde(default = "default_latency_marker")]
    latency_marker: String,
    #[serde(default = "default_apps", rename = "app")]
    apps: Vec<SweepApp>,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            algorithms: default_sweep_algorithms(),
            versions: default_versions(),
            coroutines: default_coroutines(),
            throughput_marker: default_throughput_marker(),
            latency_marker: default_latency_marker(),
            apps: default_apps(),
        }
    }
}

impl Sweep {
    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn coroutines(&self) -> &[usize] {
        &self.coroutines
    }

    pub fn throughput_marker(&self) -> &str {
        &self.throughput_marker
    }

    pub fn latency_marker(&self) -> &str {
        &self.latency_marker
    }

    pub fn apps(&self) -> &[SweepApp] {
        &self.apps
    }
}

/// An application and the directory holding its `cor<N>` run directories.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepApp {
    name: String,
    data: PathBuf,
}

impl SweepApp {
    pub fn new(name: impl Into<String>, data: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Path {
        &self.data
    }
}
