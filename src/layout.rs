// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::path::{Path, PathBuf};

/// Naming scheme of the log files written by the benchmark driver.
///
/// A run of `algorithm` on `app` with `cores` cores and protocol `version`
/// writes `{prefix}{algorithm}-{app}-{cores}-{version}{suffix}`.
#[derive(Clone, Debug, PartialEq)]
pub struct LogLayout {
    prefix: String,
    suffix: String,
    cores: usize,
}

impl Default for LogLayout {
    fn default() -> Self {
        Self {
            prefix: "drtmh-nocc".to_owned(),
            suffix: ".log_0".to_owned(),
            cores: 4,
        }
    }
}

impl LogLayout {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, cores: usize) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            cores,
        }
    }

    pub fn cores(&self) -> usize {
        self.cores
    }

    pub fn set_cores(&mut self, cores: usize) {
        self.cores = cores;
    }

    pub fn file_name(&self, algorithm: &str, app: &str, version: &str) -> String {
        format!(
            "{}{}-{}-{}-{}{}",
            self.prefix, algorithm, app, self.cores, version, self.suffix
        )
    }

    pub fn path(&self, dir: &Path, algorithm: &str, app: &str, version: &str) -> PathBuf {
        dir.join(self.file_name(algorithm, app, version))
    }
}
