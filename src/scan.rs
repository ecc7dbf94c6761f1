// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Error, Metric, Result};

use once_cell::sync::Lazy;
use regex::Regex;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A number with an optional unit suffix, e.g. `3.2ms` or `870ns`.
static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?)([a-zA-Zµ]*)")
        .expect("invalid quantity pattern")
});

const AVERAGE_LATENCY: &str = "average latency:";

/// The text content of one benchmark log.
pub struct LogFile {
    path: PathBuf,
    content: String,
}

impl LogFile {
    /// Reads the whole log into memory, replacing bytes which are not valid
    /// UTF-8. A log that does not exist is reported as `Error::MissingFile`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => Ok(Self::from_content(
                path,
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::MissingFile(path.to_owned())),
            Err(source) => Err(Error::Io {
                path: path.to_owned(),
                source,
            }),
        }
    }

    pub fn from_content(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remainder of every line in which `marker` occurs, starting right after
    /// the marker.
    fn after<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.content
            .lines()
            .filter_map(move |line| after_marker(line, marker))
    }

    /// Duration in microseconds reported after `marker`, taken from the first
    /// matching line that carries a number.
    pub fn duration(&self, marker: &str) -> Option<f64> {
        self.after(marker)
            .filter_map(|rest| rest.split_whitespace().next())
            .find_map(micros)
    }

    /// Mean throughput in millions of transactions per second over every line
    /// reporting it. Values in `K` units are scaled down and `M` values are
    /// kept. Lines in any other unit still count towards the mean as zero.
    pub fn throughput(&self, marker: &str) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0_usize;

        for rest in self.after(marker) {
            count += 1;
            let mut tokens = rest
                .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
                .split_whitespace();
            let value = tokens
                .next()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(0.0);
            let unit = tokens.next().unwrap_or("");

            if unit.contains('K') {
                sum += value / 1000.0;
            } else if unit.contains('M') {
                sum += value;
            } else {
                debug!(
                    "{}: throughput line without K or M unit: {}",
                    self.path.display(),
                    rest.trim()
                );
            }
        }

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// Average end-to-end latency in milliseconds from the first line tagged
    /// with `marker` that reports one.
    pub fn average_latency(&self, marker: &str) -> Option<f64> {
        self.after(marker).find_map(|rest| {
            let start = rest.find(AVERAGE_LATENCY)? + AVERAGE_LATENCY.len();
            rest[start..]
                .trim_matches(|c: char| c == 'm' || c == 's' || c == '.' || c.is_whitespace())
                .parse()
                .ok()
        })
    }

    /// Durations of the given metrics in microseconds. Metrics which the log
    /// does not report are left out.
    pub fn metrics(&self, metrics: &[Metric]) -> Vec<(Metric, f64)> {
        metrics
            .iter()
            .filter_map(|&metric| match self.duration(metric.marker()) {
                Some(value) => Some((metric, value)),
                None => {
                    warn!("not num: {} ({})", self.path.display(), metric);
                    None
                }
            })
            .collect()
    }
}

/// Finds `marker` in `line` at the start or after a non-word character and
/// returns the text following it.
fn after_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let step = marker.chars().next()?.len_utf8();
    let mut from = 0;

    while let Some(pos) = line[from..].find(marker) {
        let start = from + pos;
        let bounded = line[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        if bounded {
            return Some(&line[start + marker.len()..]);
        }
        from = start + step;
    }

    None
}

/// Converts a token such as `3.2ms` to microseconds. A bare number is taken
/// as milliseconds.
fn micros(token: &str) -> Option<f64> {
    let captures = QUANTITY.captures(token)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2).map_or("", |m| m.as_str());

    match unit {
        "" | "ms" => Some(value * 1_000.0),
        "s" => Some(value * 1_000_000.0),
        "us" | "µs" => Some(value),
        "ns" => Some(value / 1_000.0),
        _ => None,
    }
}
