// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde_derive::Deserialize;

use std::fmt;

/// A phase of a transaction whose average duration is reported in the
/// benchmark logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Metric {
    /// Reading the read set.
    Read,
    /// Locking the write set.
    Lock,
    /// Validating the read set.
    Validate,
    /// Logging the write set to backups.
    Log,
    /// Releasing write locks.
    Release,
    /// Two-phase commit rounds.
    #[serde(rename = "2PC")]
    TwoPc,
    /// Committing the write set.
    Commit,
    /// Renewing read leases.
    Renew,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Read,
        Metric::Lock,
        Metric::Validate,
        Metric::Log,
        Metric::Release,
        Metric::TwoPc,
        Metric::Commit,
        Metric::Renew,
    ];

    /// Name used in legends and diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Read => "Read",
            Metric::Lock => "Lock",
            Metric::Validate => "Validate",
            Metric::Log => "Log",
            Metric::Release => "Release",
            Metric::TwoPc => "2PC",
            Metric::Commit => "Commit",
            Metric::Renew => "Renew",
        }
    }

    /// Text preceding the value on the log line which reports this metric.
    pub fn marker(self) -> &'static str {
        match self {
            Metric::Read => "read_lat time:",
            Metric::Lock => "lock time:",
            Metric::Validate => "validate time:",
            Metric::Log => "log time:",
            Metric::Release => "release_write time:",
            Metric::TwoPc => "2pc time:",
            Metric::Commit => "commit time:",
            Metric::Renew => "renew_lease time:",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}
