// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("failed to render chart: {0}")]
    Plot(String),
}

impl<E> From<DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Error::Plot(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
