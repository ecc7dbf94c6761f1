// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config_file::{ConfigFile, SweepApp};
use crate::{Breakdown, Error, LogLayout, Metric, Result};

use clap::{App, Arg, ArgMatches};
use log::LevelFilter;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Latency axis bound used when neither the config nor the data provide one.
const DEFAULT_YLIM: f64 = 10.0;

/// Settings for one run of `lat-breakdown`.
#[derive(Clone, Debug)]
pub struct BreakdownConfig {
    input: PathBuf,
    app: String,
    output: PathBuf,
    layout: LogLayout,
    algorithms: Vec<String>,
    versions: Vec<String>,
    series: Vec<Metric>,
    ylim: Option<f64>,
    logging: LevelFilter,
}

impl BreakdownConfig {
    /// parse command line options and return `BreakdownConfig`
    pub fn new() -> Self {
        match Self::from_args(std::env::args_os()) {
            Ok(config) => config,
            Err(e) => exit(e),
        }
    }

    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = App::new("lat-breakdown")
            .version(VERSION)
            .about("Per-phase transaction latency chart from benchmark logs")
            .arg(
                Arg::with_name("input")
                    .value_name("INPUT_DIR")
                    .help("Directory holding the benchmark logs")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::with_name("app")
                    .value_name("APP")
                    .help("Application name, e.g. bank, ycsb or tpcc")
                    .required(true)
                    .index(2),
            )
            .arg(
                Arg::with_name("output")
                    .long("output")
                    .short("o")
                    .value_name("DIR")
                    .help("Directory the chart is written to")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("cores")
                    .long("cores")
                    .value_name("COUNT")
                    .help("Core count encoded in the log file names")
                    .takes_value(true),
            )
            .arg(config_arg())
            .arg(verbose_arg())
            .get_matches_from_safe(args)?;

        let file = load_file(&matches)?;
        let breakdown = file.breakdown();

        let mut layout = file.general().layout();
        if let Some(cores) = matches.value_of("cores") {
            layout.set_cores(parse_cores(cores)?);
        }

        let app = required(&matches, "app")?;

        Ok(Self {
            input: PathBuf::from(required(&matches, "input")?),
            ylim: breakdown.ylim(&app),
            app,
            output: PathBuf::from(matches.value_of("output").unwrap_or(".")),
            layout,
            algorithms: breakdown.algorithms().to_vec(),
            versions: breakdown.versions().to_vec(),
            series: breakdown.series().to_vec(),
            logging: verbosity(
                file.general().logging()?,
                matches.occurrences_of("verbose"),
            ),
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn layout(&self) -> &LogLayout {
        &self.layout
    }

    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn series(&self) -> &[Metric] {
        &self.series
    }

    pub fn logging(&self) -> LevelFilter {
        self.logging
    }

    pub fn output_file(&self) -> PathBuf {
        self.output.join(format!("lat_breakdown-{}.svg", self.app))
    }

    /// Upper bound of the latency axis: the configured bound for the app, or
    /// 20% above the tallest plotted bar.
    pub fn y_max(&self, breakdown: &Breakdown) -> f64 {
        if let Some(ylim) = self.ylim {
            return ylim;
        }
        match breakdown.max_value(&self.series) {
            Some(max) if max > 0.0 => max * 1.2,
            _ => DEFAULT_YLIM,
        }
    }

    pub fn print(&self) {
        info!("-----");
        info!("Config:");
        info!(
            "Config: Input: {} App: {} Output: {}",
            self.input.display(),
            self.app,
            self.output_file().display()
        );
        info!(
            "Config: Cores: {} Algorithms: {} Versions: {}",
            self.layout.cores(),
            self.algorithms.join(","),
            self.versions.join(",")
        );
        info!(
            "Config: Series: {}",
            self.series
                .iter()
                .map(|m| m.label())
                .collect::<Vec<_>>()
                .join(",")
        );
        info!("-----");
    }
}

/// Settings for one run of `tput-lat`.
#[derive(Clone, Debug)]
pub struct SweepConfig {
    output: PathBuf,
    data_root: PathBuf,
    layout: LogLayout,
    algorithms: Vec<String>,
    versions: Vec<String>,
    coroutines: Vec<usize>,
    throughput_marker: String,
    latency_marker: String,
    apps: Vec<SweepApp>,
    logging: LevelFilter,
}

impl SweepConfig {
    /// parse command line options and return `SweepConfig`
    pub fn new() -> Self {
        match Self::from_args(std::env::args_os()) {
            Ok(config) => config,
            Err(e) => exit(e),
        }
    }

    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = App::new("tput-lat")
            .version(VERSION)
            .about("Throughput-latency curves from a coroutine sweep")
            .arg(
                Arg::with_name("output")
                    .value_name("OUTPUT_DIR")
                    .help("Directory the charts are written to")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::with_name("data-root")
                    .long("data-root")
                    .value_name("DIR")
                    .help("Directory the per-app data directories are relative to")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("app")
                    .long("app")
                    .value_name("NAME")
                    .help("Only chart this application. Can be used more than once")
                    .takes_value(true)
                    .multiple(true)
                    .number_of_values(1),
            )
            .arg(
                Arg::with_name("cores")
                    .long("cores")
                    .value_name("COUNT")
                    .help("Core count encoded in the log file names")
                    .takes_value(true),
            )
            .arg(config_arg())
            .arg(verbose_arg())
            .get_matches_from_safe(args)?;

        let file = load_file(&matches)?;
        let sweep = file.sweep();

        let mut layout = file.general().layout();
        if let Some(cores) = matches.value_of("cores") {
            layout.set_cores(parse_cores(cores)?);
        }

        let apps = match matches.values_of("app") {
            Some(names) => names
                .map(|name| {
                    sweep
                        .apps()
                        .iter()
                        .find(|app| app.name() == name)
                        .cloned()
                        .ok_or_else(|| {
                            Error::Config(format!("no data directory configured for app: {}", name))
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            None => sweep.apps().to_vec(),
        };

        Ok(Self {
            output: PathBuf::from(required(&matches, "output")?),
            data_root: PathBuf::from(matches.value_of("data-root").unwrap_or(".")),
            layout,
            algorithms: sweep.algorithms().to_vec(),
            versions: sweep.versions().to_vec(),
            coroutines: sweep.coroutines().to_vec(),
            throughput_marker: sweep.throughput_marker().to_owned(),
            latency_marker: sweep.latency_marker().to_owned(),
            apps,
            logging: verbosity(
                file.general().logging()?,
                matches.occurrences_of("verbose"),
            ),
        })
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn layout(&self) -> &LogLayout {
        &self.layout
    }

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

    pub fn logging(&self) -> LevelFilter {
        self.logging
    }

    pub fn data_dir(&self, app: &SweepApp) -> PathBuf {
        self.data_root.join(app.data())
    }

    pub fn output_file(&self, app: &SweepApp) -> PathBuf {
        self.output.join(format!("latency-tput{}.svg", app.name()))
    }

    pub fn print(&self) {
        info!("-----");
        info!("Config:");
        info!(
            "Config: Data root: {} Output: {}",
            self.data_root.display(),
            self.output.display()
        );
        info!(
            "Config: Cores: {} Algorithms: {} Versions: {}",
            self.layout.cores(),
            self.algorithms.join(","),
            self.versions.join(",")
        );
        info!(
            "Config: Coroutines: {}",
            self.coroutines
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",")
        );
        for app in &self.apps {
            info!(
                "Config: App: {} Data: {}",
                app.name(),
                self.data_dir(app).display()
            );
        }
        info!("-----");
    }
}

fn config_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("config")
        .long("config")
        .value_name("FILE")
        .help("TOML config file")
        .takes_value(true)
}

fn verbose_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("verbose")
        .short("v")
        .long("verbose")
        .help("Increase verbosity by one level. Can be used more than once")
        .multiple(true)
}

fn load_file(matches: &ArgMatches) -> Result<ConfigFile> {
    match matches.value_of("config") {
        Some(path) => ConfigFile::load_from_file(Path::new(path)),
        None => Ok(ConfigFile::default()),
    }
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .value_of(name)
        .map(str::to_owned)
        .ok_or_else(|| Error::Config(format!("missing argument: {}", name)))
}

fn parse_cores(value: &str) -> Result<usize> {
    match value.parse() {
        Ok(cores) if cores > 0 => Ok(cores),
        _ => Err(Error::Config(format!("bad value for cores: {}", value))),
    }
}

fn verbosity(base: LevelFilter, occurrences: u64) -> LevelFilter {
    (0..occurrences).fold(base, |level, _| match level {
        LevelFilter::Off => LevelFilter::Error,
        LevelFilter::Error => LevelFilter::Warn,
        LevelFilter::Warn => LevelFilter::Info,
        LevelFilter::Info => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    })
}

/// Reports a configuration error before logging is set up, then exits.
fn exit(e: Error) -> ! {
    match e {
        Error::Cli(e) => e.exit(),
        e => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sample;

    #[test]
    fn breakdown_positional() {
        let config = BreakdownConfig::from_args(vec!["lat-breakdown", "logs", "bank"]).unwrap();
        assert_eq!(config.input(), Path::new("logs"));
        assert_eq!(config.app(), "bank");
        assert_eq!(config.output(), Path::new("."));
        assert_eq!(config.layout(), &LogLayout::default());
        assert_eq!(config.logging(), LevelFilter::Info);
        assert_eq!(
            config.output_file(),
            PathBuf::from("./lat_breakdown-bank.svg")
        );
        assert_eq!(config.algorithms()[0], "nowait");
        assert_eq!(config.series().len(), 7);
    }

    #[test]
    fn breakdown_options() {
        let config = BreakdownConfig::from_args(vec![
            "lat-breakdown",
            "logs",
            "ycsb",
            "--output",
            "out",
            "--cores",
            "8",
            "-vv",
        ])
        .unwrap();
        assert_eq!(config.layout().cores(), 8);
        assert_eq!(config.logging(), LevelFilter::Trace);
        assert_eq!(config.output_file(), PathBuf::from("out/lat_breakdown-ycsb.svg"));
    }

    #[test]
    fn breakdown_missing_app() {
        assert!(matches!(
            BreakdownConfig::from_args(vec!["lat-breakdown", "logs"]),
            Err(Error::Cli(_))
        ));
    }

    #[test]
    fn breakdown_bad_cores() {
        assert!(matches!(
            BreakdownConfig::from_args(vec!["lat-breakdown", "logs", "bank", "--cores", "zero"]),
            Err(Error::Config(_))
        ));
        assert!(
            BreakdownConfig::from_args(vec!["lat-breakdown", "logs", "bank", "--cores", "0"])
                .is_err()
        );
    }

    #[test]
    fn breakdown_y_max() {
        let config = BreakdownConfig::from_args(vec!["lat-breakdown", "logs", "tpcc"]).unwrap();
        let breakdown = Breakdown::new("tpcc", config.algorithms(), config.versions());
        assert_eq!(config.y_max(&breakdown), 15.0);

        let config = BreakdownConfig::from_args(vec!["lat-breakdown", "logs", "tatp"]).unwrap();
        let mut breakdown = Breakdown::new("tatp", config.algorithms(), config.versions());
        assert_eq!(config.y_max(&breakdown), DEFAULT_YLIM);

        breakdown.record(Sample::new(Metric::Commit, "occ", "rpc", 50.0));
        // not a plotted series
        breakdown.record(Sample::new(Metric::TwoPc, "occ", "rpc", 500.0));
        assert!((config.y_max(&breakdown) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn sweep_defaults() {
        let config = SweepConfig::from_args(vec!["tput-lat", "figures"]).unwrap();
        assert_eq!(config.output(), Path::new("figures"));
        assert_eq!(config.apps().len(), 3);
        assert_eq!(config.coroutines().len(), 10);
        assert_eq!(config.versions(), &["rpc", "onesided"]);
        assert_eq!(config.throughput_marker(), "System throughput");
        assert_eq!(config.latency_marker(), "bench_listener2.cc:279");
        let bank = &config.apps()[0];
        assert_eq!(
            config.data_dir(bank),
            PathBuf::from("./finaldata/increasing_cor_num_bank")
        );
        assert_eq!(
            config.output_file(bank),
            PathBuf::from("figures/latency-tputbank.svg")
        );
    }

    #[test]
    fn sweep_select_apps() {
        let config = SweepConfig::from_args(vec![
            "tput-lat",
            "figures",
            "--app",
            "tpcc",
            "--app",
            "ycsb",
            "--data-root",
            "/data",
        ])
        .unwrap();
        let names: Vec<_> = config.apps().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["tpcc", "ycsb"]);
        assert_eq!(
            config.data_dir(&config.apps()[1]),
            PathBuf::from("/data/finaldata/increasing_cor_num/routine_28_with_calvin")
        );
    }

    #[test]
    fn sweep_unknown_app() {
        assert!(matches!(
            SweepConfig::from_args(vec!["tput-lat", "figures", "--app", "tatp"]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn config_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ccplot.toml");
        std::fs::write(
            &path,
            "[general]\ncores = 2\nlogging = \"warn\"\n\n[sweep]\ncoroutines = [1]\n",
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let config =
            SweepConfig::from_args(vec!["tput-lat", "figures", "--config", path, "-v"]).unwrap();
        assert_eq!(config.layout().cores(), 2);
        assert_eq!(config.coroutines(), &[1]);
        assert_eq!(config.logging(), LevelFilter::Info);

        let config = BreakdownConfig::from_args(vec![
            "lat-breakdown",
            "logs",
            "bank",
            "--config",
            path,
            "--cores",
            "6",
        ])
        .unwrap();
        assert_eq!(config.layout().cores(), 6);
        assert_eq!(config.logging(), LevelFilter::Warn);
    }

    #[test]
    fn verbosity_steps() {
        assert_eq!(verbosity(LevelFilter::Info, 0), LevelFilter::Info);
        assert_eq!(verbosity(LevelFilter::Info, 1), LevelFilter::Debug);
        assert_eq!(verbosity(LevelFilter::Off, 2), LevelFilter::Warn);
        assert_eq!(verbosity(LevelFilter::Trace, 3), LevelFilter::Trace);
    }
}
