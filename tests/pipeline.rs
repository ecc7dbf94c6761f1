// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ccplot::{plot, Breakdown, BreakdownConfig, Metric, Sweep, SweepConfig};

use std::fs;
use std::path::Path;
use std::process::Command;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn breakdown_logs(dir: &Path) {
    write(
        &dir.join("drtmh-noccnowait-bank-4-rpc.log_0"),
        "[nowait.cc:10] read_lat time: 0.0021ms\n\
         [nowait.cc:11] lock time: 0.0009ms\n\
         [nowait.cc:12] log time: 0.0031ms\n\
         [nowait.cc:13] release_write time: 0.0004ms\n\
         [nowait.cc:14] commit time: 0.0025ms\n",
    );
    write(
        &dir.join("drtmh-noccsundial-bank-4-onesided.log_0"),
        "[sundial.cc:10] read_lat time: 0.0018ms\n\
         [sundial.cc:11] renew_lease time: 0.0007ms\n",
    );
}

#[test]
fn breakdown_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    breakdown_logs(dir.path());
    let out = dir.path().join("figures");

    let config = BreakdownConfig::from_args(vec![
        "lat-breakdown",
        dir.path().to_str().unwrap(),
        "bank",
        "--output",
        out.to_str().unwrap(),
    ])
    .unwrap();

    let breakdown = Breakdown::collect(&config);
    assert_eq!(breakdown.samples().len(), 7);
    let read = breakdown.series("rpc", Metric::Read);
    assert_eq!(read.len(), 5);
    assert!(read[0].is_some());
    assert!(read[1..].iter().all(Option::is_none));
    let read = breakdown.value("rpc", "nowait", Metric::Read).unwrap();
    assert!((read - 2.1).abs() < 1e-9);
    assert!(breakdown.value("onesided", "sundial", Metric::Renew).is_some());
    assert_eq!(breakdown.value("rpc", "occ", Metric::Read), None);
    assert_eq!(config.y_max(&breakdown), 12.0);

    plot::plot_breakdown(
        &breakdown,
        config.series(),
        config.y_max(&breakdown),
        &config.output_file(),
    )
    .unwrap();
    let svg = fs::read_to_string(out.join("lat_breakdown-bank.svg")).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn sweep_pipeline() {
    let root = tempfile::tempdir().unwrap();
    let name = "drtmh-noccocc-ycsb-4-rpc.log_0";
    for (cor, tput, lat) in &[(1, "350 K", "0.08"), (3, "0.8 M", "0.15"), (5, "1.1 M", "0.31")] {
        write(
            &root.path().join(format!("runs/ycsb/cor{}/{}", cor, name)),
            &format!(
                "[bench_listener2.cc:250] System throughput {}\n\
                 [bench_listener2.cc:279] average latency: {}ms.\n",
                tput, lat
            ),
        );
    }
    let config_file = root.path().join("ccplot.toml");
    write(
        &config_file,
        "[sweep]\n\
         algorithms = [\"occ\", \"mvcc\"]\n\
         coroutines = [1, 3, 5, 7]\n\n\
         [[sweep.app]]\n\
         name = \"ycsb\"\n\
         data = \"runs/ycsb\"\n",
    );
    let out = root.path().join("figures");

    let config = SweepConfig::from_args(vec![
        "tput-lat",
        out.to_str().unwrap(),
        "--data-root",
        root.path().to_str().unwrap(),
        "--config",
        config_file.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(config.apps().len(), 1);

    let sweep = Sweep::collect(&config, &config.apps()[0]);
    assert_eq!(sweep.curves().len(), 4);
    let points = sweep.curve("occ", "rpc").unwrap().points();
    assert_eq!(points.len(), 3);
    assert!((points[0].throughput() - 0.35).abs() < 1e-9);
    assert!((points[2].latency() - 0.31).abs() < 1e-9);
    assert!(sweep.curve("occ", "onesided").unwrap().points().is_empty());
    assert!(sweep.curve("mvcc", "rpc").unwrap().points().is_empty());

    plot::plot_sweep(&sweep, &config.output_file(&config.apps()[0])).unwrap();
    let svg = fs::read_to_string(out.join("latency-tputycsb.svg")).unwrap();
    assert!(svg.contains("Throughput-Latency ycsb"));
}

#[test]
fn lat_breakdown_binary() {
    let dir = tempfile::tempdir().unwrap();
    breakdown_logs(dir.path());
    let out = dir.path().join("out");

    let status = Command::new(env!("CARGO_BIN_EXE_lat-breakdown"))
        .arg(dir.path())
        .arg("bank")
        .arg("--output")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out.join("lat_breakdown-bank.svg").exists());
}

#[test]
fn lat_breakdown_binary_usage() {
    let status = Command::new(env!("CARGO_BIN_EXE_lat-breakdown")).status().unwrap();
    assert!(!status.success());
}

#[test]
fn tput_lat_binary_unknown_app() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_tput-lat"))
        .arg(dir.path())
        .arg("--app")
        .arg("tatp")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("tatp"));
}

#[test]
fn tput_lat_binary() {
    let root = tempfile::tempdir().unwrap();
    for (cor, tput) in &[(1, "420 K"), (3, "0.95 M")] {
        write(
            &root
                .path()
                .join(format!("runs/bank/cor{}/drtmh-noccocc-bank-4-rpc.log_0", cor)),
            &format!(
                "[bench_listener2.cc:250] System throughput {}\n\
                 [bench_listener2.cc:279] average latency: 0.2ms.\n",
                tput
            ),
        );
    }
    let config_file = root.path().join("ccplot.toml");
    write(
        &config_file,
        "[sweep]\n\
         algorithms = [\"occ\"]\n\
         coroutines = [1, 3, 5]\n\n\
         [[sweep.app]]\n\
         name = \"bank\"\n\
         data = \"runs/bank\"\n",
    );
    let out = root.path().join("figures");

    let status = Command::new(env!("CARGO_BIN_EXE_tput-lat"))
        .arg(&out)
        .arg("--data-root")
        .arg(root.path())
        .arg("--config")
        .arg(&config_file)
        .status()
        .unwrap();
    assert!(status.success());
    let svg = fs::read_to_string(out.join("latency-tputbank.svg")).unwrap();
    assert!(svg.contains("Throughput-Latency bank"));
}
