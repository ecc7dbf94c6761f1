// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! SVG rendering of latency breakdowns and throughput-latency sweeps.

use crate::{Breakdown, Error, Metric, Result, Sweep};

use plotters::prelude::*;

use std::fs;
use std::path::Path;

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

const COLOURS: &[RGBColor] = &[
    hexcolour!(0xAA0000),
    hexcolour!(0x0000FF),
    hexcolour!(0x888888),
    hexcolour!(0xDDCC77),
    hexcolour!(0x999933),
    hexcolour!(0x332288),
    hexcolour!(0x117733),
    hexcolour!(0x88CCEE),
    hexcolour!(0x882255),
    hexcolour!(0x44AA99),
    hexcolour!(0xAA4499),
    hexcolour!(0xCC6677),
];

const PANEL_WIDTH: u32 = 640;
const PANEL_HEIGHT: u32 = 480;

/// Share of a group's width taken up by its bars.
const GROUP_WIDTH: f64 = 0.8;

fn palette(index: usize) -> RGBColor {
    COLOURS[index % COLOURS.len()]
}

fn prepare(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| Error::Io {
                path: dir.to_owned(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Draws one panel per protocol version, each holding a group of bars per
/// algorithm with one bar per metric in `series`. Bars taller than `y_max`
/// are clipped and absent values leave a gap.
pub fn plot_breakdown(
    breakdown: &Breakdown,
    series: &[Metric],
    y_max: f64,
    path: &Path,
) -> Result<()> {
    prepare(path)?;

    let versions = breakdown.versions();
    let algorithms = breakdown.algorithms().to_vec();
    let panels = versions.len().max(1);
    let groups = algorithms.len().max(1) as f64;
    let bar_width = GROUP_WIDTH / series.len().max(1) as f64;

    let root =
        SVGBackend::new(path, (PANEL_WIDTH * panels as u32, PANEL_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Latency breakdown: {}", breakdown.app()),
        ("sans-serif", 24),
    )?;
    let areas = root.split_evenly((1, panels));

    for (panel, (area, version)) in areas.iter().zip(versions.iter()).enumerate() {
        let names = algorithms.clone();
        let mut chart = ChartBuilder::on(area)
            .caption(version, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..groups - 0.5, 0.0..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(algorithms.len().max(1))
            .x_label_formatter(&move |x: &f64| {
                let index = x.round();
                if (x - index).abs() > 1e-6 || index < 0.0 {
                    return String::new();
                }
                names.get(index as usize).cloned().unwrap_or_default()
            })
            .y_desc("Latency (µs)")
            .draw()?;

        for (i, &metric) in series.iter().enumerate() {
            let colour = palette(i);
            let offset = -GROUP_WIDTH / 2.0 + i as f64 * bar_width;
            let bars = breakdown
                .series(version, metric)
                .into_iter()
                .enumerate()
                .filter_map(|(group, value)| value.map(|v| (group as f64, v.min(y_max))))
                .map(move |(x, v)| {
                    let left = x + offset;
                    Rectangle::new([(left, 0.0), (left + bar_width, v)], colour.filled())
                });

            let drawn = chart.draw_series(bars)?;
            if panel + 1 == panels {
                drawn
                    .label(metric.label())
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], colour.filled())
                    });
            }
        }

        if panel + 1 == panels && !series.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }
    }

    root.present()?;
    Ok(())
}

/// Draws one panel per algorithm with a throughput-latency curve per protocol
/// version.
pub fn plot_sweep(sweep: &Sweep, path: &Path) -> Result<()> {
    prepare(path)?;

    let algorithms = sweep.algorithms();
    let panels = algorithms.len().max(1);

    let root =
        SVGBackend::new(path, (PANEL_WIDTH * panels as u32, PANEL_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Throughput-Latency {}", sweep.app()),
        ("sans-serif", 24),
    )?;
    let areas = root.split_evenly((1, panels));

    for (area, algorithm) in areas.iter().zip(algorithms.iter()) {
        let (x_max, y_max) = sweep.bounds(algorithm);
        let x_max = if x_max > 0.0 { x_max * 1.1 } else { 1.0 };
        let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

        let mut chart = ChartBuilder::on(area)
            .caption(algorithm, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Throughput (M txn/s)")
            .y_desc("Latency (ms)")
            .draw()?;

        let mut labelled = false;
        for (i, version) in sweep.versions().iter().enumerate() {
            let curve = match sweep.curve(algorithm, version) {
                Some(curve) if !curve.points().is_empty() => curve,
                _ => continue,
            };
            let colour = palette(i);
            let points: Vec<(f64, f64)> = curve
                .points()
                .iter()
                .map(|p| (p.throughput(), p.latency()))
                .collect();

            chart
                .draw_series(LineSeries::new(points.clone(), colour.stroke_width(2)))?
                .label(version.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &colour));
            chart.draw_series(
                points
                    .into_iter()
                    .map(move |point| Circle::new(point, 3, colour.filled())),
            )?;
            labelled = true;
        }

        if labelled {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Curve, Point, Sample};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn breakdown_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("lat_breakdown-bank.svg");

        let mut breakdown = Breakdown::new(
            "bank",
            &names(&["occ", "mvcc"]),
            &names(&["rpc", "onesided"]),
        );
        breakdown.record(Sample::new(Metric::Read, "occ", "rpc", 3.2));
        breakdown.record(Sample::new(Metric::Lock, "occ", "rpc", 1.1));
        breakdown.record(Sample::new(Metric::Commit, "mvcc", "onesided", 40.0));

        plot_breakdown(
            &breakdown,
            &[Metric::Read, Metric::Lock, Metric::Commit],
            12.0,
            &path,
        )
        .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Latency breakdown: bank"));
        assert!(svg.contains("Read"));
    }

    #[test]
    fn empty_breakdown_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lat_breakdown-tatp.svg");
        let breakdown = Breakdown::new("tatp", &names(&["occ"]), &names(&["rpc"]));

        plot_breakdown(&breakdown, &Metric::ALL, 10.0, &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("<svg"));
    }

    #[test]
    fn sweep_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latency-tputbank.svg");

        let mut sweep = Sweep::new(
            "bank",
            &names(&["occ", "nowait"]),
            &names(&["rpc", "onesided"]),
        );
        let mut curve = Curve::new("occ", "rpc");
        curve.push(Point::new(0.4, 0.1));
        curve.push(Point::new(0.9, 0.3));
        sweep.push(curve);
        sweep.push(Curve::new("occ", "onesided"));

        plot_sweep(&sweep, &path).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Throughput-Latency bank"));
        assert!(svg.contains("nowait"));
    }
}
