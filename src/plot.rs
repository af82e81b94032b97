//! SVG charts of a [`Report`]'s distributions.

use std::{
    fs,
    path::{Path, PathBuf},
};

use plotters::prelude::*;
use tracing::info;

use crate::{
    analysis::{Distribution, Report},
    error::{Error, Result},
    histogram::Histogram,
};

const SIZE: (u32, u32) = (1000, 600);

/// Bars are drawn down to this baseline so a bin with a single vertex stays visible on the log
/// scale.
const LOG_BASELINE: f64 = 0.5;

type PlotResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Renders the degree distribution and every histogram in `report` into `dir`, one SVG each.
/// Returns the paths written.
pub fn render(report: &Report, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();

    if !report.degree_distribution.is_empty() {
        let path = dir.join("degree_distribution.svg");
        draw_degree_distribution(&path, report).map_err(|e| plot_error(&path, e))?;
        written.push(path);
    }

    for distribution in &report.distributions {
        if distribution.histogram.is_empty() {
            continue;
        }

        let path = dir.join(format!("{}.svg", distribution.name));
        draw_histogram(&path, distribution).map_err(|e| plot_error(&path, e))?;
        written.push(path);
    }

    info!("wrote {} plots to {}", written.len(), dir.display());

    Ok(written)
}

fn plot_error(path: &Path, e: Box<dyn std::error::Error>) -> Error {
    Error::Plot(format!("{}: {e}", path.display()))
}

fn draw_degree_distribution(path: &Path, report: &Report) -> PlotResult {
    let max_degree = report
        .degree_distribution
        .keys()
        .next_back()
        .copied()
        .unwrap_or(0);
    let max_share = report
        .degree_distribution
        .values()
        .copied()
        .fold(0.0, f64::max);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Degree distribution", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..max_degree as f64 + 0.5, 0.0..max_share * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Degree")
        .y_desc("Share of vertices")
        .draw()?;

    chart.draw_series(report.degree_distribution.iter().map(|(&degree, &share)| {
        let x = degree as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, share)], BLUE.mix(0.6).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_histogram(path: &Path, distribution: &Distribution) -> PlotResult {
    let Histogram { bins } = &distribution.histogram;
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Ok(());
    };
    let y_max = (distribution.histogram.max_count() as f64 * 2.0).max(LOG_BASELINE * 4.0);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&distribution.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first.start..last.end, (LOG_BASELINE..y_max).log_scale())?;

    chart
        .configure_mesh()
        .x_desc(distribution.label.as_str())
        .y_desc("Vertices")
        .draw()?;

    chart.draw_series(
        bins.iter()
            .filter(|bin| bin.count > 0)
            .map(|bin| {
                Rectangle::new(
                    [(bin.start, LOG_BASELINE), (bin.end, bin.count as f64)],
                    RED.mix(0.55).filled(),
                )
            }),
    )?;

    root.present()?;
    Ok(())
}
