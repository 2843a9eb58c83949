//! SVG line charts of a pair's spread and of its full-history z-scores.

pub mod error;

pub use error::ChartError;

use analytics::PairReport;
use chrono::NaiveDate;
use configuration::ChartConfig;
use core_types::instrument_label;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Files written by `ChartRenderer::render_pair`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairCharts {
    pub spread: PathBuf,
    pub z_score: PathBuf,
}

/// A horizontal reference line.
struct Level {
    value: f64,
    color: RGBColor,
}

pub struct ChartRenderer {
    output_dir: PathBuf,
    width: u32,
    height: u32,
}

impl ChartRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            width: config.width,
            height: config.height,
        }
    }

    /// Draws `<A>_<B>_spread.svg` and `<A>_<B>_zscore.svg`.
    ///
    /// `dates` labels the x axis and must line up with the report's spread.
    pub fn render_pair(
        &self,
        report: &PairReport,
        dates: &[NaiveDate],
        threshold: f64,
    ) -> Result<PairCharts, ChartError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ChartError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let a = instrument_label(&report.instrument_a);
        let b = instrument_label(&report.instrument_b);

        let spread = self.output_dir.join(format!("{}_{}_spread.svg", a, b));
        self.line_chart(
            &spread,
            &format!("Spread between {} and {}", b, a),
            &format!("Spread ({} - {})", b, a),
            dates,
            &report.spread,
            &[Level {
                value: report.spread_mean,
                color: BLACK,
            }],
        )?;

        let z_mean = analytics::stats::mean(&report.z_scores);
        let z_score = self.output_dir.join(format!("{}_{}_zscore.svg", a, b));
        self.line_chart(
            &z_score,
            &format!("Z-scores for Spread between {} and {}", b, a),
            "Z Scores",
            dates,
            &report.z_scores,
            &[
                Level {
                    value: z_mean,
                    color: BLACK,
                },
                Level {
                    value: threshold,
                    color: RED,
                },
                Level {
                    value: -threshold,
                    color: GREEN,
                },
            ],
        )?;

        tracing::info!(spread = %spread.display(), z_score = %z_score.display(), "Charts written");
        Ok(PairCharts { spread, z_score })
    }

    fn line_chart(
        &self,
        path: &Path,
        title: &str,
        label: &str,
        dates: &[NaiveDate],
        values: &[f64],
        levels: &[Level],
    ) -> Result<(), ChartError> {
        if values.is_empty() {
            return Err(ChartError::EmptySeries(title.to_string()));
        }
        if dates.len() != values.len() {
            return Err(ChartError::LengthMismatch(dates.len(), values.len()));
        }
        let draw_err = |e: &dyn std::fmt::Display| ChartError::Drawing {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let (lo, hi) = y_range(values.iter().chain(levels.iter().map(|l| &l.value)));
        let last = values.len() - 1;

        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| draw_err(&e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0..last.max(1), lo..hi)
            .map_err(|e| draw_err(&e))?;

        let date_label = |i: &usize| dates.get(*i).map(|d| d.to_string()).unwrap_or_default();
        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&date_label)
            .draw()
            .map_err(|e| draw_err(&e))?;

        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, v)| (i, *v)),
                &BLUE,
            ))
            .map_err(|e| draw_err(&e))?
            .label(label)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        for level in levels {
            chart
                .draw_series(LineSeries::new(
                    vec![(0, level.value), (last, level.value)],
                    &level.color,
                ))
                .map_err(|e| draw_err(&e))?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| draw_err(&e))?;

        root.present().map_err(|e| draw_err(&e))?;
        Ok(())
    }
}

/// Padded bounds covering every value; non-finite values are ignored.
fn y_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if !lo.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}
