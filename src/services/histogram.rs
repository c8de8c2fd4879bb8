use plotters::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistogramError {
    #[error("failed to render histogram: {0}")]
    Render(String),
}

/// Equal-width bins over `[min, min + bin_width * counts.len())`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBins {
    pub min: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl HistogramBins {
    pub fn max(&self) -> f64 {
        self.min + self.bin_width * self.counts.len() as f64
    }
}

/// Bins `values` with the square-root rule. Identical values share a single
/// bin of width one.
pub fn histogram_bins(values: &[f64]) -> Option<HistogramBins> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range < f64::EPSILON {
        return Some(HistogramBins {
            min,
            bin_width: 1.0,
            counts: vec![values.len()],
        });
    }

    let bin_count = (values.len() as f64).sqrt().ceil().max(1.0) as usize;
    let bin_width = range / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for value in values {
        let idx = ((value - min) / bin_width).floor() as usize;
        counts[idx.min(bin_count - 1)] += 1;
    }

    Some(HistogramBins {
        min,
        bin_width,
        counts,
    })
}

pub fn write_histogram_png(
    output_path: &str,
    values: &[f64],
    caption: &str,
    x_desc: &str,
) -> Result<(), HistogramError> {
    let Some(bins) = histogram_bins(values) else {
        return Ok(());
    };
    let max_count = bins.counts.iter().copied().max().unwrap_or(1);

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| HistogramError::Render(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(caption, ("sans-serif", 30))
        .x_label_area_size(55)
        .y_label_area_size(65)
        .build_cartesian_2d(bins.min..bins.max(), 0..(max_count + 1))
        .map_err(|e| HistogramError::Render(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(x_desc)
        .y_desc("Frequency")
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 22))
        .x_label_formatter(&|value| format!("{value:.1}"))
        .draw()
        .map_err(|e| HistogramError::Render(e.to_string()))?;

    let bar_color = RGBColor(30, 122, 204);
    let bar_style = ShapeStyle::from(&bar_color).filled();
    chart
        .draw_series(bins.counts.iter().enumerate().map(|(idx, count)| {
            let start = bins.min + bins.bin_width * idx as f64;
            Rectangle::new([(start, 0), (start + bins.bin_width, *count)], bar_style)
        }))
        .map_err(|e| HistogramError::Render(e.to_string()))?;

    root.present()
        .map_err(|e| HistogramError::Render(e.to_string()))?;
    Ok(())
}
