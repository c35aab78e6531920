//! Multi-axis time-series plots of recorded CSV columns
//!
//! Selected columns are grouped by unit; every unit gets its own y-axis.
//! Groups alternate sides (even groups on the left, odd groups on the
//! right), and since a plotters chart carries at most two y-axes, each
//! left/right pair is drawn in its own panel, panels stacked top to bottom:
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │ kg/h ┤ F1, F3, F6          barg ├ P, P2   │  panel 0: groups 0 | 1
//! ├───────────────────────────────────────────┤
//! │    m ┤ LIC PV, LIC SP         % ├ LIC CV  │  panel 1: groups 2 | 3
//! └───────────────────────────────────────────┘
//!                  ModelTime [s]
//! ```
//!
//! Series colors cycle through the palette in drawing order; axis labels
//! take the color of their group index.

use std::error::Error;
use std::ops::Range;

use plotters::prelude::*;

use crate::analysis::{group_by_unit, CsvTable, UnitGroup};
use crate::output::visualization::config::{PlotConfig, NO_TITLE};

// =================================================================================================
// Layout helpers
// =================================================================================================

/// Unit groups drawn together in one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    /// Group on the left axis
    pub primary: usize,

    /// Group on the right axis
    pub secondary: Option<usize>,
}

/// Pair groups `(0, 1)`, `(2, 3)`, ... into panels
pub fn panel_layout(n_groups: usize) -> Vec<PanelLayout> {
    (0..n_groups)
        .step_by(2)
        .map(|primary| PanelLayout {
            primary,
            secondary: (primary + 1 < n_groups).then_some(primary + 1),
        })
        .collect()
}

/// Axis range covering every finite value with 5 % padding
///
/// Flat data gets a band around its value; no finite data gives `0..1`.
pub fn value_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !min.is_finite() {
        return 0.0..1.0;
    }

    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else if min != 0.0 {
        min.abs() * 0.05
    } else {
        1.0
    };

    (min - pad)..(max + pad)
}

// =================================================================================================
// Public API
// =================================================================================================

/// Plot selected columns of a recording against model time
///
/// # Arguments
///
/// * `table`       — Recording; column 0 is the time axis
/// * `selection`   — Data-column indices (0 = first column after time)
/// * `output_path` — Output file path (`.png` or `.svg`)
/// * `config`      — Optional plot configuration
///
/// # Errors
///
/// Returns `Err` if no selected index names a data column, the recording
/// has no rows, or the backend cannot write to `output_path`.
///
/// # Example
///
/// ```rust,ignore
/// use setpoint_sweep::analysis::{select_columns, CsvTable};
/// use setpoint_sweep::output::visualization::plot_columns;
///
/// let table = CsvTable::from_path("Yggdrasil_state3_07.07.2025_18-23.csv")?;
/// let selection = select_columns("0,5,20:26", table.ncols() - 1);
/// plot_columns(&table, &selection, "state3.png", None)?;
/// ```
pub fn plot_columns(
    table: &CsvTable,
    selection: &[usize],
    output_path: &str,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    let default_config = PlotConfig::recording(NO_TITLE);
    let config = config.unwrap_or(&default_config);

    let Some(time) = table.time() else {
        return Err("Recording has no time column".into());
    };
    if time.is_empty() {
        return Err("Recording has no rows".into());
    }

    // Data-column index -> table column index
    let data_headers = &table.headers()[1..];
    let groups = group_by_unit(data_headers, selection);
    if groups.is_empty() {
        return Err("No columns selected".into());
    }

    let time_label = if config.xlabel.is_empty() {
        table.headers()[0].clone()
    } else {
        config.xlabel.clone()
    };

    let series: Vec<Series> = groups
        .iter()
        .flat_map(|g| g.columns.iter())
        .map(|&c| Series::from_table(table, c + 1))
        .collect();

    let ext = std::path::Path::new(output_path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("png");

    let time = time.as_slice();
    match ext {
        "svg" => {
            let backend = SVGBackend::new(output_path, (config.width, config.height));
            plot_columns_impl(backend, time, &groups, &series, &time_label, config)
        }
        _ => {
            let backend = BitMapBackend::new(output_path, (config.width, config.height));
            plot_columns_impl(backend, time, &groups, &series, &time_label, config)
        }
    }
}

// =================================================================================================
// Private Plot Implementation
// =================================================================================================

/// One column ready to draw
struct Series {
    label: String,
    values: Vec<f64>,
}

impl Series {
    fn from_table(table: &CsvTable, column: usize) -> Self {
        Self {
            label: table.headers()[column].clone(),
            values: table.data().column(column).iter().copied().collect(),
        }
    }
}

fn points<'a>(time: &'a [f64], values: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    time.iter()
        .zip(values.iter())
        .filter(|(_, v)| v.is_finite())
        .map(|(t, v)| (*t, *v))
}

/// Render stacked dual-axis panels with the given drawing backend
///
/// `series` holds every column of `groups` flattened in group order.
fn plot_columns_impl<DB: DrawingBackend>(
    backend: DB,
    time: &[f64],
    groups: &[UnitGroup],
    series: &[Series],
    time_label: &str,
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&config.background)?;
    let root = root.titled(&config.title, ("sans-serif", 30))?;

    let (t_first, t_last) = (time[0], time[time.len() - 1]);
    let time_range = if t_last > t_first {
        t_first..t_last
    } else {
        t_first..t_first + 1.0
    };

    // Offsets of each group's first series inside `series`
    let mut offsets = Vec::with_capacity(groups.len());
    let mut offset = 0;
    for group in groups {
        offsets.push(offset);
        offset += group.columns.len();
    }
    let group_series = |g: usize| &series[offsets[g]..offsets[g] + groups[g].columns.len()];
    let group_range = |g: usize| value_range(group_series(g).iter().flat_map(|s| s.values.iter().copied()));

    let layout = panel_layout(groups.len());
    let panels = root.split_evenly((layout.len(), 1));

    for (panel, area) in layout.iter().zip(panels.iter()) {
        let left_range = group_range(panel.primary);
        let right_range = panel.secondary.map(&group_range).unwrap_or_else(|| left_range.clone());

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .right_y_label_area_size(if panel.secondary.is_some() { 70 } else { 0 })
            .build_cartesian_2d(time_range.clone(), left_range)?
            .set_secondary_coord(time_range.clone(), right_range);

        let left_color = config.get_series_color(panel.primary);
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(time_label)
            .y_desc(groups[panel.primary].unit.as_str())
            .axis_desc_style(("sans-serif", 16).into_font().color(&left_color));
        if !config.show_grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;

        if let Some(secondary) = panel.secondary {
            let right_color = config.get_series_color(secondary);
            chart
                .configure_secondary_axes()
                .y_desc(groups[secondary].unit.as_str())
                .axis_desc_style(("sans-serif", 16).into_font().color(&right_color))
                .draw()?;
        }

        for (i, s) in group_series(panel.primary).iter().enumerate() {
            let color = config.get_series_color(offsets[panel.primary] + i);
            chart
                .draw_series(LineSeries::new(
                    points(time, &s.values),
                    ShapeStyle::from(&color).stroke_width(config.line_width),
                ))?
                .label(s.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }

        if let Some(secondary) = panel.secondary {
            for (i, s) in group_series(secondary).iter().enumerate() {
                let color = config.get_series_color(offsets[secondary] + i);
                chart
                    .draw_secondary_series(LineSeries::new(
                        points(time, &s.values),
                        ShapeStyle::from(&color).stroke_width(config.line_width),
                    ))?
                    .label(s.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&config.background.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
