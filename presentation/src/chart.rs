use colored::Colorize;
use domain::chart::{BarChart, ChartStyle};
use domain::models::SearchResponse;

const DEFAULT_HEIGHT: usize = 8;
const AXIS_LABEL_WIDTH: usize = 7;
const MIN_BAR_WIDTH: usize = 5;

/// Terminal canvas holding at most one bar chart. Drawing discards the
/// previous chart first, so repeated searches replace rather than stack.
#[derive(Debug, Clone)]
pub struct ChartCanvas {
    style: ChartStyle,
    height: usize,
    current: Option<BarChart>,
    charts_created: u64,
}

impl Default for ChartCanvas {
    fn default() -> Self {
        Self::new(ChartStyle::default())
    }
}

impl ChartCanvas {
    pub fn new(style: ChartStyle) -> Self {
        Self {
            style,
            height: DEFAULT_HEIGHT,
            current: None,
            charts_created: 0,
        }
    }

    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height.max(1);
        self
    }

    pub fn draw(&mut self, response: &SearchResponse) -> &BarChart {
        self.destroy();
        self.charts_created += 1;
        let chart = BarChart::from_response(response, self.style.clone());
        self.current.insert(chart)
    }

    pub fn destroy(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("previous chart destroyed");
        }
    }

    pub fn current(&self) -> Option<&BarChart> {
        self.current.as_ref()
    }

    pub fn charts_created(&self) -> u64 {
        self.charts_created
    }

    /// Vertical bars, one column per document index. Empty when nothing has
    /// been drawn.
    pub fn render(&self, styled: bool) -> String {
        let Some(chart) = &self.current else {
            return String::new();
        };
        let style = &chart.style;
        let mut out = String::new();
        out.push_str(&heading(&style.dataset_label, styled));
        out.push('\n');

        if chart.is_empty() {
            out.push_str("(no data)\n");
            return out;
        }

        let bar_width = chart
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(MIN_BAR_WIDTH);
        let (lo, hi) = chart.value_range();
        let anchor = 0.0_f64.clamp(lo, hi);
        let below = bar_cells(anchor, lo, lo, hi, self.height);
        let bars: Vec<(bool, usize)> = chart
            .values
            .iter()
            .map(|&v| (v >= anchor, bar_cells(v, anchor, lo, hi, self.height)))
            .collect();
        let plot_width = bars.len() * (bar_width + 1);

        let title = &style.y_axis.title;
        out.push_str(&format!("{title:>w$}\n", w = AXIS_LABEL_WIDTH));
        for row in (0..self.height).rev() {
            if row + 1 == below {
                out.push_str(&baseline(anchor, plot_width, true));
            }
            let axis_label = if row + 1 == self.height {
                format!("{hi:>w$.3}", w = AXIS_LABEL_WIDTH)
            } else if row == 0 && below > 0 {
                format!("{lo:>w$.3}", w = AXIS_LABEL_WIDTH)
            } else {
                " ".repeat(AXIS_LABEL_WIDTH)
            };
            out.push_str(&axis_label);
            out.push_str(" │");
            for &(up, cells) in &bars {
                let filled = if up {
                    row >= below && row < below + cells
                } else {
                    row < below && row + cells >= below
                };
                out.push(' ');
                let cell = if filled {
                    "█".repeat(bar_width)
                } else {
                    " ".repeat(bar_width)
                };
                if styled && filled {
                    out.push_str(&cell.cyan().to_string());
                } else {
                    out.push_str(&cell);
                }
            }
            out.push('\n');
        }
        if below == 0 {
            out.push_str(&baseline(anchor, plot_width, false));
        }

        out.push_str(&" ".repeat(AXIS_LABEL_WIDTH + 2));
        for label in &chart.labels {
            out.push_str(&format!(" {label:^bar_width$}"));
        }
        out.push('\n');
        out.push_str(&format!(
            "{}{:^w$}\n",
            " ".repeat(AXIS_LABEL_WIDTH + 2),
            style.x_axis.title,
            w = plot_width
        ));
        out
    }
}

/// The zero line bars grow from. Rows continue beneath it when some values
/// are negative.
fn baseline(anchor: f64, plot_width: usize, rows_beneath: bool) -> String {
    let corner = if rows_beneath { '┼' } else { '└' };
    format!(
        "{anchor:>w$.3} {corner}{}\n",
        "─".repeat(plot_width),
        w = AXIS_LABEL_WIDTH
    )
}

fn heading(text: &str, styled: bool) -> String {
    if styled {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Rows covered between `from` and `value` on an axis spanning `lo..=hi`.
fn bar_cells(value: f64, from: f64, lo: f64, hi: f64, rows: usize) -> usize {
    if hi <= lo {
        return 0;
    }
    let fraction = ((value - from).abs() / (hi - lo)).clamp(0.0, 1.0);
    (fraction * rows as f64).round() as usize
}
