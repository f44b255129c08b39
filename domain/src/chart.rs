use crate::models::SearchResponse;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisStyle {
    pub title: String,
    pub begin_at_zero: bool,
}

/// Fixed look of the similarity chart. Serialised (camelCase) into the search
/// page so the browser draws exactly what the terminal draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStyle {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub dataset_label: String,
    pub background_color: String,
    pub border_color: String,
    pub border_width: u32,
    pub x_axis: AxisStyle,
    pub y_axis: AxisStyle,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            chart_type: "bar".to_string(),
            dataset_label: "Cosine Similarities".to_string(),
            background_color: "rgba(75, 192, 192, 0.2)".to_string(),
            border_color: "rgba(75, 192, 192, 1)".to_string(),
            border_width: 1,
            x_axis: AxisStyle {
                title: "Document Index".to_string(),
                begin_at_zero: false,
            },
            y_axis: AxisStyle {
                title: "Similarity".to_string(),
                begin_at_zero: true,
            },
        }
    }
}

/// A bar per search hit: the category is the document index, the height its
/// similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub style: ChartStyle,
}

impl BarChart {
    pub fn from_response(response: &SearchResponse, style: ChartStyle) -> Self {
        Self {
            labels: response.indices().iter().map(|i| i.to_string()).collect(),
            values: response.similarities().to_vec(),
            style,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bounds of the value axis. With `begin_at_zero` the range always
    /// contains zero.
    pub fn value_range(&self) -> (f64, f64) {
        let values = self.values.iter().copied();
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.fold(f64::NEG_INFINITY, f64::max);
        if self.values.is_empty() {
            return (0.0, 0.0);
        }
        if self.style.y_axis.begin_at_zero {
            (min.min(0.0), max.max(0.0))
        } else {
            (min, max)
        }
    }
}
