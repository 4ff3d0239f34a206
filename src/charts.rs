//! Plotly figure descriptions built from report distributions.
//!
//! The browser renders these with `Plotly.newPlot(el, figure.data, figure.layout)`.

use crate::reports::{CategoryField, Distribution};
use serde::Serialize;

/// Plotly's sequential Plasma palette.
const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie {
        labels: Vec<String>,
        values: Vec<usize>,
    },
    Choropleth {
        locations: Vec<String>,
        locationmode: String,
        z: Vec<usize>,
        text: Vec<String>,
        hoverinfo: String,
        colorscale: Vec<(f64, String)>,
        colorbar: ColorBar,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub title: Title,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
}

impl Figure {
    pub fn title(&self) -> &str {
        &self.layout.title.text
    }
}

/// Pie chart title for a categorical field.
pub fn category_title(field: CategoryField) -> String {
    format!("{}-wise Lead Distribution", field.display_name())
}

pub fn pie(title: impl Into<String>, distribution: &Distribution) -> Figure {
    Figure {
        data: vec![Trace::Pie {
            labels: distribution.counts.iter().map(|c| c.label.clone()).collect(),
            values: distribution.counts.iter().map(|c| c.count).collect(),
        }],
        layout: Layout {
            title: Title { text: title.into() },
        },
    }
}

pub fn category_pie(field: CategoryField, distribution: &Distribution) -> Figure {
    pie(category_title(field), distribution)
}

pub fn month_pie(distribution: &Distribution) -> Figure {
    pie("Create Date-wise Lead Distribution", distribution)
}

pub fn age_pie(distribution: &Distribution) -> Figure {
    pie("Age-wise Lead Distribution", distribution)
}

/// Country-name choropleth coloured by lead count.
pub fn choropleth(distribution: &Distribution) -> Figure {
    let steps = (PLASMA.len() - 1) as f64;
    let colorscale = PLASMA
        .iter()
        .enumerate()
        .map(|(i, color)| (i as f64 / steps, color.to_string()))
        .collect();

    Figure {
        data: vec![Trace::Choropleth {
            locations: distribution.counts.iter().map(|c| c.label.clone()).collect(),
            locationmode: "country names".to_string(),
            z: distribution.counts.iter().map(|c| c.count).collect(),
            text: distribution.counts.iter().map(|c| c.label.clone()).collect(),
            hoverinfo: "text+z".to_string(),
            colorscale,
            colorbar: ColorBar {
                title: Title {
                    text: "Lead Count".to_string(),
                },
            },
        }],
        layout: Layout {
            title: Title {
                text: "Country-wise Lead Distribution Map".to_string(),
            },
        },
    }
}
