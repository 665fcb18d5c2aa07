//! Plotly figure schema (the subset the dashboard uses)

use serde::Serialize;

/// A complete chart: traces plus layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// A figure with no traces and only a title
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout {
                title: Title::new(title),
                ..Layout::default()
            },
        }
    }
}

/// One stacked line series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub stackgroup: String,
    pub line: Line,
}

impl Trace {
    /// A `scatter` trace in the shared stack group
    pub fn stacked(name: impl Into<String>, x: Vec<String>, y: Vec<f64>) -> Self {
        Self {
            kind: "scatter".to_string(),
            mode: "lines".to_string(),
            name: name.into(),
            x,
            y,
            stackgroup: "one".to_string(),
            line: Line { width: 0.5 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub width: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

impl Axis {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Title::new(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Legend {
    pub title: Title,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_serializes_plotly_fields() {
        let trace = Trace::stacked("Veteran", vec!["t0".to_string()], vec![5.0]);
        let json = serde_json::to_value(&trace).unwrap();

        assert_eq!(json["type"], "scatter");
        assert_eq!(json["mode"], "lines");
        assert_eq!(json["stackgroup"], "one");
        assert_eq!(json["line"]["width"], 0.5);
        assert_eq!(json["y"][0], 5.0);
    }

    #[test]
    fn test_empty_figure_omits_axes() {
        let json = serde_json::to_string(&Figure::empty("Waiting")).unwrap();

        assert!(json.contains("\"title\":{\"text\":\"Waiting\"}"));
        assert!(!json.contains("xaxis"));
        assert!(json.contains("\"data\":[]"));
    }
}
