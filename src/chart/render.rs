//! Figure construction

use std::cmp::Ordering;

use super::figure::{Axis, Figure, Layout, Legend, Title, Trace};
use crate::history::PlayerRegistry;
use crate::resample::BucketedSeries;

/// Format a bucket width in seconds without trailing zeros (`5`, `0.5`)
pub fn format_width(bucket_secs: f64) -> String {
    let text = format!("{:.3}", bucket_secs);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Placeholder shown before any sample has arrived
pub fn waiting_placeholder() -> Figure {
    Figure::empty("Waiting for data...")
}

/// Placeholder shown when there is history but nobody is selected
pub fn select_players_placeholder(bucket_secs: f64) -> Figure {
    Figure {
        data: Vec::new(),
        layout: Layout {
            title: Title::new("Select players to display"),
            xaxis: Some(Axis::titled("Time")),
            yaxis: Some(Axis::titled(format!("Damage per {}s", format_width(bucket_secs)))),
            ..Layout::default()
        },
    }
}

/// Render a stacked chart, smallest total first so the largest sits on top
pub fn render_chart(series: &BucketedSeries, registry: &PlayerRegistry, bucket_secs: f64) -> Figure {
    let width = format_width(bucket_secs);
    let labels = series.labels();

    let mut ordered: Vec<_> = series.series.iter().collect();
    ordered.sort_by(|a, b| {
        a.total
            .partial_cmp(&b.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    let data = ordered
        .into_iter()
        .map(|s| {
            Trace::stacked(
                registry.display_name(&s.player_id),
                labels.clone(),
                s.increments.clone(),
            )
        })
        .collect();

    Figure {
        data,
        layout: Layout {
            title: Title::new(format!("Incremental damage per {}s", width)),
            xaxis: Some(Axis::titled(format!("Time ({})", series.time_zone))),
            yaxis: Some(Axis::titled(format!("Damage per {}s", width))),
            legend: Some(Legend {
                title: Title::new("Players"),
            }),
            hovermode: Some("x unified".to_string()),
        },
    }
}
