//! Renders forecast charts into their containers.

use crate::page::{ChartContent, ChartImage, Page};

pub const CHART_FALLBACK_TEXT: &str = "No data available for this graph.";

/// What happened to a chart container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartOutcome {
    Rendered,
    Fallback,
    /// The container does not exist; nothing was written
    MissingSlot,
}

/// Put `payload` into chart container `slot_id` as a full-width image, or the
/// fallback text when the payload is absent or empty.
pub fn display_graph<P: Page>(page: &mut P, slot_id: &str, payload: Option<&str>) -> ChartOutcome {
    if !page.has_slot(slot_id) {
        tracing::error!("Element with id {} not found.", slot_id);
        return ChartOutcome::MissingSlot;
    }

    let (content, outcome) = match payload.filter(|p| !p.is_empty()) {
        Some(data) => (
            ChartContent::Image(ChartImage::full_width(data)),
            ChartOutcome::Rendered,
        ),
        None => {
            tracing::error!("No graph data found for {}", slot_id);
            (
                ChartContent::Fallback(CHART_FALLBACK_TEXT.to_string()),
                ChartOutcome::Fallback,
            )
        }
    };

    match page.set_chart(slot_id, content) {
        Ok(()) => outcome,
        Err(e) => {
            tracing::error!("{}", e);
            ChartOutcome::MissingSlot
        }
    }
}
