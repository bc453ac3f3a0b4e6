//! The dashboard surface that renderers write into.
//!
//! `Page` abstracts over where slots actually live: `MemoryPage` keeps them
//! in memory, `TerminalPage` prints them.

use std::collections::BTreeMap;

use thiserror::Error;
use trendcast_weather::ChartKind;

pub const CITY_INPUT: &str = "city-input";
pub const CITY_NAME_SLOT: &str = "city-name";
pub const TEMPERATURE_SLOT: &str = "temperature";
pub const RAINFALL_SLOT: &str = "rainfall";
pub const HUMIDITY_SLOT: &str = "humidity";
pub const HEAT_WAVE_SLOT: &str = "heat-waves";
pub const COLD_WINTER_SLOT: &str = "cold-winter";

/// Text slots written by the weather display, in render order
pub const TEXT_SLOTS: [&str; 6] = [
    CITY_NAME_SLOT,
    TEMPERATURE_SLOT,
    RAINFALL_SLOT,
    HUMIDITY_SLOT,
    HEAT_WAVE_SLOT,
    COLD_WINTER_SLOT,
];

/// Errors raised by page mutations.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Element with id {0} not found")]
    MissingSlot(String),
}

pub type PageResult<T> = Result<T, PageError>;

/// How a background image is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundStyle {
    pub size: &'static str,
    pub position: &'static str,
    pub attachment: &'static str,
}

impl BackgroundStyle {
    pub const COVER_CENTER_FIXED: BackgroundStyle = BackgroundStyle {
        size: "cover",
        position: "center",
        attachment: "fixed",
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Background {
    pub url: String,
    pub style: BackgroundStyle,
}

impl Background {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            style: BackgroundStyle::COVER_CENTER_FIXED,
        }
    }
}

/// An image filling its container's width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    /// Base64 PNG bytes as received
    pub payload: String,
    pub width: &'static str,
    pub margin_top_px: u32,
}

impl ChartImage {
    pub fn full_width(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            width: "100%",
            margin_top_px: 20,
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartContent {
    Image(ChartImage),
    Fallback(String),
}

/// Rendering target for the dashboard.
pub trait Page {
    /// Current contents of the city input
    fn input_value(&self) -> String;

    fn has_slot(&self, id: &str) -> bool;

    /// Replace the text of slot `id`
    fn set_text(&mut self, id: &str, text: &str) -> PageResult<()>;

    /// Replace the contents of chart container `id`
    fn set_chart(&mut self, id: &str, content: ChartContent) -> PageResult<()>;

    fn set_background(&mut self, background: Background);

    /// Show a message the user must acknowledge
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    Empty,
    Text(String),
    Chart(ChartContent),
}

/// In-memory page that records every mutation.
#[derive(Debug, Default)]
pub struct MemoryPage {
    input: String,
    slots: BTreeMap<String, SlotContent>,
    backgrounds: Vec<Background>,
    alerts: Vec<String>,
    mutations: usize,
}

impl MemoryPage {
    /// A page with no slots at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// A page carrying every text slot and chart container
    pub fn dashboard() -> Self {
        let ids = TEXT_SLOTS
            .iter()
            .copied()
            .chain(ChartKind::ALL.iter().map(ChartKind::slot_id));
        Self::with_slots(ids)
    }

    pub fn with_slots<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            slots: ids
                .into_iter()
                .map(|id| (id.to_string(), SlotContent::Empty))
                .collect(),
            ..Self::default()
        }
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn slot(&self, id: &str) -> Option<&SlotContent> {
        self.slots.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        match self.slots.get(id) {
            Some(SlotContent::Text(t)) => Some(t),
            _ => None,
        }
    }

    pub fn chart(&self, id: &str) -> Option<&ChartContent> {
        match self.slots.get(id) {
            Some(SlotContent::Chart(c)) => Some(c),
            _ => None,
        }
    }

    pub fn background(&self) -> Option<&Background> {
        self.backgrounds.last()
    }

    /// Every background ever applied, oldest first
    pub fn background_history(&self) -> &[Background] {
        &self.backgrounds
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Number of slot and background writes so far
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    fn slot_mut(&mut self, id: &str) -> PageResult<&mut SlotContent> {
        self.slots
            .get_mut(id)
            .ok_or_else(|| PageError::MissingSlot(id.to_string()))
    }
}

impl Page for MemoryPage {
    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn has_slot(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: &str) -> PageResult<()> {
        *self.slot_mut(id)? = SlotContent::Text(text.to_string());
        self.mutations += 1;
        Ok(())
    }

    fn set_chart(&mut self, id: &str, content: ChartContent) -> PageResult<()> {
        *self.slot_mut(id)? = SlotContent::Chart(content);
        self.mutations += 1;
        Ok(())
    }

    fn set_background(&mut self, background: Background) {
        self.backgrounds.push(background);
        self.mutations += 1;
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_has_all_slots() {
        let page = MemoryPage::dashboard();
        for id in TEXT_SLOTS {
            assert!(page.has_slot(id), "missing {}", id);
        }
        assert!(page.has_slot("future-humidity-graph"));
        assert_eq!(page.slot(CITY_NAME_SLOT), Some(&SlotContent::Empty));
    }

    #[test]
    fn test_missing_slot_is_error() {
        let mut page = MemoryPage::empty();
        let err = page.set_text("temperature", "x").unwrap_err();
        assert_eq!(err.to_string(), "Element with id temperature not found");
        assert_eq!(page.mutation_count(), 0);
    }

    #[test]
    fn test_background_history() {
        let mut page = MemoryPage::empty();
        page.set_background(Background::new("a.jpg"));
        page.set_background(Background::new("b.jpg"));
        assert_eq!(page.background().map(|b| b.url.as_str()), Some("b.jpg"));
        assert_eq!(page.background_history().len(), 2);
        assert_eq!(
            page.background().map(|b| b.style),
            Some(BackgroundStyle::COVER_CENTER_FIXED)
        );
    }

    #[test]
    fn test_chart_image_data_uri() {
        let image = ChartImage::full_width("aGk=");
        assert_eq!(image.data_uri(), "data:image/png;base64,aGk=");
        assert_eq!(image.width, "100%");
        assert_eq!(image.margin_top_px, 20);
    }
}
