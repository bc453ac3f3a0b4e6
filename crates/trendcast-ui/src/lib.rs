//! Dashboard for the weather trends backend.
//!
//! A search runs through [`Orchestrator`]: the city's snapshot is rendered by
//! [`display_weather_data`], its five trend charts by [`display_graph`], and
//! the background moves on through [`ImageRotator`].

pub mod chart;
pub mod error_mapping;
pub mod input;
pub mod orchestrator;
pub mod page;
pub mod rotator;
pub mod store;
pub mod terminal;
pub mod weather_display;

pub use chart::{display_graph, ChartOutcome, CHART_FALLBACK_TEXT};
pub use error_mapping::ClientErrorExt;
pub use input::next_city;
pub use orchestrator::{Failure, Orchestrator, RunReport, RunState, Stage};
pub use page::{Background, ChartContent, ChartImage, MemoryPage, Page, PageError, SlotContent};
pub use rotator::{HttpPreloader, ImageRotator, Preloader, SkipPreload};
pub use store::RotationStore;
pub use terminal::TerminalPage;
pub use weather_display::display_weather_data;
