//! Page backed by the terminal: text goes to stdout, alerts to stderr and
//! charts to PNG files.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use trendcast_weather::{decode_chart, ChartKind};

use crate::page::{Background, ChartContent, Page, PageError, PageResult, TEXT_SLOTS};

pub struct TerminalPage<W: Write = std::io::Stdout, E: Write = std::io::Stderr> {
    input: String,
    slots: BTreeSet<&'static str>,
    chart_dir: PathBuf,
    out: W,
    err: E,
}

impl TerminalPage {
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        Self::with_writers(chart_dir, std::io::stdout(), std::io::stderr())
    }
}

impl<W: Write, E: Write> TerminalPage<W, E> {
    pub fn with_writers(chart_dir: impl Into<PathBuf>, out: W, err: E) -> Self {
        let slots = TEXT_SLOTS
            .iter()
            .copied()
            .chain(ChartKind::ALL.iter().map(ChartKind::slot_id))
            .collect();
        Self {
            input: String::new(),
            slots,
            chart_dir: chart_dir.into(),
            out,
            err,
        }
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    pub fn into_writers(self) -> (W, E) {
        (self.out, self.err)
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn write_chart(&self, slot_id: &str, payload: &str) -> anyhow::Result<PathBuf> {
        let bytes = decode_chart(payload)?;
        std::fs::create_dir_all(&self.chart_dir)?;
        let path = self.chart_dir.join(format!("{}.png", slot_id));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

fn chart_title(slot_id: &str) -> &str {
    ChartKind::ALL
        .iter()
        .find(|kind| kind.slot_id() == slot_id)
        .map(ChartKind::title)
        .unwrap_or(slot_id)
}

impl<W: Write, E: Write> Page for TerminalPage<W, E> {
    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn has_slot(&self, id: &str) -> bool {
        self.slots.contains(id)
    }

    fn set_text(&mut self, id: &str, text: &str) -> PageResult<()> {
        if !self.has_slot(id) {
            return Err(PageError::MissingSlot(id.to_string()));
        }
        self.line(text);
        Ok(())
    }

    fn set_chart(&mut self, id: &str, content: ChartContent) -> PageResult<()> {
        if !self.has_slot(id) {
            return Err(PageError::MissingSlot(id.to_string()));
        }
        let title = chart_title(id);
        let text = match content {
            ChartContent::Image(image) => match self.write_chart(id, &image.payload) {
                Ok(path) => format!("{}: {}", title, path.display()),
                Err(e) => {
                    tracing::error!("Could not save chart {}: {}", id, e);
                    format!("{}: image could not be saved", title)
                }
            },
            ChartContent::Fallback(message) => format!("{}: {}", title, message),
        };
        self.line(&text);
        Ok(())
    }

    fn set_background(&mut self, background: Background) {
        let text = format!(
            "Background: {} ({}, {}, {})",
            background.url,
            background.style.size,
            background.style.position,
            background.style.attachment
        );
        self.line(&text);
    }

    fn alert(&mut self, message: &str) {
        if let Err(e) = writeln!(self.err, "! {}", message) {
            tracing::warn!("Failed to write alert: {}", e);
        }
    }
}
