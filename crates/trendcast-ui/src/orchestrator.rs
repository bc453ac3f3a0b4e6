//! Two-stage search pipeline: current weather, then forecast charts.

use trendcast_core::{AppError, WeatherError};
use trendcast_weather::{BackendReply, WeatherClient};

use crate::chart::{display_graph, ChartOutcome};
use crate::error_mapping::ClientErrorExt;
use crate::page::Page;
use crate::rotator::ImageRotator;
use crate::store::RotationStore;
use crate::weather_display::display_weather_data;

pub const EMPTY_CITY_ALERT: &str = "Please enter a city name.";
pub const REQUEST_FAILED_ALERT: &str = "Failed to fetch data. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    FetchingWeather,
    FetchingForecast,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Weather,
    Forecast,
}

#[derive(Debug)]
pub enum Failure {
    EmptyCity,
    /// The backend answered with an `error` field
    Backend { stage: Stage, message: String },
    /// The request or the rendering of its reply failed
    Transport { stage: Stage, error: AppError },
}

/// Outcome of one submit
#[derive(Debug)]
pub struct RunReport {
    pub city: Option<String>,
    pub state: RunState,
    pub weather_rendered: bool,
    /// Chart containers that received an image
    pub charts_rendered: usize,
    /// Chart containers that received the fallback text
    pub charts_fallback: usize,
    /// Catalog index shown after the forecast, if the background changed
    pub background: Option<usize>,
    pub failures: Vec<Failure>,
}

impl RunReport {
    fn new(city: Option<String>) -> Self {
        Self {
            city,
            state: RunState::Validating,
            weather_rendered: false,
            charts_rendered: 0,
            charts_fallback: 0,
            background: None,
            failures: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == RunState::Done
    }
}

pub struct Orchestrator {
    client: WeatherClient,
    rotator: ImageRotator,
    store: Option<RotationStore>,
    abort_on_weather_error: bool,
    state: RunState,
}

impl Orchestrator {
    pub fn new(client: WeatherClient, rotator: ImageRotator) -> Self {
        Self {
            client,
            rotator,
            store: None,
            abort_on_weather_error: false,
            state: RunState::Idle,
        }
    }

    /// Skip the forecast stage when the weather stage reports an error.
    pub fn abort_on_weather_error(mut self, abort: bool) -> Self {
        self.abort_on_weather_error = abort;
        self
    }

    /// Persist the rotation index after every change, restoring it now.
    pub fn with_store(mut self, store: RotationStore) -> Self {
        self.rotator.restore_last_index(store.load());
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn rotator(&self) -> &ImageRotator {
        &self.rotator
    }

    /// Handle one press of the search button.
    pub async fn submit<P: Page>(&mut self, page: &mut P) -> RunReport {
        self.state = RunState::Validating;

        let input = page.input_value();
        let city = input.trim();
        if city.is_empty() {
            page.alert(EMPTY_CITY_ALERT);
            let mut report = RunReport::new(None);
            report.failures.push(Failure::EmptyCity);
            return self.finish(report, RunState::Failed);
        }

        let city = city.to_string();
        tracing::info!(city = %city, "Searching");
        let mut report = RunReport::new(Some(city.clone()));

        // Weather stage
        self.state = RunState::FetchingWeather;
        match self.client.fetch_weather(&city).await {
            Err(e) => return self.transport_failure(page, report, Stage::Weather, e.into_app_error()),
            Ok(BackendReply::Error(message)) => {
                tracing::error!("Error fetching weather data: {}", message);
                page.alert(&message);
                report.failures.push(Failure::Backend {
                    stage: Stage::Weather,
                    message,
                });
                if self.abort_on_weather_error {
                    return self.finish(report, RunState::Failed);
                }
            }
            Ok(BackendReply::Ok(snapshot)) => {
                if let Err(e) = display_weather_data(page, &snapshot) {
                    let error = AppError::Weather(WeatherError::InvalidPayload(e.to_string()));
                    return self.transport_failure(page, report, Stage::Weather, error);
                }
                report.weather_rendered = true;
            }
        }

        // Forecast stage
        self.state = RunState::FetchingForecast;
        match self.client.fetch_forecast(&city).await {
            Err(e) => self.transport_failure(page, report, Stage::Forecast, e.into_app_error()),
            Ok(BackendReply::Error(message)) => {
                tracing::error!("Error fetching forecast data: {}", message);
                page.alert(&message);
                report.failures.push(Failure::Backend {
                    stage: Stage::Forecast,
                    message,
                });
                self.finish(report, RunState::Failed)
            }
            Ok(BackendReply::Ok(payload)) => {
                for (kind, chart) in payload.charts() {
                    match display_graph(page, kind.slot_id(), chart) {
                        ChartOutcome::Rendered => report.charts_rendered += 1,
                        ChartOutcome::Fallback => report.charts_fallback += 1,
                        ChartOutcome::MissingSlot => {}
                    }
                }

                report.background = self.rotator.rotate(page);
                self.persist_rotation();

                let state = if report.failures.is_empty() {
                    RunState::Done
                } else {
                    RunState::Failed
                };
                self.finish(report, state)
            }
        }
    }

    fn transport_failure<P: Page>(
        &mut self,
        page: &mut P,
        mut report: RunReport,
        stage: Stage,
        error: AppError,
    ) -> RunReport {
        tracing::error!(?stage, hint = error.user_message(), "Request failed: {}", error);
        page.alert(REQUEST_FAILED_ALERT);
        report.failures.push(Failure::Transport { stage, error });
        self.finish(report, RunState::Failed)
    }

    fn finish(&mut self, mut report: RunReport, state: RunState) -> RunReport {
        self.state = state;
        report.state = state;
        tracing::debug!(?state, "Search finished");
        report
    }

    fn persist_rotation(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(self.rotator.last_index()) {
                tracing::warn!("Failed to save {}: {}", store.path().display(), e);
            }
        }
    }
}
