//! Client for the weather trends backend
//!
//! Fetches the current snapshot (`/weather`) and the five trend charts
//! (`/forecast`) for a city.

pub mod client;
pub mod error;
pub mod types;

pub use client::WeatherClient;
pub use error::WeatherError;
pub use types::*;
