use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::WeatherError;

/// Average temperature (°C) above which a city is in a heat wave
pub const HEAT_WAVE_THRESHOLD_C: f64 = 29.0;

/// Average temperature (°C) below which a city is having a cold winter
pub const COLD_WINTER_THRESHOLD_C: f64 = 11.0;

/// A single numeric field as the backend sends it.
///
/// The backend substitutes the string `"N/A"` for values it does not have,
/// so a reading is either a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    /// Numeric value, if the reading holds one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => leading_number(s).filter(|n| n.is_finite()),
        }
    }
}

/// Parse the longest numeric prefix of `s`, so `"31 C"` reads as 31.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }

    // An exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Latest weather reading for a city
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub avg_temp: Option<Reading>,
    #[serde(default)]
    pub precipitation: Option<Reading>,
    #[serde(default)]
    pub humidity: Option<Reading>,
}

impl WeatherSnapshot {
    fn avg_temp_celsius(&self) -> Option<f64> {
        self.avg_temp.as_ref().and_then(Reading::as_f64)
    }

    /// Average temperature strictly above [`HEAT_WAVE_THRESHOLD_C`]
    pub fn is_heat_wave(&self) -> bool {
        self.avg_temp_celsius()
            .is_some_and(|t| t > HEAT_WAVE_THRESHOLD_C)
    }

    /// Average temperature strictly below [`COLD_WINTER_THRESHOLD_C`]
    pub fn is_cold_winter(&self) -> bool {
        self.avg_temp_celsius()
            .is_some_and(|t| t < COLD_WINTER_THRESHOLD_C)
    }
}

/// The five trend charts produced by `/forecast`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    HotWeather,
    ColdWeather,
    FuturePrecipitation,
    FutureHumidity,
    FutureTemperature,
}

impl ChartKind {
    /// Render order
    pub const ALL: [ChartKind; 5] = [
        Self::HotWeather,
        Self::ColdWeather,
        Self::FuturePrecipitation,
        Self::FutureHumidity,
        Self::FutureTemperature,
    ];

    /// Key in the forecast JSON
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::HotWeather => "hot_weather_graph",
            Self::ColdWeather => "cold_weather_graph",
            Self::FuturePrecipitation => "future_precipitation_graph",
            Self::FutureHumidity => "future_humidity_graph",
            Self::FutureTemperature => "future_temperature_graph",
        }
    }

    /// Page slot the chart is rendered into
    pub fn slot_id(&self) -> &'static str {
        match self {
            Self::HotWeather => "hot-weather-graph",
            Self::ColdWeather => "cold-weather-graph",
            Self::FuturePrecipitation => "future-precipitation-graph",
            Self::FutureHumidity => "future-humidity-graph",
            Self::FutureTemperature => "future-temperature-graph",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::HotWeather => "Hot Weather Trends",
            Self::ColdWeather => "Cold Weather Trends",
            Self::FuturePrecipitation => "Future Precipitation",
            Self::FutureHumidity => "Future Humidity",
            Self::FutureTemperature => "Future Temperature",
        }
    }
}

/// Base64-encoded PNG charts keyed by [`ChartKind`].
///
/// Fields that are absent or not strings deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(default, deserialize_with = "string_only")]
    pub hot_weather_graph: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub cold_weather_graph: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub future_precipitation_graph: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub future_humidity_graph: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub future_temperature_graph: Option<String>,
}

impl ForecastPayload {
    pub fn chart(&self, kind: ChartKind) -> Option<&str> {
        let field = match kind {
            ChartKind::HotWeather => &self.hot_weather_graph,
            ChartKind::ColdWeather => &self.cold_weather_graph,
            ChartKind::FuturePrecipitation => &self.future_precipitation_graph,
            ChartKind::FutureHumidity => &self.future_humidity_graph,
            ChartKind::FutureTemperature => &self.future_temperature_graph,
        };
        field.as_deref()
    }

    /// All five charts in render order
    pub fn charts(&self) -> impl Iterator<Item = (ChartKind, Option<&str>)> + '_ {
        ChartKind::ALL.into_iter().map(|kind| (kind, self.chart(kind)))
    }
}

fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Decode a base64 chart payload into PNG bytes
pub fn decode_chart(payload: &str) -> Result<Vec<u8>, WeatherError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

/// What the backend answered: a payload, or the text of its `error` field
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply<T> {
    Ok(T),
    Error(String),
}

impl<T: DeserializeOwned> BackendReply<T> {
    /// Interpret a JSON body.
    ///
    /// A present, non-empty `error` field wins over any payload fields.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if let Some(message) = value.get("error").and_then(error_text) {
            return Ok(Self::Error(message));
        }
        serde_json::from_value(value).map(Self::Ok)
    }
}

impl<T> BackendReply<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reading_number_display() {
        assert_eq!(Reading::Number(30.0).to_string(), "30");
        assert_eq!(Reading::Number(12.5).to_string(), "12.5");
    }

    #[test]
    fn test_reading_text_as_f64() {
        assert_eq!(Reading::Text(" 21.5 ".into()).as_f64(), Some(21.5));
        assert_eq!(Reading::Text("N/A".into()).as_f64(), None);
        assert_eq!(Reading::Text("31 C".into()).as_f64(), Some(31.0));
        assert_eq!(Reading::Text(".5mm".into()).as_f64(), Some(0.5));
        assert_eq!(Reading::Text("7.".into()).as_f64(), Some(7.0));
        assert_eq!(Reading::Text("1e".into()).as_f64(), Some(1.0));
        assert_eq!(Reading::Text("-4.5e1x".into()).as_f64(), Some(-45.0));
        assert_eq!(Reading::Text("-.".into()).as_f64(), None);
        assert_eq!(Reading::Text("".into()).as_f64(), None);
    }

    #[test]
    fn test_snapshot_from_backend_json() {
        let snapshot: WeatherSnapshot = serde_json::from_value(json!({
            "city": "Paris",
            "avg_temp": 18.4,
            "precipitation": "N/A",
            "humidity": 71
        }))
        .unwrap();

        assert_eq!(snapshot.city.as_deref(), Some("Paris"));
        assert_eq!(snapshot.avg_temp, Some(Reading::Number(18.4)));
        assert_eq!(snapshot.precipitation, Some(Reading::Text("N/A".into())));
        assert_eq!(snapshot.humidity, Some(Reading::Number(71.0)));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot: WeatherSnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot, WeatherSnapshot::default());
        assert!(!snapshot.is_heat_wave());
        assert!(!snapshot.is_cold_winter());
    }

    #[test]
    fn test_thresholds() {
        let at = |t: f64| WeatherSnapshot {
            avg_temp: Some(Reading::Number(t)),
            ..Default::default()
        };
        assert!(at(30.0).is_heat_wave());
        assert!(!at(29.0).is_heat_wave());
        assert!(at(10.0).is_cold_winter());
        assert!(!at(11.0).is_cold_winter());
        assert!(!at(20.0).is_heat_wave());
        assert!(!at(20.0).is_cold_winter());
    }

    #[test]
    fn test_chart_kind_names() {
        assert_eq!(ChartKind::HotWeather.slot_id(), "hot-weather-graph");
        assert_eq!(
            ChartKind::FutureTemperature.field_name(),
            "future_temperature_graph"
        );
    }

    #[test]
    fn test_forecast_non_string_fields_are_none() {
        let payload: ForecastPayload = serde_json::from_value(json!({
            "hot_weather_graph": "aGVsbG8=",
            "cold_weather_graph": 42,
            "future_humidity_graph": null
        }))
        .unwrap();

        assert_eq!(payload.chart(ChartKind::HotWeather), Some("aGVsbG8="));
        assert_eq!(payload.chart(ChartKind::ColdWeather), None);
        assert_eq!(payload.chart(ChartKind::FutureHumidity), None);
        assert_eq!(payload.chart(ChartKind::FuturePrecipitation), None);
        assert_eq!(payload.charts().count(), 5);
    }

    #[test]
    fn test_reply_error_wins() {
        let reply: BackendReply<WeatherSnapshot> = BackendReply::from_value(json!({
            "error": "No data available for Atlantis."
        }))
        .unwrap();
        assert_eq!(
            reply,
            BackendReply::Error("No data available for Atlantis.".into())
        );
    }

    #[test]
    fn test_reply_falsy_error_is_ignored() {
        let reply: BackendReply<WeatherSnapshot> =
            BackendReply::from_value(json!({"error": "", "city": "Oslo"})).unwrap();
        assert!(!reply.is_error());
    }

    #[test]
    fn test_decode_chart() {
        assert_eq!(decode_chart("aGVsbG8=").unwrap(), b"hello");
        assert!(decode_chart("not base64!").is_err());
    }
}
