//! Renders a weather snapshot into the text slots.

use trendcast_weather::{Reading, WeatherSnapshot};

use crate::page::{
    Page, PageResult, CITY_NAME_SLOT, COLD_WINTER_SLOT, HEAT_WAVE_SLOT, HUMIDITY_SLOT,
    RAINFALL_SLOT, TEMPERATURE_SLOT,
};

const NOT_AVAILABLE: &str = "N/A";

fn with_unit(reading: Option<&Reading>, unit: &str) -> String {
    match reading {
        Some(r) => format!("{}{}", r, unit),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Write city, temperature, precipitation, humidity and the two
/// temperature flags. Absent fields render as `N/A`.
pub fn display_weather_data<P: Page>(page: &mut P, data: &WeatherSnapshot) -> PageResult<()> {
    let city = data
        .city
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(NOT_AVAILABLE);

    page.set_text(CITY_NAME_SLOT, &format!("City: {}", city))?;
    page.set_text(
        TEMPERATURE_SLOT,
        &format!(
            "Average Temperature: {}",
            with_unit(data.avg_temp.as_ref(), " °C")
        ),
    )?;
    page.set_text(
        RAINFALL_SLOT,
        &format!(
            "Precipitation: {}",
            with_unit(data.precipitation.as_ref(), " mm")
        ),
    )?;
    page.set_text(
        HUMIDITY_SLOT,
        &format!("Humidity: {}", with_unit(data.humidity.as_ref(), "%")),
    )?;

    page.set_text(
        HEAT_WAVE_SLOT,
        &format!("Heat Wave: {}", yes_no(data.is_heat_wave())),
    )?;
    page.set_text(
        COLD_WINTER_SLOT,
        &format!("Cold Winter: {}", yes_no(data.is_cold_winter())),
    )?;

    Ok(())
}
