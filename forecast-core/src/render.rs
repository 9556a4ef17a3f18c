//! Plain-text rendering of the widget.

use crate::{
    i18n::Lang,
    model::{CurrentWeather, Forecast, Units},
    search::{CurrentSlot, SearchState},
    theme::Theme,
};

pub fn render(state: &SearchState, theme: &Theme, lang: Lang, units: Units) -> String {
    let text = lang.text();
    let backdrop = theme.backdrop();

    let mut lines = vec![
        format!("{} [{}]", backdrop.icon, backdrop.video_src),
        text.title.to_string(),
    ];

    if state.loading {
        lines.push(text.loading.to_string());
    }
    if let Some(err) = &state.error {
        lines.push(lang.error_message(err).to_string());
    }

    match &state.current {
        CurrentSlot::Loaded(weather) => lines.extend(render_current(weather, lang, units)),
        CurrentSlot::NotFound => lines.push(text.city_not_found.to_string()),
        CurrentSlot::Empty => {}
    }

    if let Some(forecast) = state.forecast.as_ref().filter(|f| !f.days.is_empty()) {
        lines.push(String::new());
        lines.push(text.forecast_heading.to_string());
        lines.extend(render_forecast_tiles(forecast, lang, units));
    } else if state.forecast_error.is_some() {
        lines.push(String::new());
        lines.push(text.forecast_unavailable.to_string());
    }

    lines.join("\n")
}

pub fn render_current(weather: &CurrentWeather, lang: Lang, units: Units) -> Vec<String> {
    let text = lang.text();
    let deg = units.temperature_suffix();

    let mut lines = vec![
        String::new(),
        format!("== {} ==", weather.location_name),
        weather.icon_url(),
        weather.description.clone(),
        format!("{}: {}{deg}", text.temperature, weather.temperature),
        format!("{}: {}%", text.humidity, weather.humidity_pct),
        format!("{}: {} {}", text.wind_speed, weather.wind_speed, lang.speed_unit(units)),
        format!("{}: {}{deg}", text.feels_like, weather.feels_like),
        format!("{}: {}", text.date, weather.observation_time.format("%d.%m.%Y")),
    ];
    if let Some(visibility) = weather.visibility {
        lines.push(format!("{}: {visibility} {}", text.visibility, text.metres));
    }
    lines
}

/// One line per forecast day, in the order received.
pub fn render_forecast_tiles(forecast: &Forecast, lang: Lang, units: Units) -> Vec<String> {
    let deg = units.temperature_suffix();

    forecast
        .days
        .iter()
        .map(|day| {
            format!(
                "{:<3} {} | {}{deg} / {}{deg} | {} | {}",
                lang.weekday(day.date),
                day.date.format("%Y-%m-%d"),
                day.max_temp,
                day.min_temp,
                day.condition.text,
                day.condition.icon,
            )
        })
        .collect()
}
