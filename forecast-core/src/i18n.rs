//! User-facing strings in the supported languages.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{error::SearchError, model::Units};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ru,
    En,
}

/// Every label the widget shows, for one language.
#[derive(Debug)]
pub struct Text {
    pub title: &'static str,
    pub prompt: &'static str,
    pub loading: &'static str,
    pub city_not_found: &'static str,
    pub temperature: &'static str,
    pub humidity: &'static str,
    pub wind_speed: &'static str,
    pub feels_like: &'static str,
    pub date: &'static str,
    pub visibility: &'static str,
    pub metres: &'static str,
    pub forecast_heading: &'static str,
    pub forecast_unavailable: &'static str,
    pub empty_city: &'static str,
    pub geolocation_unsupported: &'static str,
    pub geolocation_denied: &'static str,
    pub geolocation_failed: &'static str,
    pub fetch_failed: &'static str,
    pub metres_per_second: &'static str,
    pub miles_per_hour: &'static str,
    /// Monday first.
    pub weekdays: [&'static str; 7],
}

static RU: Text = Text {
    title: "Прогноз погоды",
    prompt: "Введите город",
    loading: "...Загрузка",
    city_not_found: "Город не найден",
    temperature: "Температура",
    humidity: "💧 Влажность",
    wind_speed: "Скорость ветра",
    feels_like: "Ощущается как",
    date: "Дата",
    visibility: "Видимость",
    metres: "м",
    forecast_heading: "Прогноз на 7 дней:",
    forecast_unavailable: "Прогноз недоступен",
    empty_city: "Введите название города",
    geolocation_unsupported: "Геолокация не поддерживается",
    geolocation_denied: "Пользователь запретил доступ к местоположению",
    geolocation_failed: "Не удалось получить данные по геолокации",
    fetch_failed: "Не удалось получить данные о погоде",
    metres_per_second: "м/с",
    miles_per_hour: "миль/ч",
    weekdays: ["пн", "вт", "ср", "чт", "пт", "сб", "вс"],
};

static EN: Text = Text {
    title: "Weather forecast",
    prompt: "Enter a city",
    loading: "...Loading",
    city_not_found: "City not found",
    temperature: "Temperature",
    humidity: "💧 Humidity",
    wind_speed: "Wind speed",
    feels_like: "Feels like",
    date: "Date",
    visibility: "Visibility",
    metres: "m",
    forecast_heading: "7-day forecast:",
    forecast_unavailable: "Forecast unavailable",
    empty_city: "Enter a city name",
    geolocation_unsupported: "Geolocation is not supported",
    geolocation_denied: "Access to your location was denied",
    geolocation_failed: "Could not get weather for your location",
    fetch_failed: "Could not get weather data",
    metres_per_second: "m/s",
    miles_per_hour: "mph",
    weekdays: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
};

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Ru => "ru",
            Lang::En => "en",
        }
    }

    pub fn text(&self) -> &'static Text {
        match self {
            Lang::Ru => &RU,
            Lang::En => &EN,
        }
    }

    /// Short weekday label for a forecast date.
    pub fn weekday(&self, date: NaiveDate) -> &'static str {
        self.text().weekdays[date.weekday().num_days_from_monday() as usize]
    }

    pub fn speed_unit(&self, units: Units) -> &'static str {
        match units {
            Units::Metric => self.text().metres_per_second,
            Units::Imperial => self.text().miles_per_hour,
        }
    }

    pub fn error_message(&self, err: &SearchError) -> &'static str {
        let text = self.text();
        match err {
            SearchError::EmptyCity => text.empty_city,
            SearchError::GeolocationUnsupported => text.geolocation_unsupported,
            SearchError::GeolocationDenied => text.geolocation_denied,
            SearchError::Geolocation(_) => text.geolocation_failed,
            SearchError::Fetch(_) => text.fetch_failed,
        }
    }
}

impl TryFrom<&str> for Lang {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "ru" => Ok(Lang::Ru),
            "en" => Ok(Lang::En),
            _ => Err(anyhow::anyhow!("Unknown language '{value}'. Supported: ru, en.")),
        }
    }
}
