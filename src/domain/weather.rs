use serde::{Deserialize, Serialize};

/// Raw payload of `/weather/current/{city}`, an OpenWeather-style document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub weather: Vec<Conditions>,
    #[serde(default)]
    pub wind: Option<Wind>,
    /// metres
    #[serde(default)]
    pub visibility: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainReadings {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conditions {
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: Option<String>,
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
    pub visibility_km: Option<f64>,
    pub icon: Option<String>,
}

impl From<WeatherPayload> for WeatherReport {
    fn from(payload: WeatherPayload) -> Self {
        let main = payload.main.unwrap_or_default();
        let first = payload.weather.into_iter().next().unwrap_or_default();
        Self {
            location: payload.name,
            temperature: main.temp,
            description: first.description,
            humidity: main.humidity,
            wind_speed: payload.wind.and_then(|w| w.speed),
            pressure: main.pressure,
            visibility_km: payload.visibility.map(|metres| metres / 1000.0),
            icon: first.icon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Rain,
    Cloudy,
    Clear,
    Unknown,
}

impl WeatherReport {
    pub fn condition(&self) -> WeatherCondition {
        let Some(description) = self.description.as_deref() else {
            return WeatherCondition::Unknown;
        };
        let description = description.to_lowercase();
        if description.contains("rain") {
            WeatherCondition::Rain
        } else if description.contains("cloud") {
            WeatherCondition::Cloudy
        } else if description.contains("sun") || description.contains("clear") {
            WeatherCondition::Clear
        } else {
            WeatherCondition::Unknown
        }
    }
}
