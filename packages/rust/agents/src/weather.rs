//! Weather agent — terrestrial conditions (Open-Meteo) and space weather
//! (NOAA SWPC planetary K-index plus alert feed).
//!
//! Partial data is a success: either half may be missing and the other
//! still renders. Only the record's shape is fixed, not its fullness.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use dailybrief_shared::{LocationConfig, Result};

use crate::{Agent, http_client};

const OPEN_METEO_API: &str = "https://api.open-meteo.com/v1/forecast";
const SWPC_ALERTS_API: &str = "https://services.swpc.noaa.gov/products/alerts.json";
const SWPC_KP_API: &str = "https://services.swpc.noaa.gov/json/planetary_k_index_1m.json";

/// Most recent alerts kept from the SWPC feed.
const MAX_ALERTS: usize = 3;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// The semantic record this agent produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub terrestrial: Option<TerrestrialReport>,
    pub space: Option<SpaceReport>,
}

/// Current conditions plus today's forecast for the configured location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrestrialReport {
    pub location: String,
    pub temperature: i64,
    pub humidity: i64,
    pub wind_speed: i64,
    pub precipitation: f64,
    pub weather_code: i64,
    pub forecast: ForecastSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub high: i64,
    pub low: i64,
    pub precipitation: f64,
}

/// Planetary K-index and recent alert messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceReport {
    pub kp_index: Option<f64>,
    pub alerts: Vec<String>,
}

// ---------------------------------------------------------------------------
// Open-Meteo response shape (the fields we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct MeteoResponse {
    #[serde(default)]
    current: MeteoCurrent,
    #[serde(default)]
    daily: MeteoDaily,
}

#[derive(Debug, Default, Deserialize)]
struct MeteoCurrent {
    #[serde(default)]
    temperature_2m: f64,
    #[serde(default)]
    relative_humidity_2m: f64,
    #[serde(default)]
    precipitation: f64,
    #[serde(default)]
    weather_code: i64,
    #[serde(default)]
    wind_speed_10m: f64,
}

#[derive(Debug, Default, Deserialize)]
struct MeteoDaily {
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    precipitation_sum: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Agent fetching terrestrial and space weather data.
pub struct WeatherAgent {
    client: Client,
    forecast_url: Url,
    alerts_url: Url,
    kp_url: Url,
    location: LocationConfig,
}

impl WeatherAgent {
    pub fn new(location: LocationConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            forecast_url: Url::parse(OPEN_METEO_API).expect("valid endpoint"),
            alerts_url: Url::parse(SWPC_ALERTS_API).expect("valid endpoint"),
            kp_url: Url::parse(SWPC_KP_API).expect("valid endpoint"),
            location,
        })
    }

    #[cfg(test)]
    fn with_endpoints(mut self, forecast: Url, alerts: Url, kp: Url) -> Self {
        self.forecast_url = forecast;
        self.alerts_url = alerts;
        self.kp_url = kp;
        self
    }

    async fn fetch_terrestrial(&self) -> Option<TerrestrialReport> {
        let result = self
            .client
            .get(self.forecast_url.clone())
            .query(&[
                ("latitude", self.location.latitude.to_string()),
                ("longitude", self.location.longitude.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,precipitation,weather_code,wind_speed_10m"
                        .to_string(),
                ),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum"
                        .to_string(),
                ),
                ("temperature_unit", "fahrenheit".to_string()),
                ("wind_speed_unit", "mph".to_string()),
                ("precipitation_unit", "inch".to_string()),
                ("timezone", self.location.timezone.clone()),
                ("forecast_days", "3".to_string()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "failed to fetch terrestrial weather");
                return None;
            }
        };

        let meteo: MeteoResponse = match response.json().await {
            Ok(meteo) => meteo,
            Err(e) => {
                warn!(error = %e, "failed to decode forecast response");
                return None;
            }
        };

        Some(TerrestrialReport {
            location: self.location.name.clone(),
            temperature: meteo.current.temperature_2m.round() as i64,
            humidity: meteo.current.relative_humidity_2m.round() as i64,
            wind_speed: meteo.current.wind_speed_10m.round() as i64,
            precipitation: meteo.current.precipitation,
            weather_code: meteo.current.weather_code,
            forecast: ForecastSummary {
                high: meteo
                    .daily
                    .temperature_2m_max
                    .first()
                    .map(|t| t.round() as i64)
                    .unwrap_or(0),
                low: meteo
                    .daily
                    .temperature_2m_min
                    .first()
                    .map(|t| t.round() as i64)
                    .unwrap_or(0),
                precipitation: meteo.daily.precipitation_sum.first().copied().unwrap_or(0.0),
            },
        })
    }

    async fn fetch_space(&self) -> Option<SpaceReport> {
        let kp_index = self.fetch_kp_index().await;
        let alerts = self.fetch_alerts().await;

        if kp_index.is_none() && alerts.is_empty() {
            return None;
        }

        Some(SpaceReport { kp_index, alerts })
    }

    /// The 1-minute K-index feed is a JSON array; the last sample is current.
    async fn fetch_kp_index(&self) -> Option<f64> {
        let response = self
            .client
            .get(self.kp_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .ok()?;

        let samples: Vec<Value> = response.json().await.ok()?;
        let latest = samples.last()?;

        // The field arrives as a number or, in older snapshots, a string.
        let kp = latest
            .get("kp_index")
            .and_then(|v| v.as_f64().or_else(|| v.as_str()?.parse().ok()))?;
        Some((kp * 10.0).round() / 10.0)
    }

    async fn fetch_alerts(&self) -> Vec<String> {
        let result = self
            .client
            .get(self.alerts_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "failed to fetch space weather alerts");
                return Vec::new();
            }
        };

        let alerts: Vec<Value> = match response.json().await {
            Ok(alerts) => alerts,
            Err(_) => return Vec::new(),
        };

        alerts
            .iter()
            .rev()
            .take(MAX_ALERTS)
            .rev()
            .map(|a| {
                a.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("No message")
                    .to_string()
            })
            .collect()
    }
}

/// Emoji for a WMO weather interpretation code.
fn wmo_emoji(code: i64) -> &'static str {
    match code {
        0 => "☀️",
        1..=3 => "⛅",
        45 | 48 => "🌫️",
        51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => "🌧️",
        71 | 73 | 75 | 77 | 85 | 86 => "🌨️",
        95 | 96 | 99 => "⛈️",
        _ => "🌤️",
    }
}

#[async_trait::async_trait]
impl Agent for WeatherAgent {
    fn name(&self) -> &'static str {
        "Weather"
    }

    async fn fetch(&self) -> Result<Option<Value>> {
        let record = WeatherRecord {
            terrestrial: self.fetch_terrestrial().await,
            space: self.fetch_space().await,
        };

        info!(
            terrestrial = record.terrestrial.is_some(),
            space = record.space.is_some(),
            "weather fetched"
        );

        // Partial (or even empty) data still renders; each half degrades
        // to its own unavailable line.
        Ok(Some(serde_json::to_value(record).expect("record serializes")))
    }

    fn render(&self, data: &Value) -> String {
        let record: WeatherRecord = match serde_json::from_value(data.clone()) {
            Ok(record) => record,
            Err(_) => WeatherRecord {
                terrestrial: None,
                space: None,
            },
        };

        let mut md = String::new();

        md.push_str("## 🌤️ Weather Report\n\n");
        if let Some(weather) = &record.terrestrial {
            md.push_str(&format!("**Location:** {}\n\n", weather.location));
            md.push_str(&format!(
                "{} **Current Conditions:**\n",
                wmo_emoji(weather.weather_code)
            ));
            md.push_str(&format!("- Temperature: {}°F\n", weather.temperature));
            md.push_str(&format!("- Humidity: {}%\n", weather.humidity));
            md.push_str(&format!("- Wind Speed: {} mph\n", weather.wind_speed));

            md.push_str("\n**Today's Forecast:**\n");
            md.push_str(&format!(
                "- High: {}°F / Low: {}°F\n",
                weather.forecast.high, weather.forecast.low
            ));
            if weather.forecast.precipitation > 0.0 {
                md.push_str(&format!(
                    "- Precipitation: {} in\n",
                    weather.forecast.precipitation
                ));
            }
        } else {
            md.push_str("**Weather data unavailable** ⛔\n");
        }

        md.push_str("\n---\n\n");

        md.push_str("## 🌌 Space Weather Status\n\n");
        if let Some(space) = &record.space {
            match space.kp_index {
                Some(kp) => {
                    let status = if kp < 4.0 {
                        "🟢 Quiet"
                    } else if kp < 6.0 {
                        "🟡 Unsettled"
                    } else {
                        "🔴 Storm Conditions"
                    };
                    md.push_str(&format!("**KP Index:** {kp} ({status})\n\n"));
                }
                None => md.push_str("**KP Index:** Data unavailable\n\n"),
            }

            if space.alerts.is_empty() {
                md.push_str("**Recent Alerts:** No active alerts ✅\n");
            } else {
                md.push_str("**Recent Alerts:**\n");
                for alert in space.alerts.iter().take(MAX_ALERTS) {
                    md.push_str(&format!("- {}\n", dailybrief_feed::truncate(alert, 100)));
                }
            }
        } else {
            md.push_str("**Space weather data unavailable** ⛔\n");
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_location() -> LocationConfig {
        LocationConfig::default()
    }

    async fn mock_server(
        forecast: ResponseTemplate,
        alerts: ResponseTemplate,
        kp: ResponseTemplate,
    ) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(forecast)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/alerts"))
            .respond_with(alerts)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/kp"))
            .respond_with(kp)
            .mount(&server)
            .await;
        server
    }

    fn agent_against(server: &MockServer) -> WeatherAgent {
        let base = Url::parse(&server.uri()).unwrap();
        WeatherAgent::new(test_location(), 5).unwrap().with_endpoints(
            base.join("/forecast").unwrap(),
            base.join("/alerts").unwrap(),
            base.join("/kp").unwrap(),
        )
    }

    fn forecast_body() -> Value {
        serde_json::json!({
            "current": {
                "temperature_2m": 84.6,
                "relative_humidity_2m": 71.0,
                "precipitation": 0.0,
                "weather_code": 2,
                "wind_speed_10m": 11.3
            },
            "daily": {
                "temperature_2m_max": [88.2],
                "temperature_2m_min": [77.9],
                "precipitation_sum": [0.12]
            }
        })
    }

    #[tokio::test]
    async fn fetches_both_halves() {
        let server = mock_server(
            ResponseTemplate::new(200).set_body_json(forecast_body()),
            ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"message": "ALERT: Geomagnetic K-index of 4 expected"}
            ])),
            ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"time_tag": "2025-08-07T00:00:00", "kp_index": 2.33}
            ])),
        )
        .await;

        let agent = agent_against(&server);
        let data = agent.fetch().await.unwrap().unwrap();

        assert_eq!(data["terrestrial"]["temperature"], 85);
        assert_eq!(data["terrestrial"]["forecast"]["high"], 88);
        assert_eq!(data["space"]["kp_index"], 2.3);
        assert_eq!(data["space"]["alerts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn partial_data_is_still_a_record() {
        let server = mock_server(
            ResponseTemplate::new(500),
            ResponseTemplate::new(500),
            ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"kp_index": "5.67"}
            ])),
        )
        .await;

        let agent = agent_against(&server);
        let data = agent.fetch().await.unwrap().unwrap();

        assert!(data["terrestrial"].is_null());
        // String-typed kp still parses.
        assert_eq!(data["space"]["kp_index"], 5.7);
    }

    #[tokio::test]
    async fn total_failure_yields_empty_record_not_error() {
        let server = mock_server(
            ResponseTemplate::new(500),
            ResponseTemplate::new(500),
            ResponseTemplate::new(500),
        )
        .await;

        let agent = agent_against(&server);
        let data = agent.fetch().await.unwrap().unwrap();
        assert!(data["terrestrial"].is_null());
        assert!(data["space"].is_null());
    }

    #[test]
    fn renders_full_report() {
        let agent = WeatherAgent::new(test_location(), 5).unwrap();
        let record = WeatherRecord {
            terrestrial: Some(TerrestrialReport {
                location: "San Juan, Puerto Rico".into(),
                temperature: 85,
                humidity: 71,
                wind_speed: 11,
                precipitation: 0.0,
                weather_code: 0,
                forecast: ForecastSummary {
                    high: 88,
                    low: 78,
                    precipitation: 0.12,
                },
            }),
            space: Some(SpaceReport {
                kp_index: Some(6.3),
                alerts: vec!["X".repeat(150)],
            }),
        };

        let md = agent.render(&serde_json::to_value(record).unwrap());
        assert!(md.contains("## 🌤️ Weather Report"));
        assert!(md.contains("- Temperature: 85°F"));
        assert!(md.contains("- High: 88°F / Low: 78°F"));
        assert!(md.contains("- Precipitation: 0.12 in"));
        assert!(md.contains("🔴 Storm Conditions"));
        // Long alert messages are truncated.
        assert!(md.contains("..."));
    }

    #[test]
    fn renders_unavailable_halves() {
        let agent = WeatherAgent::new(test_location(), 5).unwrap();
        let md = agent.render(&serde_json::json!({"terrestrial": null, "space": null}));
        assert!(md.contains("**Weather data unavailable** ⛔"));
        assert!(md.contains("**Space weather data unavailable** ⛔"));
    }

    #[test]
    fn kp_status_bands() {
        let agent = WeatherAgent::new(test_location(), 5).unwrap();
        let render_kp = |kp: f64| {
            agent.render(&serde_json::json!({
                "terrestrial": null,
                "space": {"kp_index": kp, "alerts": []}
            }))
        };

        assert!(render_kp(2.0).contains("🟢 Quiet"));
        assert!(render_kp(4.5).contains("🟡 Unsettled"));
        assert!(render_kp(7.0).contains("🔴 Storm Conditions"));
    }

    #[test]
    fn wmo_emoji_mapping() {
        assert_eq!(wmo_emoji(0), "☀️");
        assert_eq!(wmo_emoji(2), "⛅");
        assert_eq!(wmo_emoji(48), "🌫️");
        assert_eq!(wmo_emoji(63), "🌧️");
        assert_eq!(wmo_emoji(73), "🌨️");
        assert_eq!(wmo_emoji(95), "⛈️");
        assert_eq!(wmo_emoji(42), "🌤️");
    }
}
