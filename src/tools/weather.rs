//! Deterministic mock weather tools.
//!
//! There is no weather service behind these. Known cities come from a fixed
//! table and everything else gets the default record, so the tool-calling loop
//! can be exercised offline.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::{Tool, ToolArgs};
use crate::types::{ParameterSpec, ParameterType, ToolDeclaration};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "celsius" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(format!(
                "unsupported unit '{other}', expected 'celsius' or 'fahrenheit'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherReport {
    pub temperature: i32,
    pub condition: &'static str,
    pub humidity: u8,
    pub wind_speed: u32,
    pub unit: TemperatureUnit,
}

const fn report(temperature: i32, condition: &'static str, humidity: u8, wind_speed: u32) -> WeatherReport {
    WeatherReport {
        temperature,
        condition,
        humidity,
        wind_speed,
        unit: TemperatureUnit::Celsius,
    }
}

const DEFAULT_REPORT: WeatherReport = report(20, "clear", 50, 10);

static CITY_WEATHER: Lazy<HashMap<&'static str, WeatherReport>> = Lazy::new(|| {
    HashMap::from([
        ("auckland", report(18, "sunny", 45, 8)),
        ("wellington", report(15, "partly cloudy", 60, 12)),
        ("sydney", report(25, "sunny", 50, 10)),
        ("london", report(10, "rainy", 85, 15)),
        ("tokyo", report(22, "clear", 40, 5)),
    ])
});

/// Weather for `location`. Lookup is case-insensitive; unknown places get
/// the default record.
pub fn weather_for(location: &str) -> WeatherReport {
    let key = location.trim().to_lowercase();
    CITY_WEATHER
        .get(key.as_str())
        .copied()
        .unwrap_or(DEFAULT_REPORT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub city: &'static str,
    pub country: &'static str,
}

pub fn current_location() -> Location {
    Location {
        city: "Auckland",
        country: "New Zealand",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Conversion {
    pub temperature: f64,
    pub unit: TemperatureUnit,
}

/// Convert between units, rounded to one decimal. Same-unit conversion
/// returns the input untouched.
pub fn convert(temperature: f64, from: TemperatureUnit, to: TemperatureUnit) -> Conversion {
    let converted = match (from, to) {
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => {
            round_tenth(temperature * 9.0 / 5.0 + 32.0)
        }
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => {
            round_tenth((temperature - 32.0) * 5.0 / 9.0)
        }
        _ => temperature,
    };
    Conversion {
        temperature: converted,
        unit: to,
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub(crate) fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetWeather),
        Arc::new(GetCurrentLocation),
        Arc::new(ConvertTemperature),
    ]
}

pub struct GetWeather;

#[async_trait]
impl Tool for GetWeather {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new("get_weather", "Gets the current weather for a location").parameter(
            ParameterSpec::new(
                "location",
                ParameterType::String,
                "City name, e.g. Auckland or Tokyo",
            )
            .required(),
        )
    }

    async fn call(&self, args: &ToolArgs<'_>) -> Result<Value> {
        let location = args.str("location")?;
        Ok(serde_json::to_value(weather_for(location))?)
    }
}

pub struct GetCurrentLocation;

#[async_trait]
impl Tool for GetCurrentLocation {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new("get_current_location", "Gets the user's current location")
    }

    async fn call(&self, _args: &ToolArgs<'_>) -> Result<Value> {
        Ok(serde_json::to_value(current_location())?)
    }
}

pub struct ConvertTemperature;

#[async_trait]
impl Tool for ConvertTemperature {
    fn declaration(&self) -> ToolDeclaration {
        let unit = |name: &str, desc: &str| {
            ParameterSpec::new(name, ParameterType::String, desc)
                .required()
                .one_of(["celsius", "fahrenheit"])
        };
        ToolDeclaration::new(
            "convert_temperature",
            "Converts a temperature between celsius and fahrenheit",
        )
        .parameter(
            ParameterSpec::new("temperature", ParameterType::Number, "Temperature value")
                .required(),
        )
        .parameter(unit("from_unit", "Unit of the given temperature"))
        .parameter(unit("to_unit", "Unit to convert to"))
    }

    async fn call(&self, args: &ToolArgs<'_>) -> Result<Value> {
        let temperature = args.number("temperature")?;
        let from: TemperatureUnit = args.parse("from_unit")?;
        let to: TemperatureUnit = args.parse("to_unit")?;
        Ok(serde_json::to_value(convert(temperature, from, to))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use crate::types::ToolInvocation;
    use crate::Error;
    use serde_json::json;
    use super::TemperatureUnit::*;

    #[test]
    fn test_known_city_case_insensitive() {
        let report = weather_for("LoNdOn");
        assert_eq!(report.temperature, 10);
        assert_eq!(report.condition, "rainy");
        assert_eq!(report.humidity, 85);
        assert_eq!(report.wind_speed, 15);
        assert_eq!(report.unit, Celsius);
    }

    #[test]
    fn test_unknown_city_gets_default() {
        assert_eq!(weather_for("Reykjavik"), DEFAULT_REPORT);
        assert_eq!(weather_for(""), DEFAULT_REPORT);
    }

    #[test]
    fn test_convert_known_values() {
        assert_eq!(convert(100.0, Celsius, Fahrenheit).temperature, 212.0);
        assert_eq!(convert(32.0, Fahrenheit, Celsius).temperature, 0.0);
        assert_eq!(convert(18.0, Celsius, Fahrenheit).temperature, 64.4);
        assert_eq!(convert(-40.0, Fahrenheit, Celsius).temperature, -40.0);
    }

    #[test]
    fn test_convert_same_unit_is_identity() {
        let c = convert(36.66, Celsius, Celsius);
        assert_eq!(c.temperature, 36.66);
        assert_eq!(c.unit, Celsius);
    }

    #[test]
    fn test_convert_round_trip_within_rounding() {
        for t in [-17.3, 0.0, 21.5, 37.0, 99.9] {
            let f = convert(t, Celsius, Fahrenheit).temperature;
            let back = convert(f, Fahrenheit, Celsius).temperature;
            assert!((back - t).abs() <= 0.1, "{t} -> {f} -> {back}");
        }
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("Fahrenheit".parse::<TemperatureUnit>().unwrap(), Fahrenheit);
        assert_eq!(" CELSIUS ".parse::<TemperatureUnit>().unwrap(), Celsius);
        assert!("kelvin".parse::<TemperatureUnit>().is_err());
    }

    #[tokio::test]
    async fn test_convert_tool_payload() {
        let registry = ToolRegistry::weather();
        let inv = ToolInvocation::new(
            "convert_temperature",
            json!({"temperature": 100, "from_unit": "celsius", "to_unit": "fahrenheit"}),
        );
        let result = registry.invoke(&inv).await;
        assert_eq!(
            result.payload(),
            json!({"result": {"temperature": 212.0, "unit": "fahrenheit"}})
        );
    }

    #[tokio::test]
    async fn test_invalid_unit_is_invalid_argument() {
        let tool = ConvertTemperature;
        let map = json!({"temperature": 1, "from_unit": "kelvin", "to_unit": "celsius"})
            .as_object()
            .cloned()
            .unwrap();
        let err = tool
            .call(&ToolArgs::new("convert_temperature", &map))
            .await
            .unwrap_err();
        match err {
            Error::InvalidArgument { argument, .. } => assert_eq!(argument, "from_unit"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nan_temperature_is_invalid_argument() {
        let registry = ToolRegistry::weather();
        let inv = ToolInvocation::new(
            "convert_temperature",
            json!({"temperature": "NaN", "from_unit": "celsius", "to_unit": "fahrenheit"}),
        );
        let result = registry.invoke(&inv).await;
        assert!(result.is_error());
        assert_eq!(
            result.payload(),
            json!({"error": "Invalid argument 'temperature' for convert_temperature: must be a finite number"})
        );
    }

    #[tokio::test]
    async fn test_weather_lookup_is_idempotent() {
        assert_eq!(weather_for("Tokyo"), weather_for("Tokyo"));
        assert_eq!(weather_for("Nowhere"), weather_for("Nowhere"));

        let registry = ToolRegistry::weather();
        let inv = ToolInvocation::new("get_weather", json!({"location": "Wellington"}));
        let first = registry.invoke(&inv).await;
        let second = registry.invoke(&inv).await;
        assert_eq!(first, second);
        assert_eq!(first.payload()["result"]["temperature"], 15);
    }

    #[tokio::test]
    async fn test_location_and_weather_tools() {
        let registry = ToolRegistry::weather();
        let loc = registry
            .invoke(&ToolInvocation::new("get_current_location", json!({})))
            .await;
        assert_eq!(
            loc.payload(),
            json!({"result": {"city": "Auckland", "country": "New Zealand"}})
        );

        let weather = registry
            .invoke(&ToolInvocation::new("get_weather", json!({"location": "Auckland"})))
            .await;
        assert_eq!(weather.payload()["result"]["condition"], "sunny");
        assert_eq!(weather.payload()["result"]["unit"], "celsius");
    }
}
