use async_trait::async_trait;
use serde::Deserialize;
use slog::{debug, Logger};
use std::sync::Arc;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime, PrimitiveDateTime};

use crate::JsonFetcher;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Connection failure, timeout or a non-2xx status
    #[error("error requesting {url}: {reason}")]
    Transport { url: String, reason: String },
    /// The service answered but the payload lacks what we need
    #[error("unexpected forecast payload: {0}")]
    Schema(String),
}

impl ForecastError {
    /// Text shown to the user when an airport's weather could not be sampled
    pub fn advisory(&self, airport: &str) -> String {
        match self {
            ForecastError::Transport { .. } => format!(
                "Weather service unavailable for {}, its weather readings were set to 0.",
                airport
            ),
            ForecastError::Schema(_) => format!(
                "Local weather station in error for {}, its weather readings were set to 0.",
                airport
            ),
        }
    }
}

/// Grid cell the forecast service publishes data for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPoint {
    pub grid_id: String,
    pub grid_x: i64,
    pub grid_y: i64,
}

#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    pub properties: Option<PointsProperties>,
}

#[derive(Debug, Deserialize)]
pub struct PointsProperties {
    #[serde(rename = "gridId")]
    pub grid_id: Option<String>,
    #[serde(rename = "gridX")]
    pub grid_x: Option<i64>,
    #[serde(rename = "gridY")]
    pub grid_y: Option<i64>,
}

impl TryFrom<PointsResponse> for GridPoint {
    type Error = ForecastError;
    fn try_from(raw: PointsResponse) -> Result<Self, Self::Error> {
        let properties = raw
            .properties
            .ok_or_else(|| ForecastError::Schema(String::from("points response has no properties")))?;
        Ok(GridPoint {
            grid_id: properties
                .grid_id
                .ok_or_else(|| ForecastError::Schema(String::from("points response has no gridId")))?,
            grid_x: properties
                .grid_x
                .ok_or_else(|| ForecastError::Schema(String::from("points response has no gridX")))?,
            grid_y: properties
                .grid_y
                .ok_or_else(|| ForecastError::Schema(String::from("points response has no gridY")))?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GridpointResponse {
    pub properties: Option<GridpointProperties>,
}

#[derive(Debug, Deserialize)]
pub struct GridpointProperties {
    #[serde(rename = "quantitativePrecipitation")]
    pub quantitative_precipitation: Option<RawSeries>,
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<RawSeries>,
    #[serde(rename = "snowfallAmount")]
    pub snowfall_amount: Option<RawSeries>,
}

#[derive(Debug, Deserialize)]
pub struct RawSeries {
    pub values: Option<Vec<RawValue>>,
}

#[derive(Debug, Deserialize)]
pub struct RawValue {
    #[serde(rename = "validTime")]
    pub valid_time: String,
    pub value: Option<f64>,
}

/// A single forecast value and the start of its validity interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub valid_from: PrimitiveDateTime,
    pub value: Option<f64>,
}

/// Ordered values of one measured quantity at one grid point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSeries {
    pub observations: Vec<Observation>,
}

impl ObservationSeries {
    fn from_raw(name: &str, raw: Option<RawSeries>) -> Result<Self, ForecastError> {
        let raw =
            raw.ok_or_else(|| ForecastError::Schema(format!("gridpoint response has no {}", name)))?;
        let values = raw
            .values
            .ok_or_else(|| ForecastError::Schema(format!("{} has no values", name)))?;

        let observations = values
            .into_iter()
            .map(|entry| {
                Ok(Observation {
                    valid_from: parse_valid_time(&entry.valid_time)?,
                    value: entry.value,
                })
            })
            .collect::<Result<Vec<Observation>, ForecastError>>()?;

        Ok(ObservationSeries { observations })
    }
}

/// The three quantities the classifier was trained on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridpointSeries {
    pub precipitation: ObservationSeries,
    pub wind_speed: ObservationSeries,
    pub snowfall: ObservationSeries,
}

impl TryFrom<GridpointResponse> for GridpointSeries {
    type Error = ForecastError;
    fn try_from(raw: GridpointResponse) -> Result<Self, Self::Error> {
        let properties = raw.properties.ok_or_else(|| {
            ForecastError::Schema(String::from("gridpoint response has no properties"))
        })?;
        Ok(GridpointSeries {
            precipitation: ObservationSeries::from_raw(
                "quantitativePrecipitation",
                properties.quantitative_precipitation,
            )?,
            wind_speed: ObservationSeries::from_raw("windSpeed", properties.wind_speed)?,
            snowfall: ObservationSeries::from_raw("snowfallAmount", properties.snowfall_amount)?,
        })
    }
}

impl GridpointSeries {
    pub fn sample(&self, target: PrimitiveDateTime) -> AirportWeather {
        AirportWeather {
            precipitation: nearest_observation(&self.precipitation, target),
            wind_speed: nearest_observation(&self.wind_speed, target),
            snowfall: nearest_observation(&self.snowfall, target),
        }
    }
}

/// Weather readings for one airport; `None` means absent and is scored as 0
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AirportWeather {
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub snowfall: Option<f64>,
}

/// `validTime` is `<RFC 3339 instant>/<ISO 8601 duration>`; only the instant is used.
///
/// The offset is dropped so the instant compares against the requested
/// wall-clock departure time.
pub fn parse_valid_time(valid_time: &str) -> Result<PrimitiveDateTime, ForecastError> {
    let instant = valid_time.split('/').next().unwrap_or(valid_time);
    let parsed = OffsetDateTime::parse(instant, &Rfc3339)
        .map_err(|e| ForecastError::Schema(format!("invalid validTime {}: {}", valid_time, e)))?;
    Ok(PrimitiveDateTime::new(parsed.date(), parsed.time()))
}

/// Value whose validity start is closest to `target`.
///
/// Ties keep the entry seen first. An empty series, or a closest entry with a
/// null value, yields `None`.
pub fn nearest_observation(series: &ObservationSeries, target: PrimitiveDateTime) -> Option<f64> {
    let mut closest_value = None;
    let mut min_time_diff = Duration::MAX;

    for observation in &series.observations {
        let time_diff = (observation.valid_from - target).abs();
        if time_diff < min_time_diff {
            min_time_diff = time_diff;
            closest_value = observation.value;
        }
    }

    closest_value
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Resolve a coordinate to the forecast grid cell covering it
    async fn fetch_forecast(&self, latitude: f64, longitude: f64)
        -> Result<GridPoint, ForecastError>;

    async fn fetch_gridpoint_data(&self, grid: &GridPoint)
        -> Result<GridpointSeries, ForecastError>;
}

/// Fetch one airport's series and pick the readings closest to `target`
pub async fn sample_airport_weather(
    source: &dyn WeatherSource,
    latitude: f64,
    longitude: f64,
    target: PrimitiveDateTime,
) -> Result<AirportWeather, ForecastError> {
    let grid = source.fetch_forecast(latitude, longitude).await?;
    let series = source.fetch_gridpoint_data(&grid).await?;
    Ok(series.sample(target))
}

/// [`WeatherSource`] backed by the api.weather.gov JSON endpoints
pub struct NoaaWeatherService {
    pub logger: Logger,
    pub fetcher: Arc<JsonFetcher>,
    pub base_url: String,
}

impl NoaaWeatherService {
    pub fn new(logger: Logger, fetcher: Arc<JsonFetcher>, base_url: &str) -> Self {
        NoaaWeatherService {
            logger,
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn points_url(&self, latitude: f64, longitude: f64) -> String {
        format!("{}/points/{:.4},{:.4}", self.base_url, latitude, longitude)
    }

    pub fn gridpoint_url(&self, grid: &GridPoint) -> String {
        format!(
            "{}/gridpoints/{}/{},{}",
            self.base_url, grid.grid_id, grid.grid_x, grid.grid_y
        )
    }
}

#[async_trait]
impl WeatherSource for NoaaWeatherService {
    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GridPoint, ForecastError> {
        let url = self.points_url(latitude, longitude);
        let raw: PointsResponse = self.fetcher.fetch_json(&url).await?;
        let grid = GridPoint::try_from(raw)?;
        debug!(
            self.logger,
            "grid point for {:.4},{:.4}: {}/{},{}",
            latitude,
            longitude,
            grid.grid_id,
            grid.grid_x,
            grid.grid_y
        );
        Ok(grid)
    }

    async fn fetch_gridpoint_data(
        &self,
        grid: &GridPoint,
    ) -> Result<GridpointSeries, ForecastError> {
        let url = self.gridpoint_url(grid);
        let raw: GridpointResponse = self.fetcher.fetch_json(&url).await?;
        let series = GridpointSeries::try_from(raw)?;
        debug!(
            self.logger,
            "gridpoint {} values: precipitation {}, wind {}, snow {}",
            grid.grid_id,
            series.precipitation.observations.len(),
            series.wind_speed.observations.len(),
            series.snowfall.observations.len()
        );
        Ok(series)
    }
}
