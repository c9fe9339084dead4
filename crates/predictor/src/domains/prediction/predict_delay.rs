use anyhow::anyhow;
use slog::{debug, error, info, warn, Logger};
use std::{path::PathBuf, sync::Arc, time::Duration as StdDuration};
use time::{Date, PrimitiveDateTime, Time};

use crate::{
    parse_travel_date, sample_airport_weather, Airline, AirportWeather, ClassifierError,
    DelayClassifier, DepartureSlot, FeatureSchema, FeatureVector, FlightSelection,
    GradientBoostedTrees, InputError, JsonFetcher, NoaaWeatherService, RouteTable,
    SchemaMismatch, WeatherSource,
};

pub const ROUTE_NOT_FOUND_MESSAGE: &str = "This Route Doesn't Exist. Please Enter Again :(";

/// Weather readings are shown alongside probabilities at or above this
pub const DELAY_THRESHOLD: f64 = 0.5;

#[derive(thiserror::Error, Debug)]
pub enum PredictionError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// What the user asked about
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRequest {
    pub airline: Airline,
    pub origin: String,
    pub destination: String,
    pub date: Date,
    pub departure: DepartureSlot,
}

impl FlightRequest {
    /// Validate raw form/CLI values against the offered choices
    pub fn parse(
        airline: &str,
        origin: &str,
        destination: &str,
        date: &str,
        departure: &str,
        today: Date,
    ) -> Result<Self, InputError> {
        Ok(FlightRequest {
            airline: Airline::lookup(airline)?,
            origin: origin.trim().to_uppercase(),
            destination: destination.trim().to_uppercase(),
            date: parse_travel_date(date, today)?,
            departure: departure.parse()?,
        })
    }

    /// Departure date and hour; compared against forecast interval starts
    pub fn target_instant(&self) -> PrimitiveDateTime {
        let time = Time::from_hms(self.departure.hour(), 0, 0).unwrap_or(Time::MIDNIGHT);
        PrimitiveDateTime::new(self.date, time)
    }

    pub fn selection(&self) -> FlightSelection {
        FlightSelection {
            airline: self.airline,
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            month: self.date.month(),
            weekday: self.date.weekday(),
            departure: self.departure,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelayPrediction {
    pub probability: f64,
    pub origin: String,
    pub destination: String,
    pub origin_weather: AirportWeather,
    pub destination_weather: AirportWeather,
    /// One entry per airport whose weather could not be fetched
    pub advisories: Vec<String>,
    pub features: FeatureVector,
}

impl DelayPrediction {
    pub fn shows_weather(&self) -> bool {
        self.probability >= DELAY_THRESHOLD
    }

    pub fn percentage(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }

    pub fn summary(&self) -> String {
        format!("The probability of flight delay is: {}", self.percentage())
    }

    /// (reading, origin, destination) as fed to the classifier
    pub fn weather_rows(&self) -> [(&'static str, f64, f64); 3] {
        let (origin, dest) = (&self.origin_weather, &self.destination_weather);
        [
            (
                "Wind speed (km/h)",
                origin.wind_speed.unwrap_or(0.0),
                dest.wind_speed.unwrap_or(0.0),
            ),
            (
                "Precipitation (mm)",
                origin.precipitation.unwrap_or(0.0),
                dest.precipitation.unwrap_or(0.0),
            ),
            (
                "Snowfall (mm)",
                origin.snowfall.unwrap_or(0.0),
                dest.snowfall.unwrap_or(0.0),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    RouteNotFound,
    Scored(DelayPrediction),
}

/// Where the long-lived inputs of a prediction come from
#[derive(Debug, Clone)]
pub struct ContextSettings {
    pub routes_file: PathBuf,
    pub model_file: PathBuf,
    pub weather_url: String,
    pub user_agent: String,
    pub request_timeout: Option<StdDuration>,
}

/// Read-only state shared by every prediction
pub struct AppContext {
    pub routes: RouteTable,
    pub schema: FeatureSchema,
    pub weather: Arc<dyn WeatherSource>,
    pub classifier: Arc<dyn DelayClassifier>,
    pub logger: Logger,
}

impl AppContext {
    pub fn new(
        routes: RouteTable,
        weather: Arc<dyn WeatherSource>,
        classifier: Arc<dyn DelayClassifier>,
        logger: Logger,
    ) -> Self {
        let schema = FeatureSchema::from_route_table(&routes);
        AppContext {
            routes,
            schema,
            weather,
            classifier,
            logger,
        }
    }
}

/// Load the reference table and model, and check they agree on the schema
pub fn build_app_context(
    settings: &ContextSettings,
    logger: Logger,
) -> Result<AppContext, anyhow::Error> {
    let routes = RouteTable::from_path(&settings.routes_file)
        .map_err(|e| anyhow!("error loading route table: {}", e))?;
    info!(
        logger,
        "loaded {} routes from {}",
        routes.len(),
        settings.routes_file.display()
    );

    let model = GradientBoostedTrees::load(&settings.model_file)
        .map_err(|e| anyhow!("error loading classifier: {}", e))?;
    let schema = FeatureSchema::from_route_table(&routes);
    model.check_schema(&schema).map_err(|e| {
        error!(logger, "classifier does not match route table: {}", e);
        anyhow!("classifier does not match route table: {}", e)
    })?;
    info!(
        logger,
        "loaded classifier with {} trees over {} features from {}",
        model.num_trees(),
        model.num_feature(),
        settings.model_file.display()
    );

    let fetcher = Arc::new(JsonFetcher::new(
        logger.clone(),
        &settings.user_agent,
        settings.request_timeout,
    )?);
    let weather = Arc::new(NoaaWeatherService::new(
        logger.clone(),
        fetcher,
        &settings.weather_url,
    ));

    Ok(AppContext {
        routes,
        schema,
        weather,
        classifier: Arc::new(model),
        logger,
    })
}

/// Resolve the route, sample both airports' weather, assemble the features and score them.
///
/// A missing route stops before any network or model call. Weather failures
/// degrade to zeroed readings plus an advisory; schema and classifier
/// failures are returned.
pub async fn predict_delay(
    ctx: &AppContext,
    request: &FlightRequest,
) -> Result<PredictionOutcome, PredictionError> {
    let Some(route) = ctx.routes.resolve(&request.origin, &request.destination) else {
        info!(
            ctx.logger,
            "no route {} -> {}", request.origin, request.destination
        );
        return Ok(PredictionOutcome::RouteNotFound);
    };

    let target = request.target_instant();
    let mut advisories = Vec::new();

    let origin_weather = airport_weather(
        ctx,
        &route.origin,
        route.origin_latitude,
        route.origin_longitude,
        target,
        &mut advisories,
    )
    .await;
    let destination_weather = airport_weather(
        ctx,
        &route.destination,
        route.destination_latitude,
        route.destination_longitude,
        target,
        &mut advisories,
    )
    .await;

    let features = ctx
        .schema
        .build(
            route,
            &request.selection(),
            &origin_weather,
            &destination_weather,
        )
        .map_err(|e| {
            error!(ctx.logger, "error building features: {}", e);
            e
        })?;
    debug!(
        ctx.logger,
        "features: {:?}",
        features.active().collect::<Vec<(&str, f64)>>()
    );

    let probability = ctx.classifier.score(&features).map_err(|e| {
        error!(ctx.logger, "error scoring features: {}", e);
        e
    })?;
    info!(
        ctx.logger,
        "{} {} -> {} on {} at {}: delay probability {:.4}",
        request.airline.code,
        route.origin,
        route.destination,
        request.date,
        request.departure,
        probability
    );

    Ok(PredictionOutcome::Scored(DelayPrediction {
        probability,
        origin: route.origin.clone(),
        destination: route.destination.clone(),
        origin_weather,
        destination_weather,
        advisories,
        features,
    }))
}

async fn airport_weather(
    ctx: &AppContext,
    airport: &str,
    latitude: f64,
    longitude: f64,
    target: PrimitiveDateTime,
    advisories: &mut Vec<String>,
) -> AirportWeather {
    match sample_airport_weather(ctx.weather.as_ref(), latitude, longitude, target).await {
        Ok(weather) => weather,
        Err(err) => {
            warn!(ctx.logger, "weather for {} unavailable: {}", airport, err);
            advisories.push(err.advisory(airport));
            AirportWeather::default()
        }
    }
}
