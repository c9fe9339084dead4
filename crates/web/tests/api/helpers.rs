use async_trait::async_trait;
use axum::Router;
use mockall::mock;
use predictor::{
    AppContext, ClassifierError, DelayClassifier, FeatureVector, ForecastError, GridPoint,
    GridpointSeries, Observation, ObservationSeries, RouteTable, SchemaMismatch, WeatherSource,
};
use slog::{o, Discard, Logger};
use std::sync::Arc;
use time::{Date, PrimitiveDateTime, Time};
use web::{app, AppState};

pub const ROUTES_CSV: &str = "\
Origin Airport Code,Dest Airport Code,Origin Latitude,Origin Longitude,Dest Latitude,Dest Longitude,Fly Distance
JFK,LAX,40.6398,-73.7789,33.9425,-118.4081,2475
LAX,JFK,33.9425,-118.4081,40.6398,-73.7789,2475
ORD,LAX,41.9786,-87.9048,33.9425,-118.4081,1744
";

mock! {
    pub Weather {}
    #[async_trait]
    impl WeatherSource for Weather {
        async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Result<GridPoint, ForecastError>;
        async fn fetch_gridpoint_data(&self, grid: &GridPoint) -> Result<GridpointSeries, ForecastError>;
    }
}

/// Classifier that answers with a fixed probability, or reports column drift
pub enum StubClassifier {
    Probability(f64),
    Drift,
}

impl DelayClassifier for StubClassifier {
    fn score(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        match self {
            StubClassifier::Probability(p) => Ok(*p),
            StubClassifier::Drift => Err(ClassifierError::Schema(SchemaMismatch::ColumnCount {
                expected: features.len() + 1,
                actual: features.len(),
            })),
        }
    }
}

pub struct TestApp {
    pub app: Router,
}

pub fn spawn_app(weather: MockWeather, classifier: StubClassifier) -> TestApp {
    let logger = Logger::root(Discard, o!());
    let routes = RouteTable::from_reader(ROUTES_CSV.as_bytes()).unwrap();
    let context = AppContext::new(routes, Arc::new(weather), Arc::new(classifier), logger.clone());
    TestApp {
        app: app(AppState { logger, context }),
    }
}

/// Weather source that answers every airport with the same calm forecast
pub fn calm_weather(date: Date, times: usize) -> MockWeather {
    let mut weather = MockWeather::new();
    weather.expect_fetch_forecast().times(times).returning(|_, _| {
        Ok(GridPoint {
            grid_id: String::from("OKX"),
            grid_x: 33,
            grid_y: 35,
        })
    });
    weather
        .expect_fetch_gridpoint_data()
        .times(times)
        .returning(move |_| Ok(calm_series(date)));
    weather
}

fn calm_series(date: Date) -> GridpointSeries {
    let at = |value: f64| ObservationSeries {
        observations: vec![Observation {
            valid_from: PrimitiveDateTime::new(date, Time::MIDNIGHT),
            value: Some(value),
        }],
    };
    GridpointSeries {
        precipitation: at(1.5),
        wind_speed: at(12.0),
        snowfall: at(0.0),
    }
}

pub fn form_body(airline: &str, origin: &str, destination: &str, date: Date, departure: &str) -> String {
    format!(
        "airline={}&origin={}&destination={}&date={}&departure={}",
        airline.replace(' ', "+"),
        origin,
        destination,
        date,
        departure.replace(':', "%3A")
    )
}
