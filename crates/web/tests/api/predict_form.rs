use crate::helpers::{calm_weather, form_body, spawn_app, MockWeather, StubClassifier};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use predictor::{ForecastError, GridPoint};
use time::{Date, Duration, OffsetDateTime};
use tower::ServiceExt;

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Stays inside the booking window even if the handler sees the next UTC day
fn travel_day() -> Date {
    today() + Duration::days(1)
}

fn predict_request(body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn html(response: Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn no_weather_calls() -> MockWeather {
    let mut weather = MockWeather::new();
    weather.expect_fetch_forecast().never();
    weather.expect_fetch_gridpoint_data().never();
    weather
}

#[tokio::test]
async fn form_offers_the_supported_choices() {
    let test_app = spawn_app(no_weather_calls(), StubClassifier::Probability(0.1));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let html = html(response).await;

    assert!(html.contains("Southwest Airlines"));
    assert!(html.contains(r#"value="ORD""#));
    assert!(html.contains(r#"value="23:00""#));
    assert!(!html.contains(r#"value="03:00""#));
    let first_date = [today() - Duration::days(1), today()]
        .iter()
        .any(|day| html.contains(&format!(r#"min="{}""#, day)));
    assert!(first_date);
    assert!(!html.contains("prediction-result"));
}

#[tokio::test]
async fn unknown_route_shows_message_without_fetching_weather() {
    let test_app = spawn_app(no_weather_calls(), StubClassifier::Probability(0.9));

    let body = form_body("Delta Air Lines", "LAX", "ORD", travel_day(), "08:00");
    let response = test_app
        .app
        .clone()
        .oneshot(predict_request(body))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let html = html(response).await;
    assert!(html.contains("This Route Doesn"));
    assert!(html.contains("Please Enter Again :("));
    assert!(!html.contains("The probability of flight delay is"));
}

#[tokio::test]
async fn likely_delay_shows_probability_and_weather() {
    let date = travel_day();
    let test_app = spawn_app(calm_weather(date, 2), StubClassifier::Probability(0.73));

    let body = form_body("Delta Air Lines", "JFK", "LAX", date, "08:00");
    let response = test_app
        .app
        .clone()
        .oneshot(predict_request(body))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let html = html(response).await;
    assert!(html.contains("The probability of flight delay is: 73.00%"));
    assert!(html.contains("Wind speed"));
    assert!(html.contains("12.00"));
    assert!(html.contains("Airline_DL"));
    // previous selections are kept
    assert!(html.contains(r#"<option value="08:00" selected>"#));
}

#[tokio::test]
async fn unlikely_delay_hides_weather() {
    let date = travel_day();
    let test_app = spawn_app(calm_weather(date, 2), StubClassifier::Probability(0.2));

    let body = form_body("DL", "JFK", "LAX", date, "08:00");
    let response = test_app
        .app
        .clone()
        .oneshot(predict_request(body))
        .await
        .expect("Failed to execute request.");

    let html = html(response).await;
    assert!(html.contains("The probability of flight delay is: 20.00%"));
    assert!(!html.contains("Wind speed"));
}

#[tokio::test]
async fn unreachable_weather_service_degrades_with_advisory() {
    let mut weather = MockWeather::new();
    weather.expect_fetch_forecast().times(2).returning(|lat, _| {
        if lat > 40.0 {
            Err(ForecastError::Transport {
                url: String::from("https://api.weather.gov/points/40.6398,-73.7789"),
                reason: String::from("status 503 Service Unavailable"),
            })
        } else {
            Ok(GridPoint {
                grid_id: String::from("LOX"),
                grid_x: 148,
                grid_y: 41,
            })
        }
    });
    weather
        .expect_fetch_gridpoint_data()
        .times(1)
        .returning(|_| Ok(Default::default()));

    let test_app = spawn_app(weather, StubClassifier::Probability(0.4));
    let body = form_body("Delta Air Lines", "JFK", "LAX", travel_day(), "08:00");
    let response = test_app
        .app
        .clone()
        .oneshot(predict_request(body))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let html = html(response).await;
    assert!(html.contains("Weather service unavailable for JFK"));
    assert!(html.contains("The probability of flight delay is: 40.00%"));
}

#[tokio::test]
async fn unsupported_departure_is_rejected_before_any_call() {
    let test_app = spawn_app(no_weather_calls(), StubClassifier::Probability(0.9));

    let body = form_body("Delta Air Lines", "JFK", "LAX", travel_day(), "03:00");
    let response = test_app
        .app
        .clone()
        .oneshot(predict_request(body))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let html = html(response).await;
    assert!(html.contains("Departure time 03:00 is not offered"));
}

#[tokio::test]
async fn classifier_schema_drift_is_a_server_error() {
    let date = travel_day();
    let test_app = spawn_app(calm_weather(date, 2), StubClassifier::Drift);

    let body = form_body("Delta Air Lines", "JFK", "LAX", date, "08:00");
    let response = test_app
        .app
        .clone()
        .oneshot(predict_request(body))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = html(response).await;
    assert!(html.contains("The prediction could not be made."));
}

#[tokio::test]
async fn missing_date_is_reported_on_the_form() {
    let test_app = spawn_app(no_weather_calls(), StubClassifier::Probability(0.9));

    let body = String::from("airline=Delta+Air+Lines&origin=JFK&destination=LAX&departure=08%3A00");
    let response = test_app
        .app
        .clone()
        .oneshot(predict_request(body))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let html = html(response).await;
    assert!(html.contains("Invalid date"));
    assert!(html.contains(r#"<option value="JFK" selected>"#));
}

#[tokio::test]
async fn missing_destination_finds_no_route() {
    let test_app = spawn_app(no_weather_calls(), StubClassifier::Probability(0.9));

    let body = format!(
        "airline=Delta+Air+Lines&origin=JFK&date={}&departure=08%3A00",
        travel_day()
    );
    let response = test_app
        .app
        .clone()
        .oneshot(predict_request(body))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let html = html(response).await;
    assert!(html.contains("Please Enter Again :("));
}
