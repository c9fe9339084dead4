use maud::{html, Markup};
use predictor::{DelayPrediction, ROUTE_NOT_FOUND_MESSAGE};

use crate::templates::fragments::{model_inputs, weather_table};

/// What the page shows under the form after a submission
pub enum ResultPanel {
    InvalidInput(String),
    RouteNotFound,
    Scored(DelayPrediction),
}

pub fn prediction_result(panel: &ResultPanel) -> Markup {
    html! {
        div class="box" id="prediction-result" {
            @match panel {
                ResultPanel::InvalidInput(message) => {
                    div class="notification is-warning" { (message) }
                }
                ResultPanel::RouteNotFound => {
                    div class="notification is-danger" { (ROUTE_NOT_FOUND_MESSAGE) }
                }
                ResultPanel::Scored(prediction) => {
                    @for advisory in &prediction.advisories {
                        div class="notification is-warning is-light" { (advisory) }
                    }
                    p class="title is-4" { (prediction.summary()) }
                    @if prediction.shows_weather() {
                        (weather_table(prediction))
                    }
                    (model_inputs(&prediction.features))
                }
            }
        }
    }
}
