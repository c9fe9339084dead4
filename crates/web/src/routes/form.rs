use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use predictor::{predict_delay, FlightRequest, PredictionOutcome};
use serde::Deserialize;
use slog::{error, warn};
use time::OffsetDateTime;

use crate::{
    templates::{error_page, predict_page, FormOptions, ResultPanel},
    AppState,
};

/// Raw form submission; validated into a `FlightRequest`.
/// Missing fields arrive empty so validation reports them on the page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlightForm {
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub departure: String,
}

/// Handler for the form page (GET /)
pub async fn form_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let today = OffsetDateTime::now_utc().date();
    let options = FormOptions::new(&state.context, today);
    Html(predict_page(&options, &FlightForm::default(), None).into_string())
}

/// Handler for a submitted form (POST /predict)
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FlightForm>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();
    let options = FormOptions::new(&state.context, today);

    let request = match FlightRequest::parse(
        &form.airline,
        &form.origin,
        &form.destination,
        &form.date,
        &form.departure,
        today,
    ) {
        Ok(request) => request,
        Err(e) => {
            warn!(state.logger, "rejected form input: {}", e);
            let panel = ResultPanel::InvalidInput(e.to_string());
            return Html(predict_page(&options, &form, Some(&panel)).into_string()).into_response();
        }
    };

    let panel = match predict_delay(&state.context, &request).await {
        Ok(PredictionOutcome::RouteNotFound) => ResultPanel::RouteNotFound,
        Ok(PredictionOutcome::Scored(prediction)) => ResultPanel::Scored(prediction),
        Err(e) => {
            error!(state.logger, "prediction failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(error_page(&e.to_string()).into_string()),
            )
                .into_response();
        }
    };

    Html(predict_page(&options, &form, Some(&panel)).into_string()).into_response()
}
