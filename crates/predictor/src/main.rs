use anyhow::anyhow;
use predictor::{
    build_app_context, get_config_info, option_listing, predict_delay, setup_logger,
    DelayPrediction, FlightRequest, PredictionOutcome, RouteTable, ROUTE_NOT_FOUND_MESSAGE,
};
use slog::{error, info};
use time::OffsetDateTime;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let (cli, source) = get_config_info();
    let logger = setup_logger(cli.level.as_deref());
    let settings = cli.context_settings();

    info!(logger, "Flight delay predictor starting...");
    info!(logger, "  Config: {}", source);
    info!(logger, "  Routes: {}", settings.routes_file.display());
    info!(logger, "  Model: {}", settings.model_file.display());
    info!(logger, "  Weather service: {}", settings.weather_url);

    let today = OffsetDateTime::now_utc().date();

    // listing choices only needs the route table
    if cli.list_options {
        let routes = RouteTable::from_path(&settings.routes_file)
            .map_err(|e| anyhow!("error loading route table: {}", e))?;
        for line in option_listing(&routes, today) {
            println!("{}", line);
        }
        return Ok(());
    }

    let ctx = build_app_context(&settings, logger.clone())?;

    let required = |value: &Option<String>, flag: &str| {
        value
            .clone()
            .ok_or_else(|| anyhow!("missing --{} (or use --list-options)", flag))
    };
    let request = FlightRequest::parse(
        &required(&cli.airline, "airline")?,
        &required(&cli.origin, "origin")?,
        &required(&cli.destination, "destination")?,
        &required(&cli.date, "date")?,
        &required(&cli.departure, "departure")?,
        today,
    )?;

    match predict_delay(&ctx, &request).await {
        Ok(PredictionOutcome::RouteNotFound) => println!("{}", ROUTE_NOT_FOUND_MESSAGE),
        Ok(PredictionOutcome::Scored(prediction)) => print_prediction(&prediction),
        Err(err) => {
            error!(logger, "prediction failed: {}", err);
            return Err(err.into());
        }
    }
    Ok(())
}

fn print_prediction(prediction: &DelayPrediction) {
    for advisory in &prediction.advisories {
        println!("{}", advisory);
    }
    println!("{}", prediction.summary());

    if prediction.shows_weather() {
        println!();
        println!(
            "{:<14} {:>10} {:>10}",
            "", prediction.origin, prediction.destination
        );
        for (reading, origin, destination) in prediction.weather_rows() {
            println!("{:<14} {:>10.2} {:>10.2}", reading, origin, destination);
        }
    }
}
