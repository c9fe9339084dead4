use maud::{html, Markup};
use predictor::DelayPrediction;

/// Readings the classifier saw at both ends of the route
pub fn weather_table(prediction: &DelayPrediction) -> Markup {
    html! {
        div class="table-container mt-4" {
            table class="table is-fullwidth is-striped" {
                thead {
                    tr {
                        th { "Weather" }
                        th class="has-text-right" { (prediction.origin) }
                        th class="has-text-right" { (prediction.destination) }
                    }
                }
                tbody {
                    @for (reading, origin, destination) in prediction.weather_rows() {
                        tr {
                            td { (reading) }
                            td class="has-text-right" { (format!("{:.2}", origin)) }
                            td class="has-text-right" { (format!("{:.2}", destination)) }
                        }
                    }
                }
            }
        }
    }
}
