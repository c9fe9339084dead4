use maud::{html, Markup};
use predictor::{travel_date_window, AppContext, Airline, DepartureSlot, AIRLINES};
use time::Date;

use crate::{
    templates::{fragments::prediction_result, layouts::base, ResultPanel},
    FlightForm,
};

/// Choices offered by the form
pub struct FormOptions {
    pub airlines: &'static [Airline],
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub first_date: Date,
    pub last_date: Date,
    pub departures: Vec<String>,
}

impl FormOptions {
    pub fn new(context: &AppContext, today: Date) -> Self {
        let (first_date, last_date) = travel_date_window(today);
        FormOptions {
            airlines: &AIRLINES,
            origins: context.routes.origin_codes().to_vec(),
            destinations: context.routes.destination_codes().to_vec(),
            first_date,
            last_date,
            departures: DepartureSlot::all().map(|slot| slot.to_string()).collect(),
        }
    }
}

/// The form, followed by the result of the last submission if there was one
pub fn predict_page(options: &FormOptions, form: &FlightForm, panel: Option<&ResultPanel>) -> Markup {
    base(
        "Flight Delay Predictor",
        html! {
            (flight_form(options, form))
            @if let Some(panel) = panel {
                div class="mt-4" {
                    (prediction_result(panel))
                }
            }
        },
    )
}

fn flight_form(options: &FormOptions, form: &FlightForm) -> Markup {
    let date = if form.date.is_empty() {
        options.first_date.to_string()
    } else {
        form.date.clone()
    };

    html! {
        form class="box" method="post" action="/predict" {
            div class="columns is-multiline" {
                div class="column is-4" {
                    div class="field" {
                        label class="label" for="airline" { "Airline" }
                        div class="select is-fullwidth" {
                            select id="airline" name="airline" {
                                @for airline in options.airlines {
                                    option value=(airline.name)
                                        selected[form.airline == airline.name || form.airline == airline.code] {
                                        (airline.name)
                                    }
                                }
                            }
                        }
                    }
                }
                div class="column is-4" {
                    (code_select("origin", "Origin", &options.origins, &form.origin))
                }
                div class="column is-4" {
                    (code_select("destination", "Destination", &options.destinations, &form.destination))
                }
                div class="column is-4" {
                    div class="field" {
                        label class="label" for="date" { "Date" }
                        div class="control" {
                            input class="input" type="date" id="date" name="date"
                                min=(options.first_date) max=(options.last_date) value=(date) required;
                        }
                    }
                }
                div class="column is-4" {
                    (code_select("departure", "Departure time", &options.departures, &form.departure))
                }
            }
            div class="field" {
                div class="control" {
                    button class="button is-link" type="submit" { "Predict delay" }
                }
            }
        }
    }
}

fn code_select(name: &str, label: &str, choices: &[String], selected: &str) -> Markup {
    html! {
        div class="field" {
            label class="label" for=(name) { (label) }
            div class="select is-fullwidth" {
                select id=(name) name=(name) {
                    @for choice in choices {
                        option value=(choice) selected[choice == selected] { (choice) }
                    }
                }
            }
        }
    }
}
