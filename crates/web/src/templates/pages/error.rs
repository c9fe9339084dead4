use maud::{html, Markup};

use crate::templates::layouts::base;

pub fn error_page(message: &str) -> Markup {
    base(
        "Flight Delay Predictor - Error",
        html! {
            div class="notification is-danger" {
                p class="has-text-weight-semibold" { "The prediction could not be made." }
                p { (message) }
            }
            a href="/" class="button is-light" { "Back to the form" }
        },
    )
}
