use maud::{html, Markup};
use predictor::FeatureVector;

/// Collapsible list of the non-zero columns sent to the classifier
pub fn model_inputs(features: &FeatureVector) -> Markup {
    html! {
        details class="mt-4" {
            summary class="has-text-grey" { "Model inputs" }
            table class="table is-narrow mt-2" {
                tbody {
                    @for (column, value) in features.active() {
                        tr {
                            td { code { (column) } }
                            td class="has-text-right" { (value) }
                        }
                    }
                }
            }
        }
    }
}
