pub mod fragments;
pub mod layouts;
pub mod pages;

pub use fragments::{model_inputs, prediction_result, weather_table, ResultPanel};
pub use layouts::base;
pub use pages::{error_page, predict_page, FormOptions};
