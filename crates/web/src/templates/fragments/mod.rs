mod model_inputs;
mod prediction_result;
mod weather_table;

pub use model_inputs::model_inputs;
pub use prediction_result::{prediction_result, ResultPanel};
pub use weather_table::weather_table;
