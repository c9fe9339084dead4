mod feature_vector;
mod flight_inputs;

pub use feature_vector::*;
pub use flight_inputs::*;
