mod form;

pub use form::{form_handler, predict_handler, FlightForm};
