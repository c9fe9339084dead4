mod routes;
mod startup;
pub mod templates;
mod utils;

pub use routes::*;
pub use startup::*;
pub use utils::*;
