pub mod classifier;
pub mod features;
pub mod prediction;
pub mod routes;
pub mod weather;

pub use classifier::*;
pub use features::*;
pub use prediction::*;
pub use routes::*;
pub use weather::*;
