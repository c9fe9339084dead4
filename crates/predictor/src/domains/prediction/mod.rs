mod predict_delay;

pub use predict_delay::*;
