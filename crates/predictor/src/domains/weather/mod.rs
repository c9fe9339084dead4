mod gridpoint_weather;

pub use gridpoint_weather::*;
