mod delay_classifier;
mod xgboost_model;

pub use delay_classifier::*;
pub use xgboost_model::*;
