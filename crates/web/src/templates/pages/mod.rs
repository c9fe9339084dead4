mod error;
mod predict;

pub use error::error_page;
pub use predict::{predict_page, FormOptions};
