mod summary;
pub mod views;

pub use summary::{AreaResult, SurveyReport};
