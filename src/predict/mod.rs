//! Prediction
//!
//! Build prompts from match data, send them to the model and shape the reply.

pub mod inference;
pub mod prompt;
pub mod response;

pub use inference::{format_prediction, Prediction, Predictor};
pub use prompt::ManualMatch;
