//! Shared building blocks for LinkedIn Insights.
//!
//! Record models, the error type, string similarity scoring, text
//! normalization, timezone handling and CLI settings.

pub mod error;
pub mod models;
pub mod settings;
pub mod similarity;
pub mod text_processing;
pub mod time_utils;
