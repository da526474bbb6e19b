//! Data layer for LinkedIn Insights.
//!
//! Reads a LinkedIn data export, cleans and canonicalizes the contacts,
//! aggregates them, builds the contact networks and runs the top-level
//! analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod canonicalizer;
pub mod chats;
pub mod cleaner;
pub mod graph;
pub mod hierarchy;
pub mod insights;
pub mod keywords;
pub mod reader;

pub use insights_core as core;
