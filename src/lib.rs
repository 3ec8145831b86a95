// Yuqing: public-opinion risk detection for social media posts
//
// This is the library root. Each module corresponds to a stage of the
// classification pipeline or to the event log that sits behind it.

pub mod config;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod sentiment;
pub mod store;
pub mod temporal;
pub mod text;

#[cfg(feature = "web")]
pub mod web;
