//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `EngineState`: whether the crawl loop is still running
//! - `VisitOutcome`: what happened to one visited URL
//! - `VisitedPage` / `VisitFailure`: per-URL entries kept in the crawl report

mod visit;

pub use visit::{EngineState, VisitFailure, VisitOutcome, VisitedPage};
