//! codequal - maintainability scoring for Python source
//!
//! Extracts classes and functions with tree-sitter, derives size, Halstead
//! and McCabe metrics, classifies large-class / long-method smells with
//! gradient boosted trees and scores identifier names against a vocabulary
//! embedding index. See [`pipeline::ScoringPipeline`] for the end-to-end flow.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod metrics;
pub mod models;
pub mod naming;
pub mod parsers;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
