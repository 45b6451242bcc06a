//! Core types for the pasplag plagiarism detector.
//!
//! Provides the engine configuration ([`config::EngineConfig`]), the error
//! taxonomy ([`error::AnalysisError`]), and the JSON report schema consumed
//! by external callers ([`report::PlagiarismResult`]).

pub mod config;
pub mod error;
pub mod report;
