//! WAGERBOOK: parimutuel settlement engine with player ledger and titles.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod cli;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod storage;
pub mod types;
