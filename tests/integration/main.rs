//! Integration tests: end-to-end settlement scenarios and multi-market
//! ledger flows through the public API.

mod ledger_flow;
mod scenarios;
