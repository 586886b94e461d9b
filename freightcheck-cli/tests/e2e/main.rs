//! E2E tests for the freightcheck scenarios.
//!
//! Every scenario runs end to end through the real clients against a
//! scripted `MockTransport`, so login, correlation and polling behave as
//! they would against the live API.
//!
//! # Test Structure
//!
//! - `helpers/` -- Scripted API responses and environment builders
//! - `scenarios/` -- One file per scenario, plus shared auth failures
//!
//! # Running
//!
//! ```bash
//! cargo test -p freightcheck-cli --test e2e
//! ```

mod helpers;
mod scenarios;
