//! freightcheck CLI library.
//!
//! The binary in `main.rs` only parses arguments and wires the production
//! transport; everything it dispatches to lives here so it can be driven
//! against `MockTransport` in tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod scenarios;
