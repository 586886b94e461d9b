//! Shared E2E test helpers.

pub mod env;
pub mod mock_api;
