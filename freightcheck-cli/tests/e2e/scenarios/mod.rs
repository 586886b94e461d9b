//! E2E test scenarios, one module per scenario.

mod address_cargo;
mod auth_failure;
mod ftl_take;
mod invoice_status;
mod mass_orders;
mod replace_planned;
