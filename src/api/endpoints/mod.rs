//! API endpoint handlers.
//!
//! One module per resource. Handlers stay thin: decode the request, call
//! into the pipeline or tracking logic, encode the response.

pub mod health;
pub mod medications;
pub mod scans;
