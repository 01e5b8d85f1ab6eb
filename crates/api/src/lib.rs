//! HTTP surface for the Support Automation Workflow troubleshooter.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! Bedrock Agent adapter) so integration tests and the binary entrypoint
//! can both access them.

pub mod bedrock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
