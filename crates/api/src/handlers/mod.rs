//! Request handlers.
//!
//! Handlers validate the caller's JSON, hand a [`TroubleshootingRequest`]
//! to the shared troubleshooter and map errors via [`AppError`].
//!
//! [`TroubleshootingRequest`]: saw_core::types::TroubleshootingRequest
//! [`AppError`]: crate::error::AppError

pub mod scenarios;
pub mod troubleshoot;
