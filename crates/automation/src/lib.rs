//! Execution orchestration for Support Automation Workflow runbooks.
//!
//! Launches a runbook on the remote automation engine, polls it to a
//! terminal status under a deadline, and hands the result to the core
//! extractor. [`troubleshooter::Troubleshooter`] is the single entry point.

pub mod engine;
pub mod launcher;
pub mod poller;
pub mod ssm;
pub mod troubleshooter;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
