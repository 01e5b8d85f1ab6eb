//! Domain core for the Support Automation Workflow troubleshooter.
//!
//! Holds the request/execution/report types, the error taxonomy, the
//! scenario table, and the two pure stages of a troubleshooting run:
//! parameter binding and result extraction. Nothing here performs I/O.

pub mod binder;
pub mod error;
pub mod extractor;
pub mod inspect;
pub mod report;
pub mod scenario;
pub mod types;
