//! Core library for ccquota: quota snapshots, local token aggregation, and
//! the dashboard state machine.

pub mod credentials;
pub mod dashboard;
pub mod tokens;
pub mod usage;
