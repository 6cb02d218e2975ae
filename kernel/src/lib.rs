// Delta Append Kernel
//
// Builds Delta Lake append commits from a typed column schema and wraps
// them in transaction notifications for downstream delivery.

pub mod adapters;
pub mod config;
pub mod invariants;
pub mod log;
pub mod notify;
pub mod pipeline;
pub mod schema;
