// Source Schema Adapters
//
// Conversions from external schema representations into `TableSchema`.

pub mod arrow;
