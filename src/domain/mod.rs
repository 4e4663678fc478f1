//! Domain layer for NCM Report
//!
//! CDD Principle: Domain Model - Pure business logic for compliance reporting
//! - Contains the record, violation, and error types shared by all stages
//! - Independent of infrastructure concerns like the data source or file system
//! - Expresses the ubiquitous language of device compliance evaluation

pub mod records;

// Re-export main domain types for convenience
pub use records::*;
