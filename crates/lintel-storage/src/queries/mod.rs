//! Tenant-scoped query modules, one per table family.

pub mod cycles;
pub mod elements;
pub mod exceptions;
pub mod issues;
pub mod matrix;
pub mod relationships;
pub mod rules;
pub mod scorecards;
