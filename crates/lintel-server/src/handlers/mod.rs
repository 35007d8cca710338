//! Route handlers, one module per resource.

pub mod cycles;
pub mod elements;
pub mod exceptions;
pub mod health;
pub mod issues;
pub mod matrix;
pub mod rules;
pub mod scorecards;
