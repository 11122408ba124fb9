//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod alerts;
pub mod budgets;
pub mod calculators;
pub mod expenses;
pub mod gamification;
pub mod planner;

// Re-export all handlers for use in router
pub use alerts::*;
pub use budgets::*;
pub use calculators::*;
pub use expenses::*;
pub use gamification::*;
pub use planner::*;
