//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `alerts` - Budget alert check and delivery
//! - `budgets` - Budget set/remove/allocate/status
//! - `calc` - Investment calculators
//! - `expenses` - Expense logging and listing
//! - `game` - Gamification profile
//! - `plan` - Weekly spending planner
//! - `serve` - Web server command

pub mod alerts;
pub mod budgets;
pub mod calc;
pub mod expenses;
pub mod game;
pub mod plan;
pub mod serve;

// Re-export command functions for main.rs
pub use alerts::*;
pub use budgets::*;
pub use calc::*;
pub use expenses::*;
pub use game::*;
pub use plan::*;
pub use serve::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use finsmart_core::{Activity, ActivityKind, JsonFileStore, Store};
use tracing::debug;

/// Data file from `--data`, the platform data directory, or the working directory
pub fn resolve_data_path(data: Option<&Path>) -> PathBuf {
    data.map(Path::to_path_buf)
        .or_else(JsonFileStore::default_path)
        .unwrap_or_else(|| PathBuf::from("finsmart.json"))
}

pub fn open_store(path: &Path) -> Result<JsonFileStore> {
    JsonFileStore::open(path)
        .with_context(|| format!("Failed to open data file {}", path.display()))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Log today's login once; repeated runs on the same day add nothing
pub fn record_login(store: &dyn Store) -> Result<()> {
    let today = today();
    let already = store
        .activities()?
        .iter()
        .any(|a| a.date == today && a.kind == ActivityKind::Login);
    if !already {
        store.record_activity(Activity::new(today, ActivityKind::Login))?;
        debug!(%today, "Recorded daily login");
    }
    Ok(())
}

/// Parse a YYYY-MM-DD date, defaulting to today
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s)),
        None => Ok(today()),
    }
}

/// Parse a YYYY-MM month into its first day
pub fn parse_month(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", month))
}

/// Format an amount with the configured currency symbol
pub fn money(currency: &str, amount: f64) -> String {
    if amount < 0.0 {
        format!("-{}{:.2}", currency, -amount)
    } else {
        format!("{}{:.2}", currency, amount)
    }
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
