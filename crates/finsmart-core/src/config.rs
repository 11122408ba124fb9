//! Settings
//!
//! Defaults are embedded from `config/finsmart.toml`. A user file replaces
//! individual keys: either an explicit path or
//! `<data dir>/finsmart/config.toml` when it exists.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::BudgetCategory;
use crate::planner::DEFAULT_CUSTOM_TOLERANCE;

/// Default settings, embedded at compile time
const DEFAULT_CONFIG: &str = include_str!("../../../config/finsmart.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    pub enabled: bool,
    /// Fraction of the limit that triggers an alert
    pub threshold: f64,
    pub phone_number: Option<String>,
    pub default_country_code: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 0.8,
            phone_number: None,
            default_country_code: "+91".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSettings {
    pub custom_tolerance: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            custom_tolerance: DEFAULT_CUSTOM_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub currency: String,
    pub alerts: AlertSettings,
    pub planner: PlannerSettings,
    /// Budgets to start from when none are stored
    pub budgets: Vec<BudgetCategory>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "₹".to_string(),
            alerts: AlertSettings::default(),
            planner: PlannerSettings::default(),
            budgets: Vec::new(),
        }
    }
}

impl Settings {
    /// Built-in defaults only
    pub fn builtin() -> Result<Self> {
        parse_settings(DEFAULT_CONFIG, Settings::default())
    }

    /// Defaults overlaid with the user's file, if any.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = Self::builtin()?;

        let override_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::NotFound(format!("config file {}", p.display())));
                }
                Some(p.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        match override_path {
            Some(p) => {
                debug!(path = %p.display(), "Loading settings override");
                let content = fs::read_to_string(&p)?;
                parse_settings(&content, base)
            }
            None => Ok(base),
        }
    }

    /// `stored` budgets, or the configured defaults when nothing is stored yet
    pub fn effective_budgets(&self, stored: Vec<BudgetCategory>) -> Vec<BudgetCategory> {
        if stored.is_empty() {
            self.budgets.clone()
        } else {
            stored
        }
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.alerts.threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(Error::invalid(format!(
                "alerts.threshold must be greater than zero, got {}",
                threshold
            )));
        }
        let tolerance = self.planner.custom_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::invalid(format!(
                "planner.custom_tolerance must be zero or positive, got {}",
                tolerance
            )));
        }
        for budget in &self.budgets {
            budget.validate()?;
        }
        Ok(())
    }
}

/// User override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsmart").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSettings {
    currency: Option<String>,
    alerts: Option<RawAlerts>,
    planner: Option<RawPlanner>,
    budgets: Option<Vec<BudgetCategory>>,
}

#[derive(Debug, Deserialize)]
struct RawAlerts {
    enabled: Option<bool>,
    threshold: Option<f64>,
    phone_number: Option<String>,
    default_country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlanner {
    custom_tolerance: Option<f64>,
}

/// Parse `content` and apply every key it sets on top of `base`
fn parse_settings(content: &str, base: Settings) -> Result<Settings> {
    let raw: RawSettings = toml::from_str(content)?;
    let mut settings = base;

    if let Some(currency) = raw.currency {
        settings.currency = currency;
    }
    if let Some(alerts) = raw.alerts {
        if let Some(enabled) = alerts.enabled {
            settings.alerts.enabled = enabled;
        }
        if let Some(threshold) = alerts.threshold {
            settings.alerts.threshold = threshold;
        }
        if let Some(phone) = alerts.phone_number {
            settings.alerts.phone_number = Some(phone);
        }
        if let Some(code) = alerts.default_country_code {
            settings.alerts.default_country_code = code;
        }
    }
    if let Some(planner) = raw.planner {
        if let Some(tolerance) = planner.custom_tolerance {
            settings.planner.custom_tolerance = tolerance;
        }
    }
    if let Some(budgets) = raw.budgets {
        settings.budgets = budgets;
    }

    settings.validate()?;
    Ok(settings)
}
