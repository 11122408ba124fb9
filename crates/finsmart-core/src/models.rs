//! Domain models for FinSmart

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A logged expense. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    /// Always positive
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}

/// An expense to be logged (before the store assigns an id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}

impl NewExpense {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        amount: f64,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            category: category.into(),
            amount,
            note: note.into(),
        }
    }

    /// Check the entry before it is handed to a store
    pub fn validate(&self) -> crate::Result<()> {
        if self.category.trim().is_empty() {
            return Err(crate::Error::invalid("expense category must not be empty"));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(crate::Error::invalid(format!(
                "expense amount must be greater than zero, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// How often a budget resets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Weekly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "weekly" | "week" => Ok(Self::Weekly),
            _ => Err(format!("Unknown budget period: {}", s)),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub name: String,
    /// Never negative
    pub limit: f64,
    #[serde(default)]
    pub period: BudgetPeriod,
}

impl BudgetCategory {
    pub fn new(name: impl Into<String>, limit: f64, period: BudgetPeriod) -> crate::Result<Self> {
        let budget = Self {
            name: name.into(),
            limit,
            period,
        };
        budget.validate()?;
        Ok(budget)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::invalid("budget category name must not be empty"));
        }
        if !self.limit.is_finite() || self.limit < 0.0 {
            return Err(crate::Error::invalid(format!(
                "budget limit for {} must be >= 0, got {}",
                self.name, self.limit
            )));
        }
        Ok(())
    }
}

/// Parameters for an investment projection.
///
/// `step_up_rate` switches a SIP plan to a step-up SIP. A plan with no monthly
/// contribution is projected as a lumpsum. `inflation_rate` only affects the
/// inflation-adjusted figures of the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPlan {
    #[serde(default)]
    pub principal: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    /// Fraction, e.g. 0.12 for 12%
    pub annual_rate: f64,
    pub years: u32,
    #[serde(default)]
    pub step_up_rate: Option<f64>,
    /// Fraction; no inflation adjustment when zero
    #[serde(default)]
    pub inflation_rate: f64,
}

/// The investment calculators a user can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    Sip,
    Lumpsum,
    Goal,
    StepUp,
    Retirement,
}

impl CalculatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sip => "sip",
            Self::Lumpsum => "lumpsum",
            Self::Goal => "goal",
            Self::StepUp => "step_up",
            Self::Retirement => "retirement",
        }
    }
}

impl std::str::FromStr for CalculatorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sip" => Ok(Self::Sip),
            "lumpsum" => Ok(Self::Lumpsum),
            "goal" => Ok(Self::Goal),
            "step_up" | "stepup" | "step-up" => Ok(Self::StepUp),
            "retirement" => Ok(Self::Retirement),
            _ => Err(format!("Unknown calculator: {}", s)),
        }
    }
}

impl std::fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Report formats handed to the export collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Pdf => "pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            "pdf" => Ok(Self::Pdf),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Something the user did, as recorded in the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityKind {
    Login,
    ExpenseLogged { category: String },
    BudgetSet { category: String },
    CalculatorUsed { calculator: CalculatorKind },
    ChartViewed,
    Exported { format: ExportFormat },
    AlertConfigured { category: String },
    StayedUnderBudget { category: String },
}

/// One entry of the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: ActivityKind,
}

impl Activity {
    pub fn new(date: NaiveDate, kind: ActivityKind) -> Self {
        Self { date, kind }
    }
}
