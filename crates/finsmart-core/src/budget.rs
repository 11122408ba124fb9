//! Budget allocation and tracking
//!
//! A [`BudgetAllocator`] holds one limit per category, either split from a
//! total by weight or taken as absolute amounts, and keeps a running spend
//! per category. Category names match case-insensitively (ASCII), so an
//! expense filed under `food` counts against a `Food` budget.
//!
//! Remaining budget is always reported as the signed value `limit - spent`.
//! A negative remainder means the category is overspent; it is never an
//! error. Reports additionally carry `available` (floored at zero) and
//! `overspent` (the amount past the limit) so callers can display either.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{BudgetCategory, BudgetPeriod, ExpenseRecord};

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::invalid(format!(
                "date range ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// First to last day of the month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next_month
            .and_then(|d| d.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    /// Monday to Sunday of the week containing `date`
    pub fn week_of(date: NaiveDate) -> Self {
        let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    pub fn for_period(period: BudgetPeriod, date: NaiveDate) -> Self {
        match period {
            BudgetPeriod::Monthly => Self::month_of(date),
            BudgetPeriod::Weekly => Self::week_of(date),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the range, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Traffic-light status of a category by share of its limit used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealth {
    /// Under 70% used
    Good,
    /// 70% to under 90% used
    Warning,
    /// 90% or more used
    Alert,
}

impl BudgetHealth {
    pub fn from_percent(percent_used: f64) -> Self {
        if percent_used < 70.0 {
            Self::Good
        } else if percent_used < 90.0 {
            Self::Warning
        } else {
            Self::Alert
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Alert => "alert",
        }
    }
}

impl std::fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget vs. actual for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatus {
    pub category: String,
    pub limit: f64,
    pub spent: f64,
    /// `limit - spent`, negative when overspent
    pub remaining: f64,
    /// `remaining` floored at zero
    pub available: f64,
    /// Amount spent past the limit, zero when within budget
    pub overspent: f64,
    pub percent_used: f64,
    pub health: BudgetHealth,
}

/// Totals across all budgeted categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_budget: f64,
    /// Includes spend in categories without a budget
    pub total_spent: f64,
    pub remaining: f64,
    pub remaining_percent: f64,
    pub percent_used: f64,
    /// Categories past 100% of their limit
    pub over_budget_count: usize,
    /// Categories between 80% and 100% of their limit
    pub warning_count: usize,
    /// Categories under 80% of their limit
    pub healthy_count: usize,
}

#[derive(Debug, Clone)]
struct Allocation {
    category: String,
    limit: f64,
    period: BudgetPeriod,
    spent: f64,
}

fn same_category(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Per-category limits with running spend
#[derive(Debug, Clone, Default)]
pub struct BudgetAllocator {
    allocations: Vec<Allocation>,
    unbudgeted: BTreeMap<String, f64>,
}

impl BudgetAllocator {
    /// Split `total` across categories proportionally to their weights.
    ///
    /// Weights need not sum to one; each limit is `total * w / Σw`.
    pub fn from_weights<I, S>(total: f64, weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        if !total.is_finite() || total < 0.0 {
            return Err(Error::invalid(format!(
                "total budget must be zero or positive, got {}",
                total
            )));
        }

        let weights: Vec<(String, f64)> = weights.into_iter().map(|(c, w)| (c.into(), w)).collect();
        if weights.is_empty() {
            return Err(Error::invalid("at least one category weight is required"));
        }
        for (category, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(Error::invalid(format!(
                    "weight for {} must be zero or positive, got {}",
                    category, weight
                )));
            }
        }
        let weight_sum: f64 = weights.iter().map(|(_, w)| w).sum();
        if weight_sum <= 0.0 {
            return Err(Error::invalid("category weights must not all be zero"));
        }

        let mut allocator = Self::default();
        for (category, weight) in weights {
            allocator.push(category, total * weight / weight_sum, BudgetPeriod::Monthly)?;
        }
        debug!(total, categories = allocator.allocations.len(), "Allocated budget by weight");
        Ok(allocator)
    }

    /// Use each category's own limit
    pub fn from_limits(categories: &[BudgetCategory]) -> Result<Self> {
        let mut allocator = Self::default();
        for category in categories {
            category.validate()?;
            allocator.push(category.name.clone(), category.limit, category.period)?;
        }
        Ok(allocator)
    }

    fn push(&mut self, category: String, limit: f64, period: BudgetPeriod) -> Result<()> {
        if self.find(&category).is_some() {
            return Err(Error::invalid(format!("duplicate budget category: {}", category)));
        }
        self.allocations.push(Allocation {
            category,
            limit,
            period,
            spent: 0.0,
        });
        Ok(())
    }

    fn find(&self, category: &str) -> Option<&Allocation> {
        self.allocations
            .iter()
            .find(|a| same_category(&a.category, category))
    }

    /// Category names in allocation order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.allocations.iter().map(|a| a.category.as_str())
    }

    /// Sum of all limits
    pub fn total_budget(&self) -> f64 {
        self.allocations.iter().map(|a| a.limit).sum()
    }

    pub fn limit(&self, category: &str) -> Option<f64> {
        self.find(category).map(|a| a.limit)
    }

    /// Spend recorded against a category, budgeted or not
    pub fn spent(&self, category: &str) -> f64 {
        self.find(category)
            .map(|a| a.spent)
            .or_else(|| {
                self.unbudgeted
                    .iter()
                    .find(|(name, _)| same_category(name, category))
                    .map(|(_, spent)| *spent)
            })
            .unwrap_or(0.0)
    }

    /// `limit - spent` for a budgeted category; negative when overspent
    pub fn remaining(&self, category: &str) -> Option<f64> {
        self.find(category).map(|a| a.limit - a.spent)
    }

    /// Spend in categories that have no budget, keyed by the first spelling seen
    pub fn unbudgeted(&self) -> &BTreeMap<String, f64> {
        &self.unbudgeted
    }

    pub fn record_spend(&mut self, category: &str, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::invalid(format!(
                "spend amount must be zero or positive, got {}",
                amount
            )));
        }
        match self
            .allocations
            .iter_mut()
            .find(|a| same_category(&a.category, category))
        {
            Some(allocation) => allocation.spent += amount,
            None => {
                let key = self
                    .unbudgeted
                    .keys()
                    .find(|name| same_category(name, category))
                    .cloned()
                    .unwrap_or_else(|| category.to_string());
                *self.unbudgeted.entry(key).or_insert(0.0) += amount;
            }
        }
        Ok(())
    }

    /// Record every expense dated inside `range`; returns how many were applied
    pub fn apply_expenses(&mut self, expenses: &[ExpenseRecord], range: &DateRange) -> Result<usize> {
        let mut applied = 0;
        for expense in expenses.iter().filter(|e| range.contains(e.date)) {
            self.record_spend(&expense.category, expense.amount)?;
            applied += 1;
        }
        debug!(applied, from = %range.start, to = %range.end, "Applied expenses to budget");
        Ok(applied)
    }

    /// Allocator for `budgets` with each category's spend over its own
    /// current period (month or week containing `today`). Expenses in
    /// categories without a budget are counted for the current month.
    pub fn tracking(
        budgets: &[BudgetCategory],
        expenses: &[ExpenseRecord],
        today: NaiveDate,
    ) -> Result<Self> {
        let mut allocator = Self::from_limits(budgets)?;
        let month = DateRange::month_of(today);

        for expense in expenses {
            let range = budgets
                .iter()
                .find(|b| same_category(&b.name, &expense.category))
                .map(|b| DateRange::for_period(b.period, today))
                .unwrap_or(month);
            if range.contains(expense.date) {
                allocator.record_spend(&expense.category, expense.amount)?;
            }
        }
        Ok(allocator)
    }

    /// Budget vs. actual for every category with a positive limit
    pub fn status(&self) -> Vec<CategoryStatus> {
        self.allocations
            .iter()
            .filter(|a| a.limit > 0.0)
            .map(|a| {
                let remaining = a.limit - a.spent;
                let percent_used = a.spent / a.limit * 100.0;
                CategoryStatus {
                    category: a.category.clone(),
                    limit: a.limit,
                    spent: a.spent,
                    remaining,
                    available: remaining.max(0.0),
                    overspent: (-remaining).max(0.0),
                    percent_used,
                    health: BudgetHealth::from_percent(percent_used),
                }
            })
            .collect()
    }

    pub fn summary(&self) -> BudgetSummary {
        let statuses = self.status();
        let total_budget = self.total_budget();
        let total_spent = self.allocations.iter().map(|a| a.spent).sum::<f64>()
            + self.unbudgeted.values().sum::<f64>();
        let remaining = total_budget - total_spent;
        let (remaining_percent, percent_used) = if total_budget > 0.0 {
            (remaining / total_budget * 100.0, total_spent / total_budget * 100.0)
        } else {
            (0.0, 0.0)
        };

        BudgetSummary {
            total_budget,
            total_spent,
            remaining,
            remaining_percent,
            percent_used,
            over_budget_count: statuses.iter().filter(|s| s.percent_used > 100.0).count(),
            warning_count: statuses
                .iter()
                .filter(|s| (80.0..=100.0).contains(&s.percent_used))
                .count(),
            healthy_count: statuses.iter().filter(|s| s.percent_used < 80.0).count(),
        }
    }

    /// Pace of the month containing `today`.
    ///
    /// Only monthly budgets count towards the budget; weekly limits and
    /// their spend cover a different window and are left out. Spend without
    /// a budget is month-scoped and always counts.
    pub fn monthly_pace(&self, today: NaiveDate) -> SpendingPace {
        let monthly = self
            .allocations
            .iter()
            .filter(|a| a.period == BudgetPeriod::Monthly);
        let (budget, spent) = monthly.fold((0.0, 0.0), |(budget, spent), a| {
            (budget + a.limit, spent + a.spent)
        });
        let spent = spent + self.unbudgeted.values().sum::<f64>();
        spending_pace(spent, budget, &DateRange::month_of(today), today)
    }

    /// Budgeted categories whose spend is still below the limit
    pub fn under_budget_categories(&self) -> Vec<&str> {
        self.allocations
            .iter()
            .filter(|a| a.limit > 0.0 && a.spent < a.limit)
            .map(|a| a.category.as_str())
            .collect()
    }
}

/// How spending keeps up with the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceStatus {
    /// Spent share is more than 10 points ahead of elapsed days
    Overspending,
    OnTrack,
    /// Spent share is more than 10 points behind elapsed days
    Underspending,
    /// No budget to compare against
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendingPace {
    pub spent_percent: f64,
    pub days_elapsed_percent: f64,
    pub remaining_days: i64,
    /// Budget left per remaining day (zero when the period is over)
    pub daily_remaining: f64,
    pub status: PaceStatus,
}

/// Compare the share of `budget` spent with the share of `range` elapsed on `today`
pub fn spending_pace(spent: f64, budget: f64, range: &DateRange, today: NaiveDate) -> SpendingPace {
    if budget <= 0.0 || !budget.is_finite() {
        return SpendingPace {
            spent_percent: 0.0,
            days_elapsed_percent: 0.0,
            remaining_days: 0,
            daily_remaining: 0.0,
            status: PaceStatus::NoData,
        };
    }

    let total_days = range.days();
    let days_elapsed = if today > range.end {
        total_days
    } else if today < range.start {
        0
    } else {
        (today - range.start).num_days() + 1
    };

    let spent_percent = spent / budget * 100.0;
    let days_elapsed_percent = days_elapsed as f64 / total_days as f64 * 100.0;
    let remaining_days = total_days - days_elapsed;
    let daily_remaining = if remaining_days > 0 {
        (budget - spent) / remaining_days as f64
    } else {
        0.0
    };

    let status = if spent_percent > days_elapsed_percent + 10.0 {
        PaceStatus::Overspending
    } else if spent_percent < days_elapsed_percent - 10.0 {
        PaceStatus::Underspending
    } else {
        PaceStatus::OnTrack
    };

    SpendingPace {
        spent_percent,
        days_elapsed_percent,
        remaining_days,
        daily_remaining,
        status,
    }
}
