//! Weekly spending planner
//!
//! Splits a weekly allowance into seven daily limits (Monday first).

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Tolerance used for custom amounts when the caller has no setting
pub const DEFAULT_CUSTOM_TOLERANCE: f64 = 0.01;

/// Tolerance, in percentage points, for percentage splits
pub const PERCENT_TOLERANCE: f64 = 0.1;

/// Relative slack for rounding error when summing daily amounts
const SUM_SLACK: f64 = 1e-12;

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// How the weekly total is spread over the days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Strategy {
    /// `total / 7` every day
    Equal,
    /// Relative weights, normalized by their sum
    Weighted([f64; 7]),
    /// Per-day percentages that must add up to 100
    Percentages([f64; 7]),
    /// Exact amounts that must add up to the weekly total
    Custom([f64; 7]),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Weighted(_) => "weighted",
            Self::Percentages(_) => "percentages",
            Self::Custom(_) => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAllocation {
    pub weekly_total: f64,
    pub strategy: Strategy,
    /// Monday..Sunday, summing to `weekly_total`
    pub per_day_amounts: [f64; 7],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayAmount {
    pub day: Weekday,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanInsights {
    pub average_daily: f64,
    pub highest_day: DayAmount,
    pub lowest_day: DayAmount,
}

impl WeeklyAllocation {
    pub fn days(&self) -> impl Iterator<Item = DayAmount> + '_ {
        WEEKDAYS
            .iter()
            .zip(self.per_day_amounts.iter())
            .map(|(&day, &amount)| DayAmount { day, amount })
    }

    pub fn amount_for(&self, day: Weekday) -> f64 {
        self.per_day_amounts[day.num_days_from_monday() as usize]
    }

    /// Average, highest and lowest day. Ties go to the earlier day.
    pub fn insights(&self) -> PlanInsights {
        let mut days = self.days();
        let first = days.next().unwrap_or(DayAmount {
            day: Weekday::Mon,
            amount: 0.0,
        });
        let (highest_day, lowest_day) = days.fold((first, first), |(hi, lo), d| {
            (
                if d.amount > hi.amount { d } else { hi },
                if d.amount < lo.amount { d } else { lo },
            )
        });
        PlanInsights {
            average_daily: self.weekly_total / 7.0,
            highest_day,
            lowest_day,
        }
    }
}

fn check_days(label: &str, values: &[f64; 7]) -> Result<()> {
    for (day, value) in WEEKDAYS.iter().zip(values) {
        if !value.is_finite() || *value < 0.0 {
            return Err(Error::invalid(format!(
                "{} for {} must be zero or positive, got {}",
                label, day, value
            )));
        }
    }
    Ok(())
}

/// Distributes weekly allowances
#[derive(Debug, Clone, Copy)]
pub struct WeeklyPlanner {
    custom_tolerance: f64,
}

impl Default for WeeklyPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl WeeklyPlanner {
    pub fn new() -> Self {
        Self {
            custom_tolerance: DEFAULT_CUSTOM_TOLERANCE,
        }
    }

    /// Use a different tolerance for custom amounts
    pub fn with_tolerance(custom_tolerance: f64) -> Self {
        Self {
            custom_tolerance: custom_tolerance.abs(),
        }
    }

    pub fn plan(&self, weekly_total: f64, strategy: Strategy) -> Result<WeeklyAllocation> {
        if !weekly_total.is_finite() || weekly_total < 0.0 {
            return Err(Error::invalid(format!(
                "weekly total must be zero or positive, got {}",
                weekly_total
            )));
        }

        let per_day_amounts = match &strategy {
            Strategy::Equal => [weekly_total / 7.0; 7],
            Strategy::Weighted(weights) => {
                check_days("weight", weights)?;
                let sum: f64 = weights.iter().sum();
                if sum <= 0.0 {
                    return Err(Error::invalid("day weights must not all be zero"));
                }
                weights.map(|w| weekly_total * w / sum)
            }
            Strategy::Percentages(percentages) => {
                check_days("percentage", percentages)?;
                let sum: f64 = percentages.iter().sum();
                if (sum - 100.0).abs() > PERCENT_TOLERANCE {
                    return Err(Error::invalid(format!(
                        "day percentages must add up to 100%, got {:.1}%",
                        sum
                    )));
                }
                percentages.map(|p| weekly_total * p / sum)
            }
            Strategy::Custom(amounts) => {
                check_days("amount", amounts)?;
                let sum: f64 = amounts.iter().sum();
                let slack = SUM_SLACK * weekly_total.max(1.0);
                if (sum - weekly_total).abs() > self.custom_tolerance + slack {
                    return Err(Error::invalid(format!(
                        "daily amounts add up to {:.2}, expected {:.2}",
                        sum, weekly_total
                    )));
                }
                *amounts
            }
        };

        debug!(weekly_total, strategy = strategy.name(), "Planned weekly spending");
        Ok(WeeklyAllocation {
            weekly_total,
            strategy,
            per_day_amounts,
        })
    }
}
