//! Investment calculators
//!
//! Closed-form and month-by-month compound growth projections:
//! - Lumpsum: a single upfront investment compounding annually
//! - SIP: a fixed monthly contribution (ordinary annuity, monthly rate = annual / 12)
//! - Step-up SIP: a SIP whose contribution rises once a year
//! - Goal-based: the monthly contribution a SIP needs to reach a target
//! - Retirement corpus: inflation-adjusted expenses under the 4% withdrawal rule
//!
//! Projections also carry inflation-adjusted values: each nominal value is
//! divided by `(1 + inflation)^years` elapsed, which for a lumpsum equals
//! compounding at the real rate `(1 + r) / (1 + inflation) - 1`.
//!
//! All rates are fractions (`0.12` is 12%). Rates must be greater than -100%.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{CalculatorKind, InvestmentPlan};

/// Longest horizon accepted by the calculators (100 years)
pub const MAX_MONTHS: u32 = 1200;

/// Annual withdrawal rate assumed when sizing a retirement corpus
pub const SAFE_WITHDRAWAL_RATE: f64 = 0.04;

/// Below this a monthly rate is treated as zero (no growth)
const ZERO_RATE_EPSILON: f64 = 1e-12;

/// One row of a projection schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Month number (1-based) for SIP schedules, year number (0-based) for lumpsum
    pub period: u32,
    /// Amount paid in during this period
    pub contribution: f64,
    /// Cumulative amount paid in
    pub total_invested: f64,
    /// Value of the investment at the end of the period
    pub value: f64,
    /// `value` in today's money
    pub real_value: f64,
}

/// Invested vs. returned totals of a projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub invested: f64,
    pub future_value: f64,
    pub gains: f64,
    /// `future_value` in today's money
    pub real_value: f64,
    /// Annual return after inflation
    pub real_rate: f64,
}

impl ProjectionSummary {
    fn new(invested: f64, last: &ProjectionPoint, annual_rate: f64, inflation_rate: f64) -> Self {
        Self {
            invested,
            future_value: last.value,
            gains: last.value - invested,
            real_value: last.real_value,
            real_rate: (1.0 + annual_rate) / (1.0 + inflation_rate) - 1.0,
        }
    }
}

/// Full result of projecting an [`InvestmentPlan`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub calculator: CalculatorKind,
    pub summary: ProjectionSummary,
    pub schedule: Vec<ProjectionPoint>,
}

fn check_rate(name: &str, rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(Error::invalid(format!(
            "{} must be greater than -100%, got {}",
            name, rate
        )));
    }
    Ok(())
}

fn check_amount(name: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::invalid(format!(
            "{} must be zero or positive, got {}",
            name, amount
        )));
    }
    Ok(())
}

fn check_months(months: u32) -> Result<()> {
    if months == 0 {
        return Err(Error::invalid("duration must be at least one month"));
    }
    if months > MAX_MONTHS {
        return Err(Error::invalid(format!(
            "duration must be at most {} months, got {}",
            MAX_MONTHS, months
        )));
    }
    Ok(())
}

fn check_years(years: f64) -> Result<()> {
    if !years.is_finite() || years <= 0.0 {
        return Err(Error::invalid(format!(
            "duration must be greater than zero years, got {}",
            years
        )));
    }
    if years * 12.0 > MAX_MONTHS as f64 {
        return Err(Error::invalid(format!(
            "duration must be at most {} years, got {}",
            MAX_MONTHS / 12,
            years
        )));
    }
    Ok(())
}

fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 12.0
}

/// Annual return left after inflation: `(1 + r) / (1 + inflation) - 1`
pub fn real_rate(annual_rate: f64, inflation_rate: f64) -> Result<f64> {
    check_rate("annual rate", annual_rate)?;
    check_rate("inflation rate", inflation_rate)?;
    Ok((1.0 + annual_rate) / (1.0 + inflation_rate) - 1.0)
}

/// Amount needed after `years` to match `amount` of today's money
pub fn inflate(amount: f64, inflation_rate: f64, years: f64) -> Result<f64> {
    check_amount("amount", amount)?;
    check_rate("inflation rate", inflation_rate)?;
    Ok(amount * (1.0 + inflation_rate).powf(years))
}

/// Future value of a single investment: `principal * (1 + rate)^years`
pub fn lumpsum(principal: f64, annual_rate: f64, years: f64) -> Result<f64> {
    check_amount("principal", principal)?;
    check_rate("annual rate", annual_rate)?;
    check_years(years)?;

    Ok(principal * (1.0 + annual_rate).powf(years))
}

/// Future value of a monthly SIP (ordinary annuity)
pub fn sip(monthly_contribution: f64, annual_rate: f64, months: u32) -> Result<f64> {
    check_amount("monthly contribution", monthly_contribution)?;
    check_rate("annual rate", annual_rate)?;
    check_months(months)?;

    Ok(monthly_contribution * annuity_factor(monthly_rate(annual_rate), months))
}

/// Future value of `n` unit payments at monthly rate `i`: `((1+i)^n - 1) / i`
fn annuity_factor(i: f64, months: u32) -> f64 {
    if i.abs() < ZERO_RATE_EPSILON {
        months as f64
    } else {
        ((1.0 + i).powi(months as i32) - 1.0) / i
    }
}

/// Future value of a SIP whose contribution grows by `step_up_rate` every 12 months
pub fn step_up_sip(
    monthly_contribution: f64,
    annual_rate: f64,
    months: u32,
    step_up_rate: f64,
) -> Result<f64> {
    let schedule = step_up_schedule(monthly_contribution, annual_rate, months, step_up_rate)?;
    Ok(schedule.last().map(|p| p.value).unwrap_or_default())
}

/// Monthly contribution needed for a SIP to grow to `target` (inverse of [`sip`])
pub fn goal_based_contribution(target: f64, annual_rate: f64, months: u32) -> Result<f64> {
    check_amount("target amount", target)?;
    check_rate("annual rate", annual_rate)?;
    check_months(months)?;

    let factor = annuity_factor(monthly_rate(annual_rate), months);
    if factor <= 0.0 || !factor.is_finite() {
        return Err(Error::invalid(format!(
            "no contribution reaches {:.2} at rate {} over {} months",
            target, annual_rate, months
        )));
    }
    Ok(target / factor)
}

/// Year-by-year value of a lumpsum investment, years `0..=years`
pub fn lumpsum_schedule(principal: f64, annual_rate: f64, years: u32) -> Result<Vec<ProjectionPoint>> {
    check_amount("principal", principal)?;
    check_rate("annual rate", annual_rate)?;
    check_years(years as f64)?;

    Ok((0..=years)
        .map(|year| {
            let value = principal * (1.0 + annual_rate).powi(year as i32);
            ProjectionPoint {
                period: year,
                contribution: if year == 0 { principal } else { 0.0 },
                total_invested: principal,
                value,
                real_value: value,
            }
        })
        .collect())
}

/// Month-by-month growth of a SIP
pub fn sip_schedule(
    monthly_contribution: f64,
    annual_rate: f64,
    months: u32,
) -> Result<Vec<ProjectionPoint>> {
    step_up_schedule(monthly_contribution, annual_rate, months, 0.0)
}

/// Month-by-month growth of a step-up SIP.
///
/// The contribution for month `m` (0-based) is `c * (1 + step_up)^(m / 12)`;
/// each month the running value earns one month of interest before the new
/// contribution is added.
pub fn step_up_schedule(
    monthly_contribution: f64,
    annual_rate: f64,
    months: u32,
    step_up_rate: f64,
) -> Result<Vec<ProjectionPoint>> {
    check_amount("monthly contribution", monthly_contribution)?;
    check_rate("annual rate", annual_rate)?;
    check_rate("step-up rate", step_up_rate)?;
    check_months(months)?;

    let i = monthly_rate(annual_rate);
    let mut schedule = Vec::with_capacity(months as usize);
    let mut value = 0.0;
    let mut total_invested = 0.0;

    for month in 0..months {
        let contribution = monthly_contribution * (1.0 + step_up_rate).powi((month / 12) as i32);
        value = value * (1.0 + i) + contribution;
        total_invested += contribution;
        schedule.push(ProjectionPoint {
            period: month + 1,
            contribution,
            total_invested,
            value,
            real_value: value,
        });
    }

    debug!(
        months,
        annual_rate,
        step_up_rate,
        final_value = value,
        "Computed SIP schedule"
    );
    Ok(schedule)
}

impl InvestmentPlan {
    /// Which calculator this plan maps to
    pub fn calculator(&self) -> CalculatorKind {
        if self.monthly_contribution > 0.0 {
            if self.step_up_rate.is_some() {
                CalculatorKind::StepUp
            } else {
                CalculatorKind::Sip
            }
        } else {
            CalculatorKind::Lumpsum
        }
    }

    /// Run the plan.
    ///
    /// A principal alongside a monthly contribution compounds annually on its
    /// own and is added on top of the SIP value each month.
    pub fn project(&self) -> Result<Projection> {
        check_amount("principal", self.principal)?;
        check_amount("monthly contribution", self.monthly_contribution)?;
        check_rate("inflation rate", self.inflation_rate)?;
        if self.step_up_rate.is_some() && self.monthly_contribution <= 0.0 {
            return Err(Error::invalid(
                "a step-up SIP needs a monthly contribution greater than zero",
            ));
        }
        let calculator = self.calculator();

        let (invested, schedule) = if calculator == CalculatorKind::Lumpsum {
            let mut schedule = lumpsum_schedule(self.principal, self.annual_rate, self.years)?;
            deflate(&mut schedule, self.inflation_rate, 1.0);
            (self.principal, schedule)
        } else {
            let months = self.years.saturating_mul(12);
            let mut schedule = step_up_schedule(
                self.monthly_contribution,
                self.annual_rate,
                months,
                self.step_up_rate.unwrap_or(0.0),
            )?;

            if self.principal > 0.0 {
                let growth = 1.0 + self.annual_rate;
                for point in &mut schedule {
                    point.total_invested += self.principal;
                    point.value += self.principal * growth.powf(point.period as f64 / 12.0);
                }
                if let Some(first) = schedule.first_mut() {
                    first.contribution += self.principal;
                }
            }
            deflate(&mut schedule, self.inflation_rate, 1.0 / 12.0);
            let invested = schedule.last().map(|p| p.total_invested).unwrap_or_default();
            (invested, schedule)
        };

        let last = schedule.last().copied().unwrap_or(ProjectionPoint {
            period: 0,
            contribution: 0.0,
            total_invested: 0.0,
            value: 0.0,
            real_value: 0.0,
        });
        Ok(Projection {
            calculator,
            summary: ProjectionSummary::new(invested, &last, self.annual_rate, self.inflation_rate),
            schedule,
        })
    }
}

/// Fill `real_value` for a schedule whose periods are `years_per_period` long
fn deflate(schedule: &mut [ProjectionPoint], inflation_rate: f64, years_per_period: f64) {
    let base = 1.0 + inflation_rate;
    for point in schedule {
        point.real_value = point.value / base.powf(point.period as f64 * years_per_period);
    }
}

/// Inputs for sizing a retirement corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementPlan {
    /// Today's monthly expenses
    pub monthly_expenses: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    /// Fraction, e.g. 0.06 for 6%
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementEstimate {
    pub monthly_expenses_at_retirement: f64,
    pub annual_expenses_at_retirement: f64,
    pub years_in_retirement: u32,
    pub corpus: f64,
}

/// Corpus needed at retirement: inflated annual expenses / 4% withdrawal rate
pub fn retirement_corpus(plan: &RetirementPlan) -> Result<RetirementEstimate> {
    check_amount("monthly expenses", plan.monthly_expenses)?;
    check_rate("inflation rate", plan.inflation_rate)?;
    if plan.current_age > plan.retirement_age {
        return Err(Error::invalid(format!(
            "retirement age {} is before current age {}",
            plan.retirement_age, plan.current_age
        )));
    }
    if plan.life_expectancy <= plan.retirement_age {
        return Err(Error::invalid(format!(
            "life expectancy {} must be after retirement age {}",
            plan.life_expectancy, plan.retirement_age
        )));
    }

    let years_to_retirement = plan.retirement_age - plan.current_age;
    let monthly = plan.monthly_expenses * (1.0 + plan.inflation_rate).powi(years_to_retirement as i32);
    let annual = monthly * 12.0;

    Ok(RetirementEstimate {
        monthly_expenses_at_retirement: monthly,
        annual_expenses_at_retirement: annual,
        years_in_retirement: plan.life_expectancy - plan.retirement_age,
        corpus: annual / SAFE_WITHDRAWAL_RATE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_sip_regression_fixture() {
        // 1% per month for 12 months
        let fv = sip(5000.0, 0.12, 12).unwrap();
        assert_close(fv, 63_412.515, 0.01);
    }

    #[test]
    fn test_sip_zero_rate_is_sum_of_contributions() {
        assert_close(sip(1000.0, 0.0, 24).unwrap(), 24_000.0, 1e-9);
        assert_close(goal_based_contribution(24_000.0, 0.0, 24).unwrap(), 1000.0, 1e-9);
    }

    #[test]
    fn test_lumpsum() {
        assert_close(lumpsum(100_000.0, 0.10, 10.0).unwrap(), 259_374.246, 0.01);
        assert_close(lumpsum(500.0, 0.0, 3.0).unwrap(), 500.0, 1e-9);
    }

    #[test]
    fn test_lumpsum_monotonic() {
        let base = lumpsum(1000.0, 0.08, 5.0).unwrap();
        assert!(lumpsum(1500.0, 0.08, 5.0).unwrap() > base);
        assert!(lumpsum(1000.0, 0.09, 5.0).unwrap() > base);
        assert!(lumpsum(1000.0, 0.08, 6.0).unwrap() > base);
        assert!(lumpsum(1000.0, 0.08, 5.5).unwrap() > base);
    }

    #[test]
    fn test_goal_round_trip() {
        for &(target, rate, months) in &[
            (1_000_000.0, 0.12, 120),
            (50_000.0, 0.07, 36),
            (2_500.0, -0.05, 18),
            (10_000_000.0, 0.15, 360),
        ] {
            let monthly = goal_based_contribution(target, rate, months).unwrap();
            let recovered = sip(monthly, rate, months).unwrap();
            assert_close(recovered, target, target * 1e-9);
        }
    }

    #[test]
    fn test_step_up_without_step_matches_sip() {
        let plain = sip(2000.0, 0.10, 60).unwrap();
        let stepped = step_up_sip(2000.0, 0.10, 60, 0.0).unwrap();
        assert_close(stepped, plain, 1e-6);
    }

    #[test]
    fn test_step_up_raises_contribution_each_year() {
        let schedule = step_up_schedule(1000.0, 0.12, 24, 0.10).unwrap();
        assert_eq!(schedule.len(), 24);
        assert_close(schedule[11].contribution, 1000.0, 1e-9);
        assert_close(schedule[12].contribution, 1100.0, 1e-9);
        assert_close(schedule[23].total_invested, 12_000.0 + 13_200.0, 1e-6);
        assert_close(schedule[23].value, 28_241.715, 0.01);
        assert!(step_up_sip(1000.0, 0.12, 24, 0.10).unwrap() > sip(1000.0, 0.12, 24).unwrap());
    }

    #[test]
    fn test_schedule_ends_at_scalar_value() {
        let schedule = sip_schedule(5000.0, 0.12, 12).unwrap();
        assert_close(schedule.last().unwrap().value, sip(5000.0, 0.12, 12).unwrap(), 1e-6);

        let yearly = lumpsum_schedule(1000.0, 0.1, 3).unwrap();
        assert_eq!(yearly.len(), 4);
        assert_close(yearly[0].value, 1000.0, 1e-9);
        assert_close(yearly[3].value, lumpsum(1000.0, 0.1, 3.0).unwrap(), 1e-9);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(lumpsum(1000.0, 0.1, 0.0), Err(Error::InvalidInput(_))));
        assert!(matches!(lumpsum(1000.0, 0.1, -2.0), Err(Error::InvalidInput(_))));
        assert!(matches!(lumpsum(1000.0, -1.0, 2.0), Err(Error::InvalidInput(_))));
        assert!(matches!(lumpsum(-5.0, 0.1, 2.0), Err(Error::InvalidInput(_))));
        assert!(matches!(sip(100.0, 0.1, 0), Err(Error::InvalidInput(_))));
        assert!(matches!(sip(100.0, f64::NAN, 12), Err(Error::InvalidInput(_))));
        assert!(matches!(sip(100.0, 0.1, MAX_MONTHS + 1), Err(Error::InvalidInput(_))));
        assert!(matches!(step_up_sip(100.0, 0.1, 12, -1.5), Err(Error::InvalidInput(_))));
        assert!(matches!(goal_based_contribution(1000.0, -2.0, 12), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_plan_projection() {
        let plan = InvestmentPlan {
            principal: 0.0,
            monthly_contribution: 5000.0,
            annual_rate: 0.12,
            years: 1,
            step_up_rate: None,
            inflation_rate: 0.0,
        };
        let projection = plan.project().unwrap();
        assert_eq!(projection.calculator, CalculatorKind::Sip);
        assert_eq!(projection.schedule.len(), 12);
        assert_close(projection.summary.invested, 60_000.0, 1e-6);
        assert_close(projection.summary.gains, 3_412.515, 0.01);

        let lumpsum_plan = InvestmentPlan {
            principal: 1000.0,
            monthly_contribution: 0.0,
            annual_rate: 0.1,
            years: 2,
            step_up_rate: None,
            inflation_rate: 0.0,
        };
        let projection = lumpsum_plan.project().unwrap();
        assert_eq!(projection.calculator, CalculatorKind::Lumpsum);
        assert_close(projection.summary.future_value, 1210.0, 1e-9);
    }

    #[test]
    fn test_plan_with_principal_and_contribution() {
        let plan = InvestmentPlan {
            principal: 10_000.0,
            monthly_contribution: 1000.0,
            annual_rate: 0.10,
            years: 2,
            step_up_rate: Some(0.05),
            inflation_rate: 0.0,
        };
        let projection = plan.project().unwrap();
        assert_eq!(projection.calculator, CalculatorKind::StepUp);
        let expected = step_up_sip(1000.0, 0.10, 24, 0.05).unwrap() + lumpsum(10_000.0, 0.10, 2.0).unwrap();
        assert_close(projection.summary.future_value, expected, 1e-6);
        assert_close(projection.summary.invested, 10_000.0 + 12_000.0 + 12_600.0, 1e-6);
    }

    #[test]
    fn test_real_rate_and_inflate() {
        assert_close(real_rate(0.12, 0.06).unwrap(), 1.12 / 1.06 - 1.0, 1e-12);
        assert_close(real_rate(0.08, 0.0).unwrap(), 0.08, 1e-12);
        assert!(real_rate(0.1, -1.0).is_err());
        assert_close(inflate(100_000.0, 0.06, 10.0).unwrap(), 179_084.770, 0.01);
        assert!(inflate(-1.0, 0.06, 10.0).is_err());
    }

    #[test]
    fn test_lumpsum_real_value_compounds_at_real_rate() {
        let plan = InvestmentPlan {
            principal: 100_000.0,
            monthly_contribution: 0.0,
            annual_rate: 0.12,
            years: 10,
            step_up_rate: None,
            inflation_rate: 0.06,
        };
        let projection = plan.project().unwrap();
        let real = real_rate(0.12, 0.06).unwrap();
        assert_close(projection.summary.real_rate, real, 1e-12);
        assert_close(
            projection.summary.real_value,
            lumpsum(100_000.0, real, 10.0).unwrap(),
            1e-6,
        );
        assert_close(projection.schedule[0].real_value, 100_000.0, 1e-9);
        assert!(projection.summary.real_value < projection.summary.future_value);
    }

    #[test]
    fn test_sip_real_value_series() {
        let plan = InvestmentPlan {
            principal: 0.0,
            monthly_contribution: 5000.0,
            annual_rate: 0.12,
            years: 2,
            step_up_rate: None,
            inflation_rate: 0.05,
        };
        let projection = plan.project().unwrap();
        for point in &projection.schedule {
            let factor = 1.05f64.powf(point.period as f64 / 12.0);
            assert_close(point.real_value, point.value / factor, 1e-6);
        }
        let last = projection.schedule.last().unwrap();
        assert_close(last.real_value, last.value / 1.05f64.powi(2), 1e-6);
        assert_close(projection.summary.real_value, last.real_value, 1e-12);
    }

    #[test]
    fn test_no_inflation_leaves_real_values_nominal() {
        let plan = InvestmentPlan {
            principal: 0.0,
            monthly_contribution: 1000.0,
            annual_rate: 0.10,
            years: 1,
            step_up_rate: None,
            inflation_rate: 0.0,
        };
        let projection = plan.project().unwrap();
        assert_eq!(projection.summary.real_value, projection.summary.future_value);
        assert_close(projection.summary.real_rate, 0.10, 1e-12);
    }

    #[test]
    fn test_step_up_without_contribution_rejected() {
        let plan = InvestmentPlan {
            principal: 0.0,
            monthly_contribution: 0.0,
            annual_rate: 0.12,
            years: 5,
            step_up_rate: Some(0.10),
            inflation_rate: 0.0,
        };
        assert!(matches!(plan.project(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_retirement_corpus() {
        let estimate = retirement_corpus(&RetirementPlan {
            monthly_expenses: 1000.0,
            current_age: 50,
            retirement_age: 60,
            life_expectancy: 85,
            inflation_rate: 0.06,
        })
        .unwrap();
        assert_eq!(estimate.years_in_retirement, 25);
        assert_close(estimate.corpus, 537_254.309, 0.01);
        assert_close(estimate.corpus, estimate.annual_expenses_at_retirement * 25.0, 1e-6);
    }

    #[test]
    fn test_retirement_rejects_bad_ages() {
        let mut plan = RetirementPlan {
            monthly_expenses: 1000.0,
            current_age: 65,
            retirement_age: 60,
            life_expectancy: 85,
            inflation_rate: 0.06,
        };
        assert!(retirement_corpus(&plan).is_err());
        plan.current_age = 30;
        plan.life_expectancy = 60;
        assert!(retirement_corpus(&plan).is_err());
    }
}
