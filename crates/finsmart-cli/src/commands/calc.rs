//! Investment calculator commands
//!
//! Rates arrive in percent and are converted to fractions here.

use anyhow::{bail, Result};
use finsmart_core::finance::{self, ProjectionPoint, ProjectionSummary};
use finsmart_core::{
    Activity, ActivityKind, CalculatorKind, InvestmentPlan, RetirementPlan, Settings, Store,
};

use super::{money, today};

fn record_use(store: &dyn Store, calculator: CalculatorKind) -> Result<()> {
    store.record_activity(Activity::new(
        today(),
        ActivityKind::CalculatorUsed { calculator },
    ))?;
    Ok(())
}

/// Expected return and inflation, both in percent
#[derive(Debug, Clone, Copy)]
pub struct Rates {
    pub annual: f64,
    pub inflation: f64,
}

impl Rates {
    pub fn new(annual: f64, inflation: f64) -> Self {
        Self { annual, inflation }
    }
}

fn print_summary(currency: &str, summary: &ProjectionSummary, rates: Rates) {
    println!("   Invested:     {}", money(currency, summary.invested));
    println!("   Future value: {}", money(currency, summary.future_value));
    println!("   Gains:        {}", money(currency, summary.gains));
    if rates.inflation != 0.0 {
        println!(
            "   In today's money at {}% inflation: {}",
            rates.inflation,
            money(currency, summary.real_value)
        );
        println!("   Real return:  {:.2}% a year", summary.real_rate * 100.0);
    }
}

/// One row per year: the last point of each year
fn print_yearly(currency: &str, schedule: &[ProjectionPoint], monthly: bool) {
    println!();
    println!(
        "   {:>4}  {:>16}  {:>16}  {:>16}",
        "Year", "Invested", "Value", "Today's money"
    );
    for point in schedule {
        let year = if monthly {
            if point.period % 12 != 0 {
                continue;
            }
            point.period / 12
        } else {
            point.period
        };
        println!(
            "   {:>4}  {:>16}  {:>16}  {:>16}",
            year,
            money(currency, point.total_invested),
            money(currency, point.value),
            money(currency, point.real_value)
        );
    }
}

pub fn cmd_calc_lumpsum(
    store: &dyn Store,
    settings: &Settings,
    principal: f64,
    rates: Rates,
    years: u32,
    schedule: bool,
) -> Result<()> {
    let plan = InvestmentPlan {
        principal,
        monthly_contribution: 0.0,
        annual_rate: rates.annual / 100.0,
        years,
        step_up_rate: None,
        inflation_rate: rates.inflation / 100.0,
    };
    let projection = plan.project()?;
    record_use(store, CalculatorKind::Lumpsum)?;

    let cur = &settings.currency;
    println!("📈 Lumpsum: {} for {} years at {}%", money(cur, principal), years, rates.annual);
    print_summary(cur, &projection.summary, rates);
    if schedule {
        print_yearly(cur, &projection.schedule, false);
    }
    Ok(())
}

/// SIP, or step-up SIP when `step_up_percent` is given
pub fn cmd_calc_sip(
    store: &dyn Store,
    settings: &Settings,
    monthly: f64,
    rates: Rates,
    years: u32,
    step_up_percent: Option<f64>,
    schedule: bool,
) -> Result<()> {
    if monthly <= 0.0 {
        bail!("Monthly contribution must be greater than zero, got {}", monthly);
    }
    let plan = InvestmentPlan {
        principal: 0.0,
        monthly_contribution: monthly,
        annual_rate: rates.annual / 100.0,
        years,
        step_up_rate: step_up_percent.map(|s| s / 100.0),
        inflation_rate: rates.inflation / 100.0,
    };
    let projection = plan.project()?;
    let kind = if step_up_percent.is_some() {
        CalculatorKind::StepUp
    } else {
        CalculatorKind::Sip
    };
    record_use(store, kind)?;

    let cur = &settings.currency;
    match step_up_percent {
        Some(step) => println!(
            "📈 Step-up SIP: {}/month rising {}% a year, {} years at {}%",
            money(cur, monthly),
            step,
            years,
            rates.annual
        ),
        None => println!(
            "📈 SIP: {}/month for {} years at {}%",
            money(cur, monthly),
            years,
            rates.annual
        ),
    }
    print_summary(cur, &projection.summary, rates);
    if schedule {
        print_yearly(cur, &projection.schedule, true);
    }
    Ok(())
}

pub fn cmd_calc_goal(
    store: &dyn Store,
    settings: &Settings,
    target: f64,
    rates: Rates,
    years: u32,
) -> Result<()> {
    let months = years.saturating_mul(12);
    // Target is in today's money; grow it to the money of the goal year
    let target_then = finance::inflate(target, rates.inflation / 100.0, years as f64)?;
    let monthly = finance::goal_based_contribution(target_then, rates.annual / 100.0, months)?;
    record_use(store, CalculatorKind::Goal)?;

    let cur = &settings.currency;
    let invested = monthly * months as f64;
    println!("🎯 Goal: {} in {} years at {}%", money(cur, target), years, rates.annual);
    if rates.inflation != 0.0 {
        println!(
            "   Target after {}% inflation: {}",
            rates.inflation,
            money(cur, target_then)
        );
    }
    println!("   Monthly investment: {}", money(cur, monthly));
    println!("   Total invested:     {}", money(cur, invested));
    println!("   Gains:              {}", money(cur, target_then - invested));
    Ok(())
}

pub fn cmd_calc_retirement(
    store: &dyn Store,
    settings: &Settings,
    monthly_expenses: f64,
    current_age: u32,
    retirement_age: u32,
    life_expectancy: u32,
    inflation_percent: f64,
) -> Result<()> {
    let estimate = finance::retirement_corpus(&RetirementPlan {
        monthly_expenses,
        current_age,
        retirement_age,
        life_expectancy,
        inflation_rate: inflation_percent / 100.0,
    })?;
    record_use(store, CalculatorKind::Retirement)?;

    let cur = &settings.currency;
    println!("🏖️  Retirement at {} (now {})", retirement_age, current_age);
    println!(
        "   Monthly expenses then: {}",
        money(cur, estimate.monthly_expenses_at_retirement)
    );
    println!(
        "   Annual expenses then:  {}",
        money(cur, estimate.annual_expenses_at_retirement)
    );
    println!("   Years in retirement:   {}", estimate.years_in_retirement);
    println!("   Corpus needed:         {}", money(cur, estimate.corpus));
    Ok(())
}
