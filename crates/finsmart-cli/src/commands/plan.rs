//! Weekly planner command

use anyhow::{bail, Result};
use finsmart_core::{Settings, Strategy, WeeklyPlanner};

use super::money;

/// Build a strategy from its name and the seven per-day values
pub fn parse_strategy(name: &str, values: &[f64]) -> Result<Strategy> {
    let days = || -> Result<[f64; 7]> {
        <[f64; 7]>::try_from(values).map_err(|_| {
            anyhow::anyhow!(
                "Strategy '{}' needs 7 values (Monday to Sunday), got {}",
                name,
                values.len()
            )
        })
    };

    match name.to_lowercase().as_str() {
        "equal" => {
            if !values.is_empty() {
                bail!("Strategy 'equal' takes no values");
            }
            Ok(Strategy::Equal)
        }
        "weighted" => Ok(Strategy::Weighted(days()?)),
        "percentages" | "percent" => Ok(Strategy::Percentages(days()?)),
        "custom" => Ok(Strategy::Custom(days()?)),
        other => bail!(
            "Unknown strategy '{}'. Use equal, weighted, percentages or custom",
            other
        ),
    }
}

pub fn cmd_plan(settings: &Settings, total: f64, strategy: &str, values: &[f64]) -> Result<()> {
    let strategy = parse_strategy(strategy, values)?;
    let plan = WeeklyPlanner::with_tolerance(settings.planner.custom_tolerance).plan(total, strategy)?;
    let cur = &settings.currency;

    println!("🗓️  Weekly plan for {} ({})", money(cur, total), plan.strategy.name());
    for day in plan.days() {
        println!("   {:<4} {:>12}", day.day, money(cur, day.amount));
    }

    let insights = plan.insights();
    println!();
    println!("   Average per day: {}", money(cur, insights.average_daily));
    println!(
        "   Highest: {} ({})",
        insights.highest_day.day,
        money(cur, insights.highest_day.amount)
    );
    println!(
        "   Lowest:  {} ({})",
        insights.lowest_day.day,
        money(cur, insights.lowest_day.amount)
    );
    Ok(())
}
