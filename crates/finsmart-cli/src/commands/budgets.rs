//! Budget commands

use anyhow::{anyhow, Context, Result};
use finsmart_core::{
    record_under_budget, BudgetAllocator, BudgetCategory, BudgetHealth, BudgetPeriod, PaceStatus,
    Settings, Store,
};

use super::{money, parse_date, truncate};

pub fn cmd_budget_set(
    store: &dyn Store,
    settings: &Settings,
    category: &str,
    limit: f64,
    period: &str,
) -> Result<()> {
    let period: BudgetPeriod = period.parse().map_err(|e: String| anyhow!(e))?;
    store.set_budget(BudgetCategory::new(category, limit, period)?)?;
    println!(
        "✅ Budget for {}: {} {}",
        category,
        money(&settings.currency, limit),
        period
    );
    Ok(())
}

pub fn cmd_budget_remove(store: &dyn Store, category: &str) -> Result<()> {
    store
        .remove_budget(category)
        .with_context(|| format!("Failed to remove budget '{}'", category))?;
    println!("🗑️  Removed budget for {}", category);
    Ok(())
}

/// Parse a NAME=WEIGHT pair
pub fn parse_weight(pair: &str) -> Result<(String, f64)> {
    let (name, weight) = pair
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("Invalid weight '{}', expected NAME=WEIGHT", pair))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .with_context(|| format!("Invalid weight value in '{}'", pair))?;
    Ok((name.trim().to_string(), weight))
}

pub fn cmd_budget_allocate(
    store: &dyn Store,
    settings: &Settings,
    total: f64,
    weights: &[String],
) -> Result<()> {
    let weights = weights
        .iter()
        .map(|w| parse_weight(w))
        .collect::<Result<Vec<_>>>()?;
    let allocator = BudgetAllocator::from_weights(total, weights)?;

    println!("📊 Allocating {}", money(&settings.currency, total));
    for category in allocator.categories() {
        let limit = allocator.limit(category).unwrap_or(0.0);
        store.set_budget(BudgetCategory::new(category, limit, BudgetPeriod::Monthly)?)?;
        println!(
            "   {:<20} {:>12}",
            truncate(category, 20),
            money(&settings.currency, limit)
        );
    }
    Ok(())
}

fn pace_label(status: PaceStatus) -> &'static str {
    match status {
        PaceStatus::Overspending => "spending too fast",
        PaceStatus::OnTrack => "on track",
        PaceStatus::Underspending => "under pace",
        PaceStatus::NoData => "no budget",
    }
}

fn health_icon(health: BudgetHealth) -> &'static str {
    match health {
        BudgetHealth::Good => "🟢",
        BudgetHealth::Warning => "🟡",
        BudgetHealth::Alert => "🔴",
    }
}

pub fn cmd_budget_status(store: &dyn Store, settings: &Settings, date: Option<&str>) -> Result<()> {
    let today = parse_date(date)?;
    let budgets = settings.effective_budgets(store.budgets()?);
    if budgets.is_empty() {
        println!("No budgets set. Try: finsmart budget set Food 8000");
        return Ok(());
    }

    let allocator = BudgetAllocator::tracking(&budgets, &store.expenses()?, today)?;
    let cur = &settings.currency;

    println!();
    println!("📊 Budget status as of {}", today);
    println!("   ─────────────────────────────────────────────────────────────");
    for status in allocator.status() {
        println!(
            "   {} {:<18} {:>12} of {:>12}  {:>6.1}%  left {}",
            health_icon(status.health),
            truncate(&status.category, 18),
            money(cur, status.spent),
            money(cur, status.limit),
            status.percent_used,
            money(cur, status.remaining)
        );
    }
    for (category, spent) in allocator.unbudgeted() {
        println!(
            "   ⚪ {:<18} {:>12} (no budget)",
            truncate(category, 18),
            money(cur, *spent)
        );
    }

    let summary = allocator.summary();
    println!();
    println!(
        "   Total: {} of {} ({:.1}% used)",
        money(cur, summary.total_spent),
        money(cur, summary.total_budget),
        summary.percent_used
    );
    println!(
        "   {} over budget, {} close to the limit, {} healthy",
        summary.over_budget_count, summary.warning_count, summary.healthy_count
    );

    let pace = allocator.monthly_pace(today);
    println!(
        "   Monthly pace: {} ({:.0}% spent, {:.0}% of the month gone, {}/day left)",
        pace_label(pace.status),
        pace.spent_percent,
        pace.days_elapsed_percent,
        money(cur, pace.daily_remaining)
    );

    record_under_budget(store, &allocator, today)?;
    Ok(())
}
