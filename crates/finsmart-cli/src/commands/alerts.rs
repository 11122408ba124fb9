//! Budget alert commands

use anyhow::{bail, Result};
use finsmart_core::alerts::{self, LogGateway};
use finsmart_core::{Activity, ActivityKind, BudgetAllocator, Settings, Store};

use super::{money, today};

pub async fn cmd_alerts_check(
    store: &dyn Store,
    settings: &Settings,
    send: bool,
    threshold_percent: Option<f64>,
    phone: Option<&str>,
) -> Result<()> {
    let threshold = threshold_percent
        .map(|t| t / 100.0)
        .unwrap_or(settings.alerts.threshold);
    let today = today();
    let budgets = settings.effective_budgets(store.budgets()?);
    let allocator = BudgetAllocator::tracking(&budgets, &store.expenses()?, today)?;
    let found = alerts::evaluate(&allocator, threshold);

    if found.is_empty() {
        println!("✅ No budget past {:.0}% of its limit", threshold * 100.0);
        return Ok(());
    }

    let cur = &settings.currency;
    println!("🔔 {} budget alert(s):", found.len());
    for alert in &found {
        println!(
            "   [{}] {} at {:.1}% ({} of {})",
            alert.level,
            alert.category,
            alert.percent_used,
            money(cur, alert.spent),
            money(cur, alert.limit)
        );
    }

    if !send {
        return Ok(());
    }
    if !settings.alerts.enabled && phone.is_none() {
        bail!("Alerts are disabled; enable [alerts] in settings or pass --phone");
    }
    let Some(number) = phone.or(settings.alerts.phone_number.as_deref()) else {
        bail!("No phone number configured; set alerts.phone_number or pass --phone");
    };
    let number = alerts::normalize_phone(number, &settings.alerts.default_country_code)?;

    let mut ledger = store.alert_ledger()?;
    let report = ledger
        .dispatch(&LogGateway, &number, &found, today, cur)
        .await;
    store.save_alert_ledger(&ledger)?;

    println!();
    println!(
        "   Sent {}, already sent this month {}, failed {}",
        report.sent.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for (category, error) in &report.failed {
        println!("   ❌ {}: {}", category, error);
    }
    Ok(())
}

pub fn cmd_alerts_watch(store: &dyn Store, category: &str) -> Result<()> {
    let category = category.trim();
    if category.is_empty() {
        bail!("Category must not be empty");
    }
    store.record_activity(Activity::new(
        today(),
        ActivityKind::AlertConfigured {
            category: category.to_string(),
        },
    ))?;
    println!("🔔 Alerts enabled for {}", category);
    Ok(())
}
