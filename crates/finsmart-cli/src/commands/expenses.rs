//! Expense commands

use anyhow::Result;
use finsmart_core::{DateRange, NewExpense, Settings, Store};

use super::{money, parse_date, parse_month, truncate};

pub fn cmd_expense_add(
    store: &dyn Store,
    settings: &Settings,
    amount: f64,
    category: &str,
    date: Option<&str>,
    note: &str,
) -> Result<()> {
    let date = parse_date(date)?;
    let record = store.add_expense(NewExpense::new(date, category, amount, note))?;
    println!(
        "✅ Logged expense #{}: {} on {} ({})",
        record.id,
        money(&settings.currency, record.amount),
        record.category,
        record.date
    );
    Ok(())
}

pub fn cmd_expense_list(
    store: &dyn Store,
    settings: &Settings,
    month: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let mut expenses = match month {
        Some(m) => store.expenses_in(&DateRange::month_of(parse_month(m)?))?,
        None => store.expenses()?,
    };
    if let Some(category) = category {
        expenses.retain(|e| e.category.eq_ignore_ascii_case(category));
    }

    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!();
    println!(
        "   {:>5}  {:<10}  {:<16}  {:>12}  Note",
        "ID", "Date", "Category", "Amount"
    );
    println!("   ─────────────────────────────────────────────────────────────");
    for expense in &expenses {
        println!(
            "   {:>5}  {:<10}  {:<16}  {:>12}  {}",
            expense.id,
            expense.date,
            truncate(&expense.category, 16),
            money(&settings.currency, expense.amount),
            truncate(&expense.note, 30)
        );
    }
    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    println!();
    println!(
        "   {} expenses, total {}",
        expenses.len(),
        money(&settings.currency, total)
    );
    Ok(())
}
