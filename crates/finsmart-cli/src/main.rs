//! FinSmart CLI - Personal finance tracker
//!
//! Usage:
//!   finsmart expense add 250 Food        Log an expense
//!   finsmart budget status               Budget vs. actual this month
//!   finsmart calc sip --monthly 5000 --rate 12 --years 10
//!   finsmart serve --port 3000           Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use finsmart_core::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::Rates;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let data_path = commands::resolve_data_path(cli.data.as_deref());

    if let Commands::Serve { port, host } = &cli.command {
        return commands::cmd_serve(&data_path, settings, host, *port).await;
    }

    let store = commands::open_store(&data_path)?;
    commands::record_login(&store)?;

    match cli.command {
        Commands::Calc { calculator } => match calculator {
            CalcCommand::Lumpsum {
                principal,
                rate,
                years,
                inflation,
                schedule,
            } => commands::cmd_calc_lumpsum(
                &store,
                &settings,
                principal,
                Rates::new(rate, inflation),
                years,
                schedule,
            ),
            CalcCommand::Sip {
                monthly,
                rate,
                years,
                inflation,
                schedule,
            } => commands::cmd_calc_sip(
                &store,
                &settings,
                monthly,
                Rates::new(rate, inflation),
                years,
                None,
                schedule,
            ),
            CalcCommand::StepUp {
                monthly,
                rate,
                years,
                inflation,
                step_up,
                schedule,
            } => commands::cmd_calc_sip(
                &store,
                &settings,
                monthly,
                Rates::new(rate, inflation),
                years,
                Some(step_up),
                schedule,
            ),
            CalcCommand::Goal {
                target,
                rate,
                years,
                inflation,
            } => commands::cmd_calc_goal(
                &store,
                &settings,
                target,
                Rates::new(rate, inflation),
                years,
            ),
            CalcCommand::Retirement {
                monthly_expenses,
                current_age,
                retirement_age,
                life_expectancy,
                inflation,
            } => commands::cmd_calc_retirement(
                &store,
                &settings,
                monthly_expenses,
                current_age,
                retirement_age,
                life_expectancy,
                inflation,
            ),
        },
        Commands::Expense { action } => match action {
            ExpenseAction::Add {
                amount,
                category,
                date,
                note,
            } => commands::cmd_expense_add(
                &store,
                &settings,
                amount,
                &category,
                date.as_deref(),
                &note,
            ),
            ExpenseAction::List { month, category } => commands::cmd_expense_list(
                &store,
                &settings,
                month.as_deref(),
                category.as_deref(),
            ),
        },
        Commands::Budget { action } => match action {
            BudgetAction::Set {
                category,
                limit,
                period,
            } => commands::cmd_budget_set(&store, &settings, &category, limit, &period),
            BudgetAction::Remove { category } => commands::cmd_budget_remove(&store, &category),
            BudgetAction::Allocate { total, weights } => {
                commands::cmd_budget_allocate(&store, &settings, total, &weights)
            }
            BudgetAction::Status { date } => {
                commands::cmd_budget_status(&store, &settings, date.as_deref())
            }
        },
        Commands::Plan {
            total,
            strategy,
            values,
        } => commands::cmd_plan(&settings, total, &strategy, &values),
        Commands::Alerts { action } => match action {
            AlertsAction::Check {
                send,
                threshold,
                phone,
            } => {
                commands::cmd_alerts_check(&store, &settings, send, threshold, phone.as_deref())
                    .await
            }
            AlertsAction::Watch { category } => commands::cmd_alerts_watch(&store, &category),
        },
        Commands::Game => commands::cmd_game(&store),
        // Handled before the store is opened
        Commands::Serve { .. } => Ok(()),
    }
}
