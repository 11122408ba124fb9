//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinSmart - Track spending, plan budgets and project investments
#[derive(Parser)]
#[command(name = "finsmart")]
#[command(about = "Personal finance tracker and planner", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data file (defaults to <data dir>/finsmart/data.json)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Settings file overriding the built-in defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Investment calculators
    Calc {
        #[command(subcommand)]
        calculator: CalcCommand,
    },

    /// Log and list expenses
    Expense {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Manage category budgets
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// Split a weekly allowance into daily limits
    Plan {
        /// Weekly total to distribute
        total: f64,

        /// Strategy: equal, weighted, percentages, custom
        #[arg(short, long, default_value = "equal")]
        strategy: String,

        /// Seven comma-separated values, Monday first (weights, percentages or amounts)
        #[arg(long, value_delimiter = ',')]
        values: Vec<f64>,
    },

    /// Budget alerts
    Alerts {
        #[command(subcommand)]
        action: AlertsAction,
    },

    /// Show points, streaks, challenges and badges
    Game,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum CalcCommand {
    /// One-time investment
    Lumpsum {
        /// Amount invested today
        #[arg(long)]
        principal: f64,

        /// Expected annual return in percent
        #[arg(long)]
        rate: f64,

        /// Investment period in years
        #[arg(long)]
        years: u32,

        /// Expected inflation in percent; adds values in today's money
        #[arg(long, default_value = "0")]
        inflation: f64,

        /// Print the year-by-year schedule
        #[arg(long)]
        schedule: bool,
    },

    /// Fixed monthly investment
    Sip {
        /// Monthly contribution
        #[arg(long)]
        monthly: f64,

        /// Expected annual return in percent
        #[arg(long)]
        rate: f64,

        /// Investment period in years
        #[arg(long)]
        years: u32,

        /// Expected inflation in percent; adds values in today's money
        #[arg(long, default_value = "0")]
        inflation: f64,

        /// Print the year-by-year schedule
        #[arg(long)]
        schedule: bool,
    },

    /// Monthly investment that grows every year
    StepUp {
        /// Starting monthly contribution
        #[arg(long)]
        monthly: f64,

        /// Expected annual return in percent
        #[arg(long)]
        rate: f64,

        /// Investment period in years
        #[arg(long)]
        years: u32,

        /// Expected inflation in percent; adds values in today's money
        #[arg(long, default_value = "0")]
        inflation: f64,

        /// Yearly increase of the contribution in percent
        #[arg(long)]
        step_up: f64,

        /// Print the year-by-year schedule
        #[arg(long)]
        schedule: bool,
    },

    /// Monthly investment needed to reach a target
    Goal {
        /// Amount to reach
        #[arg(long)]
        target: f64,

        /// Expected annual return in percent
        #[arg(long)]
        rate: f64,

        /// Years until the goal
        #[arg(long)]
        years: u32,

        /// Expected inflation in percent; adds values in today's money
        #[arg(long, default_value = "0")]
        inflation: f64,
    },

    /// Corpus needed to retire
    Retirement {
        /// Current monthly expenses
        #[arg(long)]
        monthly_expenses: f64,

        #[arg(long)]
        current_age: u32,

        #[arg(long, default_value = "60")]
        retirement_age: u32,

        #[arg(long, default_value = "85")]
        life_expectancy: u32,

        /// Expected inflation in percent
        #[arg(long, default_value = "6")]
        inflation: f64,
    },
}

#[derive(Subcommand)]
pub enum ExpenseAction {
    /// Log an expense
    Add {
        /// Amount spent
        amount: f64,

        /// Expense category
        category: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Free-form note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// List expenses
    List {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Create or update a category budget
    Set {
        /// Category name
        category: String,

        /// Spending limit per period
        limit: f64,

        /// Period: monthly or weekly
        #[arg(short, long, default_value = "monthly")]
        period: String,
    },

    /// Delete a category budget
    Remove {
        /// Category name
        category: String,
    },

    /// Split a total across categories by weight and save the budgets
    Allocate {
        /// Total to distribute
        total: f64,

        /// Category weights as NAME=WEIGHT (repeatable)
        #[arg(short, long = "weight", required = true)]
        weights: Vec<String>,
    },

    /// Budget vs. actual for the current period
    Status {
        /// Evaluate as of this date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AlertsAction {
    /// Show categories past the alert threshold
    Check {
        /// Deliver alerts that were not sent yet this month
        #[arg(long)]
        send: bool,

        /// Threshold in percent (overrides settings)
        #[arg(long)]
        threshold: Option<f64>,

        /// Recipient (overrides settings)
        #[arg(long)]
        phone: Option<String>,
    },

    /// Turn on alerts for a category
    Watch {
        /// Category name
        category: String,
    },
}
