//! FinSmart Core Library
//!
//! Shared functionality for the FinSmart personal finance tracker:
//! - Investment calculators (lumpsum, SIP, step-up SIP, goal-based, retirement)
//! - Budget allocation and spending status
//! - Weekly spending plans
//! - Budget alerts with pluggable SMS delivery
//! - Points, streaks, challenges and badges from the activity log
//! - JSON file and in-memory storage
//! - TOML settings

pub mod alerts;
pub mod budget;
pub mod config;
pub mod error;
pub mod finance;
pub mod gamification;
pub mod models;
pub mod planner;
pub mod store;

pub use alerts::{
    evaluate as evaluate_alerts, normalize_phone, should_alert, AlertLedger, AlertLevel,
    BudgetAlert, DispatchReport, LogGateway, SmsGateway,
};
pub use budget::{
    spending_pace, BudgetAllocator, BudgetHealth, BudgetSummary, CategoryStatus, DateRange,
    PaceStatus, SpendingPace,
};
pub use config::{AlertSettings, PlannerSettings, Settings};
pub use error::{Error, Result};
pub use finance::{
    goal_based_contribution, lumpsum, retirement_corpus, sip, step_up_sip, Projection,
    ProjectionPoint, ProjectionSummary, RetirementEstimate, RetirementPlan,
};
pub use gamification::{
    BadgeRule, Challenge, ChallengeProgress, Criterion, EarnedBadge, GamificationEngine, Profile,
};
pub use models::{
    Activity, ActivityKind, BudgetCategory, BudgetPeriod, CalculatorKind, ExpenseRecord,
    ExportFormat, InvestmentPlan, NewExpense,
};
pub use planner::{DayAmount, PlanInsights, Strategy, WeeklyAllocation, WeeklyPlanner};
pub use store::{record_under_budget, JsonFileStore, MemoryStore, Store};
