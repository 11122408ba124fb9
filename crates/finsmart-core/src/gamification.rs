//! Points, streaks, challenges and badges
//!
//! Nothing here is stored. A [`Profile`] is rebuilt by replaying the activity
//! log in date order, so evaluating the same log always gives the same answer.
//!
//! Challenges and badges are rule tables whose conditions are [`Criterion`]
//! values. After every replayed activity the engine settles the tables:
//! challenges that reached their target are completed, badges whose
//! criterion holds are earned, and the level catches up with the points.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Activity, ActivityKind, CalculatorKind, ExportFormat};

/// Points for the first login and for coming back after a gap
pub const LOGIN_POINTS: u32 = 10;

/// Ceiling on the daily streak bonus
pub const MAX_STREAK_POINTS: u32 = 50;

/// Points awarded with every non-level badge
pub const BADGE_POINTS: u32 = 50;

/// A condition over the replayed activity log.
///
/// Counting criteria report progress towards their target; the others are
/// plain yes/no checks with a target of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum Criterion {
    /// Budgets set for this many distinct categories
    BudgetsSet(u32),
    /// Expenses logged
    ExpensesLogged(u32),
    /// Distinct categories that stayed under budget
    UnderBudget(u32),
    /// Charts viewed
    ChartsViewed(u32),
    /// Distinct investment calculators used (retirement planning excluded)
    CalculatorsUsed(u32),
    /// Distinct export formats used
    ExportFormats(u32),
    /// Distinct categories with at least one expense
    ExpenseCategories(u32),
    /// Distinct categories with an alert configured
    AlertsConfigured(u32),
    /// Runs of the goal-based calculator
    GoalCalculations(u32),
    /// Longest login streak, in days
    LoginStreak(u32),
    /// The challenge with this id is complete
    ChallengeCompleted(u32),
    /// The profile reached this level
    LevelReached(u32),
}

impl Criterion {
    pub fn target(&self) -> u32 {
        match *self {
            Self::BudgetsSet(n)
            | Self::ExpensesLogged(n)
            | Self::UnderBudget(n)
            | Self::ChartsViewed(n)
            | Self::CalculatorsUsed(n)
            | Self::ExportFormats(n)
            | Self::ExpenseCategories(n)
            | Self::AlertsConfigured(n)
            | Self::GoalCalculations(n)
            | Self::LoginStreak(n) => n,
            Self::ChallengeCompleted(_) | Self::LevelReached(_) => 1,
        }
    }

    /// Progress towards [`Criterion::target`], clamped to it
    fn progress(&self, tally: &Tally) -> u32 {
        let raw = match *self {
            Self::BudgetsSet(_) => count(tally.budgets.len()),
            Self::ExpensesLogged(_) => tally.expenses,
            Self::UnderBudget(_) => count(tally.under_budget.len()),
            Self::ChartsViewed(_) => tally.charts,
            Self::CalculatorsUsed(_) => count(tally.calculators.len()),
            Self::ExportFormats(_) => count(tally.formats.len()),
            Self::ExpenseCategories(_) => count(tally.expense_categories.len()),
            Self::AlertsConfigured(_) => count(tally.alerts.len()),
            Self::GoalCalculations(_) => tally.goal_runs,
            Self::LoginStreak(_) => tally.longest_streak,
            Self::ChallengeCompleted(id) => u32::from(tally.completed.contains(&id)),
            Self::LevelReached(level) => u32::from(tally.level >= level),
        };
        raw.min(self.target())
    }

    fn is_met(&self, tally: &Tally) -> bool {
        self.progress(tally) >= self.target()
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// A challenge in the rule table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Challenge {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub points: u32,
    pub criterion: Criterion,
}

/// A badge in the rule table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BadgeRule {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub criterion: Criterion,
}

pub const CHALLENGES: [Challenge; 10] = [
    Challenge {
        id: 1,
        name: "Budget Master",
        description: "Create a budget for at least 5 categories",
        category: "budgeting",
        points: 30,
        criterion: Criterion::BudgetsSet(5),
    },
    Challenge {
        id: 2,
        name: "Expense Tracker",
        description: "Log 10 expenses",
        category: "tracking",
        points: 20,
        criterion: Criterion::ExpensesLogged(10),
    },
    Challenge {
        id: 3,
        name: "Saving Star",
        description: "Stay under budget for 3 categories in a month",
        category: "saving",
        points: 50,
        criterion: Criterion::UnderBudget(3),
    },
    Challenge {
        id: 4,
        name: "Data Analyst",
        description: "View 5 data visualizations",
        category: "analysis",
        points: 25,
        criterion: Criterion::ChartsViewed(5),
    },
    Challenge {
        id: 5,
        name: "Investment Guru",
        description: "Use all investment calculators at least once",
        category: "investing",
        points: 40,
        criterion: Criterion::CalculatorsUsed(4),
    },
    Challenge {
        id: 6,
        name: "Export Expert",
        description: "Export your financial data in all available formats",
        category: "reports",
        points: 15,
        criterion: Criterion::ExportFormats(3),
    },
    Challenge {
        id: 7,
        name: "Category Creator",
        description: "Add expenses in 8 different categories",
        category: "tracking",
        points: 35,
        criterion: Criterion::ExpenseCategories(8),
    },
    Challenge {
        id: 8,
        name: "Notification Ninja",
        description: "Set up budget alerts for 3 categories",
        category: "budgeting",
        points: 30,
        criterion: Criterion::AlertsConfigured(3),
    },
    Challenge {
        id: 9,
        name: "Goal Setter",
        description: "Calculate SIP for 3 different financial goals",
        category: "investing",
        points: 45,
        criterion: Criterion::GoalCalculations(3),
    },
    Challenge {
        id: 10,
        name: "Streak Keeper",
        description: "Maintain a 5-day login streak",
        category: "engagement",
        points: 40,
        criterion: Criterion::LoginStreak(5),
    },
];

pub const BADGES: [BadgeRule; 10] = [
    BadgeRule {
        id: "weekly_warrior",
        name: "Weekly Warrior",
        description: "Logged in for 7 consecutive days",
        points: BADGE_POINTS,
        criterion: Criterion::LoginStreak(7),
    },
    BadgeRule {
        id: "monthly_maven",
        name: "Monthly Maven",
        description: "Logged in for 30 consecutive days",
        points: BADGE_POINTS,
        criterion: Criterion::LoginStreak(30),
    },
    BadgeRule {
        id: "centurion",
        name: "Centurion",
        description: "Logged in for 100 consecutive days",
        points: BADGE_POINTS,
        criterion: Criterion::LoginStreak(100),
    },
    BadgeRule {
        id: "budget_planner",
        name: "Budget Planner",
        description: "Created budgets for multiple categories",
        points: BADGE_POINTS,
        criterion: Criterion::ChallengeCompleted(1),
    },
    BadgeRule {
        id: "saving_champion",
        name: "Saving Champion",
        description: "Stayed under budget consistently",
        points: BADGE_POINTS,
        criterion: Criterion::ChallengeCompleted(3),
    },
    BadgeRule {
        id: "investment_planner",
        name: "Investment Planner",
        description: "Mastered all investment calculators",
        points: BADGE_POINTS,
        criterion: Criterion::ChallengeCompleted(5),
    },
    BadgeRule {
        id: "consistency_king",
        name: "Consistency King",
        description: "Maintained a solid login streak",
        points: BADGE_POINTS,
        criterion: Criterion::ChallengeCompleted(10),
    },
    BadgeRule {
        id: "finance_apprentice",
        name: "Finance Apprentice",
        description: "Reached level 5",
        points: 0,
        criterion: Criterion::LevelReached(5),
    },
    BadgeRule {
        id: "finance_expert",
        name: "Finance Expert",
        description: "Reached level 10",
        points: 0,
        criterion: Criterion::LevelReached(10),
    },
    BadgeRule {
        id: "finance_master",
        name: "Finance Master",
        description: "Reached level 20",
        points: 0,
        criterion: Criterion::LevelReached(20),
    },
];

/// Points needed to reach `level`. Level 1 is free; each level after that
/// doubles the requirement, starting at 100 for level 2.
pub fn points_for_level(level: u32) -> u32 {
    if level <= 1 {
        return 0;
    }
    1u32.checked_shl(level - 2)
        .and_then(|factor| factor.checked_mul(100))
        .unwrap_or(u32::MAX)
}

pub fn level_for_points(points: u32) -> u32 {
    let mut level = 1;
    while level < 32 && points >= points_for_level(level + 1) {
        level += 1;
    }
    level
}

/// Daily bonus for a streak that just grew to `streak` days
pub fn streak_points(streak: u32) -> u32 {
    (10 + (streak / 5) * 5).min(MAX_STREAK_POINTS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarnedBadge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub earned_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub points: u32,
    pub progress: u32,
    pub target: u32,
    pub completed_on: Option<NaiveDate>,
}

impl ChallengeProgress {
    pub fn is_completed(&self) -> bool {
        self.completed_on.is_some()
    }
}

/// One line of the points history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub date: NaiveDate,
    pub points: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub points: u32,
    pub level: u32,
    /// Points at which the next level starts
    pub next_level_points: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_login: Option<NaiveDate>,
    pub badges: Vec<EarnedBadge>,
    pub challenges: Vec<ChallengeProgress>,
    pub history: Vec<PointsEntry>,
}

impl Profile {
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }

    pub fn challenge(&self, id: u32) -> Option<&ChallengeProgress> {
        self.challenges.iter().find(|c| c.id == id)
    }

    pub fn completed_challenges(&self) -> usize {
        self.challenges.iter().filter(|c| c.is_completed()).count()
    }
}

/// Counters accumulated while replaying the log
#[derive(Debug)]
struct Tally {
    budgets: BTreeSet<String>,
    expenses: u32,
    expense_categories: BTreeSet<String>,
    under_budget: BTreeSet<String>,
    charts: u32,
    calculators: HashSet<CalculatorKind>,
    goal_runs: u32,
    formats: HashSet<ExportFormat>,
    alerts: BTreeSet<String>,
    longest_streak: u32,
    completed: BTreeSet<u32>,
    level: u32,
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            budgets: BTreeSet::new(),
            expenses: 0,
            expense_categories: BTreeSet::new(),
            under_budget: BTreeSet::new(),
            charts: 0,
            calculators: HashSet::new(),
            goal_runs: 0,
            formats: HashSet::new(),
            alerts: BTreeSet::new(),
            longest_streak: 0,
            completed: BTreeSet::new(),
            level: 1,
        }
    }
}

struct Replay<'a> {
    engine: &'a GamificationEngine,
    tally: Tally,
    points: u32,
    current_streak: u32,
    last_login: Option<NaiveDate>,
    completed_on: Vec<Option<NaiveDate>>,
    badges: Vec<EarnedBadge>,
    history: Vec<PointsEntry>,
}

impl<'a> Replay<'a> {
    fn new(engine: &'a GamificationEngine) -> Self {
        Self {
            engine,
            tally: Tally::default(),
            points: 0,
            current_streak: 0,
            last_login: None,
            completed_on: vec![None; engine.challenges.len()],
            badges: Vec::new(),
            history: Vec::new(),
        }
    }

    fn award(&mut self, date: NaiveDate, points: u32, reason: String) {
        if points == 0 {
            return;
        }
        self.points = self.points.saturating_add(points);
        self.history.push(PointsEntry {
            date,
            points,
            reason,
        });
    }

    fn login(&mut self, date: NaiveDate) {
        match self.last_login {
            None => {
                self.current_streak = 1;
                self.award(date, LOGIN_POINTS, "First login".to_string());
            }
            Some(last) if date <= last => return,
            Some(last) if (date - last).num_days() == 1 => {
                self.current_streak += 1;
                let bonus = streak_points(self.current_streak);
                self.award(
                    date,
                    bonus,
                    format!("Daily streak: {} days", self.current_streak),
                );
            }
            Some(_) => {
                self.current_streak = 1;
                self.award(date, LOGIN_POINTS, "Welcome back".to_string());
            }
        }
        self.last_login = Some(date);
        self.tally.longest_streak = self.tally.longest_streak.max(self.current_streak);
    }

    fn apply(&mut self, activity: &Activity) {
        if activity.kind == ActivityKind::Login {
            self.login(activity.date);
            self.settle(activity.date);
            return;
        }

        let tally = &mut self.tally;
        match &activity.kind {
            ActivityKind::Login => {}
            ActivityKind::ExpenseLogged { category } => {
                tally.expenses += 1;
                tally.expense_categories.insert(category.to_lowercase());
            }
            ActivityKind::BudgetSet { category } => {
                tally.budgets.insert(category.to_lowercase());
            }
            ActivityKind::CalculatorUsed { calculator } => {
                if *calculator != CalculatorKind::Retirement {
                    tally.calculators.insert(*calculator);
                }
                if *calculator == CalculatorKind::Goal {
                    tally.goal_runs += 1;
                }
            }
            ActivityKind::ChartViewed => tally.charts += 1,
            ActivityKind::Exported { format } => {
                tally.formats.insert(*format);
            }
            ActivityKind::AlertConfigured { category } => {
                tally.alerts.insert(category.to_lowercase());
            }
            ActivityKind::StayedUnderBudget { category } => {
                tally.under_budget.insert(category.to_lowercase());
            }
        }
        self.settle(activity.date);
    }

    /// Complete challenges, earn badges and level up until nothing changes
    fn settle(&mut self, date: NaiveDate) {
        let engine = self.engine;
        loop {
            let mut changed = false;

            for (idx, challenge) in engine.challenges.iter().enumerate() {
                if self.completed_on[idx].is_none() && challenge.criterion.is_met(&self.tally) {
                    self.completed_on[idx] = Some(date);
                    self.tally.completed.insert(challenge.id);
                    self.award(
                        date,
                        challenge.points,
                        format!("Challenge completed: {}", challenge.name),
                    );
                    changed = true;
                }
            }

            for rule in engine.badges {
                if !self.badges.iter().any(|b| b.id == rule.id) && rule.criterion.is_met(&self.tally) {
                    self.badges.push(EarnedBadge {
                        id: rule.id.to_string(),
                        name: rule.name.to_string(),
                        description: rule.description.to_string(),
                        earned_on: date,
                    });
                    self.award(date, rule.points, format!("Badge earned: {}", rule.name));
                    changed = true;
                }
            }

            let level = level_for_points(self.points);
            if level != self.tally.level {
                self.tally.level = level;
                changed = true;
            }

            if !changed {
                break;
            }
        }
    }

    fn finish(self) -> Profile {
        let challenges = self
            .engine
            .challenges
            .iter()
            .zip(self.completed_on.iter())
            .map(|(challenge, completed_on)| ChallengeProgress {
                id: challenge.id,
                name: challenge.name.to_string(),
                description: challenge.description.to_string(),
                category: challenge.category.to_string(),
                points: challenge.points,
                progress: challenge.criterion.progress(&self.tally),
                target: challenge.criterion.target(),
                completed_on: *completed_on,
            })
            .collect();

        Profile {
            points: self.points,
            level: self.tally.level,
            next_level_points: points_for_level(self.tally.level + 1),
            current_streak: self.current_streak,
            longest_streak: self.tally.longest_streak,
            last_login: self.last_login,
            badges: self.badges,
            challenges,
            history: self.history,
        }
    }
}

/// Evaluates an activity log against the challenge and badge tables
#[derive(Debug, Clone, Copy)]
pub struct GamificationEngine {
    challenges: &'static [Challenge],
    badges: &'static [BadgeRule],
}

impl Default for GamificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GamificationEngine {
    pub fn new() -> Self {
        Self {
            challenges: &CHALLENGES,
            badges: &BADGES,
        }
    }

    pub fn challenges(&self) -> &'static [Challenge] {
        self.challenges
    }

    pub fn badges(&self) -> &'static [BadgeRule] {
        self.badges
    }

    /// Rebuild the profile from the activity log
    pub fn evaluate(&self, log: &[Activity]) -> Profile {
        let mut ordered: Vec<&Activity> = log.iter().collect();
        ordered.sort_by_key(|a| a.date);

        let mut replay = Replay::new(self);
        for activity in ordered {
            replay.apply(activity);
        }
        let profile = replay.finish();

        debug!(
            activities = log.len(),
            points = profile.points,
            level = profile.level,
            badges = profile.badges.len(),
            "Evaluated gamification profile"
        );
        profile
    }
}
