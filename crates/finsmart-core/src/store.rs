//! Persistence for expenses, budgets and the activity log
//!
//! Two backends share one document layout:
//! - [`MemoryStore`] keeps everything in memory (server, tests)
//! - [`JsonFileStore`] writes the document to a JSON file after every change,
//!   replacing the file atomically

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::alerts::AlertLedger;
use crate::budget::{BudgetAllocator, DateRange};
use crate::error::{Error, Result};
use crate::models::{Activity, ActivityKind, BudgetCategory, ExpenseRecord, NewExpense};

/// Storage collaborator used by the CLI and the server
pub trait Store: Send + Sync {
    /// All expenses, oldest first
    fn expenses(&self) -> Result<Vec<ExpenseRecord>>;

    /// Store a new expense and log an `ExpenseLogged` activity for it
    fn add_expense(&self, expense: NewExpense) -> Result<ExpenseRecord>;

    fn budgets(&self) -> Result<Vec<BudgetCategory>>;

    /// Create or replace the budget with the same (case-insensitive) name
    /// and log a `BudgetSet` activity
    fn set_budget(&self, budget: BudgetCategory) -> Result<()>;

    fn remove_budget(&self, name: &str) -> Result<()>;

    fn activities(&self) -> Result<Vec<Activity>>;

    fn record_activity(&self, activity: Activity) -> Result<()>;

    fn alert_ledger(&self) -> Result<AlertLedger>;

    fn save_alert_ledger(&self, ledger: &AlertLedger) -> Result<()>;

    /// Expenses dated inside `range`
    fn expenses_in(&self, range: &DateRange) -> Result<Vec<ExpenseRecord>> {
        Ok(self
            .expenses()?
            .into_iter()
            .filter(|e| range.contains(e.date))
            .collect())
    }
}

/// Log `StayedUnderBudget` for every under-budget category of `allocator`,
/// at most once per category per month. Returns how many were logged.
pub fn record_under_budget(
    store: &dyn Store,
    allocator: &BudgetAllocator,
    on: NaiveDate,
) -> Result<usize> {
    let month = DateRange::month_of(on);
    let logged: Vec<String> = store
        .activities()?
        .into_iter()
        .filter(|a| month.contains(a.date))
        .filter_map(|a| match a.kind {
            ActivityKind::StayedUnderBudget { category } => Some(category),
            _ => None,
        })
        .collect();

    let mut recorded = 0;
    for category in allocator.under_budget_categories() {
        if logged.iter().any(|c| c == category) {
            continue;
        }
        store.record_activity(Activity::new(
            on,
            ActivityKind::StayedUnderBudget {
                category: category.to_string(),
            },
        ))?;
        recorded += 1;
    }
    Ok(recorded)
}

/// Everything a store holds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    next_id: i64,
    #[serde(default)]
    expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    budgets: Vec<BudgetCategory>,
    #[serde(default)]
    activities: Vec<Activity>,
    #[serde(default)]
    alert_ledger: AlertLedger,
}

impl Document {
    fn add_expense(&mut self, expense: NewExpense) -> Result<ExpenseRecord> {
        expense.validate()?;

        let id = self.next_id.max(self.expenses.iter().map(|e| e.id).max().unwrap_or(0)) + 1;
        self.next_id = id;

        let record = ExpenseRecord {
            id,
            date: expense.date,
            category: expense.category.trim().to_string(),
            amount: expense.amount,
            note: expense.note,
        };
        self.activities.push(Activity::new(
            record.date,
            ActivityKind::ExpenseLogged {
                category: record.category.clone(),
            },
        ));
        self.expenses.push(record.clone());
        Ok(record)
    }

    fn set_budget(&mut self, mut budget: BudgetCategory, today: NaiveDate) -> Result<()> {
        budget.validate()?;
        budget.name = budget.name.trim().to_string();

        match self
            .budgets
            .iter_mut()
            .find(|b| b.name.eq_ignore_ascii_case(&budget.name))
        {
            Some(existing) => *existing = budget.clone(),
            None => self.budgets.push(budget.clone()),
        }
        self.activities.push(Activity::new(
            today,
            ActivityKind::BudgetSet {
                category: budget.name,
            },
        ));
        Ok(())
    }

    fn remove_budget(&mut self, name: &str) -> Result<()> {
        let before = self.budgets.len();
        self.budgets.retain(|b| !b.name.eq_ignore_ascii_case(name.trim()));
        if self.budgets.len() == before {
            return Err(Error::NotFound(format!("budget {}", name)));
        }
        Ok(())
    }

    fn sorted_expenses(&self) -> Vec<ExpenseRecord> {
        let mut expenses = self.expenses.clone();
        expenses.sort_by_key(|e| (e.date, e.id));
        expenses
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Storage("store lock poisoned".to_string())
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RwLock<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Document>> {
        self.doc.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Document>> {
        self.doc.write().map_err(poisoned)
    }
}

impl Store for MemoryStore {
    fn expenses(&self) -> Result<Vec<ExpenseRecord>> {
        Ok(self.read()?.sorted_expenses())
    }

    fn add_expense(&self, expense: NewExpense) -> Result<ExpenseRecord> {
        self.write()?.add_expense(expense)
    }

    fn budgets(&self) -> Result<Vec<BudgetCategory>> {
        Ok(self.read()?.budgets.clone())
    }

    fn set_budget(&self, budget: BudgetCategory) -> Result<()> {
        self.write()?.set_budget(budget, Local::now().date_naive())
    }

    fn remove_budget(&self, name: &str) -> Result<()> {
        self.write()?.remove_budget(name)
    }

    fn activities(&self) -> Result<Vec<Activity>> {
        Ok(self.read()?.activities.clone())
    }

    fn record_activity(&self, activity: Activity) -> Result<()> {
        self.write()?.activities.push(activity);
        Ok(())
    }

    fn alert_ledger(&self) -> Result<AlertLedger> {
        Ok(self.read()?.alert_ledger.clone())
    }

    fn save_alert_ledger(&self, ledger: &AlertLedger) -> Result<()> {
        self.write()?.alert_ledger = ledger.clone();
        Ok(())
    }
}

/// Store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: RwLock<Document>,
}

impl JsonFileStore {
    /// Open the data file, starting empty when it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let doc: Document = serde_json::from_str(&raw)?;
            debug!(
                path = %path.display(),
                expenses = doc.expenses.len(),
                budgets = doc.budgets.len(),
                "Loaded data file"
            );
            doc
        } else {
            Document::default()
        };

        Ok(Self {
            path,
            doc: RwLock::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default data file location (`<data_local_dir>/finsmart/data.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("finsmart").join("data.json"))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Document>> {
        self.doc.read().map_err(poisoned)
    }

    /// Apply `change` and write the document back. The in-memory copy is
    /// only updated when the write succeeds.
    fn update<T>(&self, change: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let mut guard = self.doc.write().map_err(poisoned)?;
        let mut next = guard.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(out)
    }

    fn persist(&self, doc: &Document) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(temp.as_file_mut(), doc)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn expenses(&self) -> Result<Vec<ExpenseRecord>> {
        Ok(self.read()?.sorted_expenses())
    }

    fn add_expense(&self, expense: NewExpense) -> Result<ExpenseRecord> {
        let record = self.update(|doc| doc.add_expense(expense))?;
        info!(id = record.id, category = %record.category, amount = record.amount, "Logged expense");
        Ok(record)
    }

    fn budgets(&self) -> Result<Vec<BudgetCategory>> {
        Ok(self.read()?.budgets.clone())
    }

    fn set_budget(&self, budget: BudgetCategory) -> Result<()> {
        let name = budget.name.clone();
        let limit = budget.limit;
        self.update(|doc| doc.set_budget(budget, Local::now().date_naive()))?;
        info!(category = %name, limit, "Saved budget");
        Ok(())
    }

    fn remove_budget(&self, name: &str) -> Result<()> {
        self.update(|doc| doc.remove_budget(name))?;
        info!(category = name, "Removed budget");
        Ok(())
    }

    fn activities(&self) -> Result<Vec<Activity>> {
        Ok(self.read()?.activities.clone())
    }

    fn record_activity(&self, activity: Activity) -> Result<()> {
        self.update(|doc| {
            doc.activities.push(activity);
            Ok(())
        })
    }

    fn alert_ledger(&self) -> Result<AlertLedger> {
        Ok(self.read()?.alert_ledger.clone())
    }

    fn save_alert_ledger(&self, ledger: &AlertLedger) -> Result<()> {
        self.update(|doc| {
            doc.alert_ledger = ledger.clone();
            Ok(())
        })
    }
}
