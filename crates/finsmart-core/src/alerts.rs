//! Budget alerts
//!
//! Deciding whether a category deserves an alert is a pure function of spend,
//! limit and threshold. Delivery goes through the [`SmsGateway`] collaborator;
//! the [`AlertLedger`] makes sure each category alerts at most once a month.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::budget::BudgetAllocator;
use crate::error::{Error, Result};

/// Fires when `spend / limit >= threshold_pct` (threshold as a fraction, 0.8 = 80%).
///
/// A category without a positive limit never alerts.
pub fn should_alert(spend: f64, limit: f64, threshold_pct: f64) -> bool {
    if !(limit > 0.0) || !spend.is_finite() || !threshold_pct.is_finite() {
        return false;
    }
    spend / limit >= threshold_pct
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Past the threshold but still within the limit
    Warning,
    /// At or over the limit
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A category that crossed the alert threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub category: String,
    pub limit: f64,
    pub spent: f64,
    pub percent_used: f64,
    pub level: AlertLevel,
}

impl BudgetAlert {
    /// SMS body for this alert
    pub fn message(&self, currency: &str) -> String {
        format!(
            "FinSmart Budget {level}:\n\
             Your {category} budget is at {percent:.1}%.\n\
             Budget: {cur}{limit:.2}\n\
             Spent: {cur}{spent:.2}\n\
             Remaining: {cur}{remaining:.2}\n\
             \n\
             Reply STOP to unsubscribe.",
            level = self.level,
            category = self.category,
            percent = self.percent_used,
            cur = currency,
            limit = self.limit,
            spent = self.spent,
            remaining = (self.limit - self.spent).max(0.0),
        )
    }

    /// Ledger key: one alert per category per calendar month
    pub fn ledger_key(&self, on: NaiveDate) -> String {
        format!("{}:{:04}-{:02}", self.category, on.year(), on.month())
    }
}

/// Every budgeted category of `allocator` at or past `threshold_pct`
pub fn evaluate(allocator: &BudgetAllocator, threshold_pct: f64) -> Vec<BudgetAlert> {
    allocator
        .status()
        .into_iter()
        .filter(|s| should_alert(s.spent, s.limit, threshold_pct))
        .map(|s| BudgetAlert {
            level: if s.spent >= s.limit {
                AlertLevel::Critical
            } else {
                AlertLevel::Warning
            },
            category: s.category,
            limit: s.limit,
            spent: s.spent,
            percent_used: s.percent_used,
        })
        .collect()
}

/// Put a phone number in international form, prefixing `default_country_code`
/// when the number has no `+`
pub fn normalize_phone(number: &str, default_country_code: &str) -> Result<String> {
    let compact: String = number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '(' && *c != ')')
        .collect();

    let (has_plus, digits) = match compact.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, compact.as_str()),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::invalid(format!("invalid phone number: {:?}", number)));
    }

    if has_plus {
        Ok(format!("+{}", digits))
    } else {
        let code = default_country_code.trim_start_matches('+');
        Ok(format!("+{}{}", code, digits))
    }
}

/// The SMS collaborator. Implementations own the actual delivery.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Human-readable name for this gateway
    fn name(&self) -> &str;

    /// Deliver `message` to `phone`, returning the gateway's message reference
    async fn send(&self, phone: &str, message: &str) -> Result<String>;
}

/// Gateway that writes messages to the log instead of sending them
#[derive(Debug, Default)]
pub struct LogGateway;

#[async_trait]
impl SmsGateway for LogGateway {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, phone: &str, message: &str) -> Result<String> {
        info!(to = phone, "SMS alert:\n{}", message);
        Ok(format!("log:{}", phone))
    }
}

/// Outcome of one dispatch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Categories delivered in this run
    pub sent: Vec<String>,
    /// Categories already alerted this month
    pub skipped: Vec<String>,
    /// Categories whose delivery failed, with the gateway error
    pub failed: Vec<(String, String)>,
}

/// Remembers which categories were alerted in which month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertLedger {
    keys: BTreeSet<String>,
}

impl AlertLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_sent(&self, alert: &BudgetAlert, on: NaiveDate) -> bool {
        self.keys.contains(&alert.ledger_key(on))
    }

    pub fn mark_sent(&mut self, alert: &BudgetAlert, on: NaiveDate) {
        self.keys.insert(alert.ledger_key(on));
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Send every alert not yet delivered this month.
    ///
    /// Only successful deliveries are recorded, so failed ones are retried on
    /// the next run.
    pub async fn dispatch(
        &mut self,
        gateway: &dyn SmsGateway,
        phone: &str,
        alerts: &[BudgetAlert],
        today: NaiveDate,
        currency: &str,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for alert in alerts {
            if self.already_sent(alert, today) {
                report.skipped.push(alert.category.clone());
                continue;
            }
            match gateway.send(phone, &alert.message(currency)).await {
                Ok(reference) => {
                    info!(
                        category = %alert.category,
                        gateway = gateway.name(),
                        reference = %reference,
                        "Budget alert sent"
                    );
                    self.mark_sent(alert, today);
                    report.sent.push(alert.category.clone());
                }
                Err(e) => {
                    warn!(
                        category = %alert.category,
                        gateway = gateway.name(),
                        error = %e,
                        "Budget alert delivery failed"
                    );
                    report.failed.push((alert.category.clone(), e.to_string()));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Gateway that records messages and fails for numbers listed in `reject`
    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<(String, String)>>,
        reject: Vec<String>,
    }

    #[async_trait]
    impl SmsGateway for RecordingGateway {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, phone: &str, message: &str) -> Result<String> {
            if self.reject.iter().any(|r| r == phone) {
                return Err(Error::Delivery("number unreachable".to_string()));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((phone.to_string(), message.to_string()));
            Ok(format!("msg-{}", sent.len()))
        }
    }

    fn allocator_with_spend(spend: &[(&str, f64, f64)]) -> BudgetAllocator {
        let budgets: Vec<_> = spend
            .iter()
            .map(|(c, limit, _)| {
                crate::models::BudgetCategory::new(*c, *limit, Default::default()).unwrap()
            })
            .collect();
        let mut allocator = BudgetAllocator::from_limits(&budgets).unwrap();
        for (c, _, spent) in spend {
            allocator.record_spend(c, *spent).unwrap();
        }
        allocator
    }

    #[test]
    fn test_should_alert_threshold() {
        assert!(should_alert(80.0, 100.0, 0.75));
        assert!(!should_alert(70.0, 100.0, 0.75));
        assert!(should_alert(75.0, 100.0, 0.75));
        assert!(!should_alert(10.0, 0.0, 0.5));
        assert!(!should_alert(f64::NAN, 100.0, 0.5));
    }

    #[test]
    fn test_evaluate_levels() {
        let allocator = allocator_with_spend(&[
            ("Food", 1000.0, 850.0),
            ("Rent", 500.0, 520.0),
            ("Fun", 200.0, 20.0),
        ]);
        let alerts = evaluate(&allocator, 0.8);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].category, "Food");
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(alerts[1].level, AlertLevel::Critical);
    }

    #[test]
    fn test_message_floors_remaining() {
        let alert = BudgetAlert {
            category: "Rent".to_string(),
            limit: 500.0,
            spent: 520.0,
            percent_used: 104.0,
            level: AlertLevel::Critical,
        };
        let message = alert.message("₹");
        assert!(message.starts_with("FinSmart Budget CRITICAL:"));
        assert!(message.contains("Your Rent budget is at 104.0%."));
        assert!(message.contains("Spent: ₹520.00"));
        assert!(message.contains("Remaining: ₹0.00"));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("98765 43210", "+91").unwrap(), "+919876543210");
        assert_eq!(normalize_phone("+1 (555) 010-9999", "+91").unwrap(), "+15550109999");
        assert_eq!(normalize_phone("5550109999", "1").unwrap(), "+15550109999");
        assert!(normalize_phone("", "+91").is_err());
        assert!(normalize_phone("call me", "+91").is_err());
    }

    #[tokio::test]
    async fn test_dispatch_once_per_month() {
        let allocator = allocator_with_spend(&[("Food", 1000.0, 900.0)]);
        let alerts = evaluate(&allocator, 0.8);
        let gateway = RecordingGateway::default();
        let mut ledger = AlertLedger::new();

        let report = ledger
            .dispatch(&gateway, "+911234567890", &alerts, date(2024, 6, 3), "₹")
            .await;
        assert_eq!(report.sent, vec!["Food".to_string()]);

        let report = ledger
            .dispatch(&gateway, "+911234567890", &alerts, date(2024, 6, 20), "₹")
            .await;
        assert!(report.sent.is_empty());
        assert_eq!(report.skipped, vec!["Food".to_string()]);

        // A new month alerts again
        let report = ledger
            .dispatch(&gateway, "+911234567890", &alerts, date(2024, 7, 1), "₹")
            .await;
        assert_eq!(report.sent.len(), 1);
        assert_eq!(gateway.sent.lock().unwrap().len(), 2);
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_not_recorded() {
        let allocator = allocator_with_spend(&[("Food", 100.0, 100.0)]);
        let alerts = evaluate(&allocator, 0.8);
        let gateway = RecordingGateway {
            reject: vec!["+10000000000".to_string()],
            ..Default::default()
        };
        let mut ledger = AlertLedger::new();

        let report = ledger
            .dispatch(&gateway, "+10000000000", &alerts, date(2024, 6, 3), "$")
            .await;
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].1.contains("unreachable"));
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_log_gateway() {
        let reference = LogGateway.send("+15550100", "hello").await.unwrap();
        assert_eq!(reference, "log:+15550100");
    }
}
