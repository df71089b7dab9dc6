use anyhow::Result;
use async_trait::async_trait;
use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::debug;

use fintrack_data::{
    AlertLevel, Budget, BudgetAlert, BudgetFilter, Insert, Query, Transaction,
    TransactionFilter, TransactionKind, Upsert,
};

use crate::stats::budget_usage;

/// Percent of the budget limit at which a warning alert is raised.
pub const WARNING_THRESHOLD: u32 = 75;
/// Percent of the budget limit at which a critical alert is raised.
pub const CRITICAL_THRESHOLD: u32 = 90;

/// Alert level for a percentage of budget used. Critical wins over
/// warning; below the warning threshold no alert is due.
pub fn alert_level(percentage: Decimal) -> Option<AlertLevel> {
    if percentage >= Decimal::from(CRITICAL_THRESHOLD) {
        Some(AlertLevel::Critical)
    } else if percentage >= Decimal::from(WARNING_THRESHOLD) {
        Some(AlertLevel::Warning)
    } else {
        None
    }
}

#[async_trait]
pub trait CheckBudgetAlerts {
    /// Evaluate the budget matching this transaction and ensure the
    /// due alert exists.
    ///
    /// Runs after every transaction write. Income transactions and
    /// transactions without a budget for their (user, category,
    /// month, year) are a no-op. Otherwise the month's spending is
    /// recomputed and, when it crosses a threshold, an alert for
    /// that level is upserted: created with a snapshot of the spend
    /// and percentage, or left exactly as it was if one already
    /// exists for the same (user, budget, level) key.
    ///
    /// Returns the alert now covering the crossing, if any.
    async fn check_budget_alerts<DB>(&self, db: &DB) -> Result<Option<BudgetAlert>>
    where
        DB: Query<Budget, Filter = BudgetFilter>
            + Query<Transaction, Filter = TransactionFilter>
            + Upsert<BudgetAlert>
            + Send
            + Sync;
}

#[async_trait]
impl CheckBudgetAlerts for Transaction {
    async fn check_budget_alerts<DB>(&self, db: &DB) -> Result<Option<BudgetAlert>>
    where
        DB: Query<Budget, Filter = BudgetFilter>
            + Query<Transaction, Filter = TransactionFilter>
            + Upsert<BudgetAlert>
            + Send
            + Sync,
    {
        if self.kind != TransactionKind::Expense {
            return Ok(None);
        }

        // The budget for the month the transaction falls into.
        // There is at most one per (user, category, month, year).
        let budget: Option<Budget> = db
            .query(&BudgetFilter {
                user_id: Some(self.user_id),
                category: Some(self.category),
                month: Some(self.date.month()),
                year: Some(self.date.year()),
                ..Default::default()
            })
            .await?
            .pop();

        let budget = match budget {
            Some(budget) => budget,
            None => {
                debug!(
                    user_id = self.user_id,
                    category = self.category.as_str(),
                    "no budget set, skipping alert evaluation"
                );
                return Ok(None);
            }
        };

        let usage = budget_usage(db, &budget).await?;

        let level = match alert_level(usage.percentage) {
            Some(level) => level,
            None => return Ok(None),
        };

        debug!(
            budget_id = budget.id,
            spent = %usage.spent,
            percentage = %usage.percentage,
            level = level.as_str(),
            "budget threshold crossed"
        );

        let alert = db
            .upsert(BudgetAlert {
                user_id: self.user_id,
                budget_id: budget.id,
                level,
                spent_amount: usage.spent,
                percentage: usage.percentage,
                ..Default::default()
            })
            .await?;

        Ok(Some(alert))
    }
}

#[async_trait]
pub trait RecordTransaction: Sized {
    /// Persist a transaction and evaluate budget alerts for it.
    ///
    /// The insert and the alert write are two separate store calls;
    /// parallel writers are serialized only by the alert upsert's
    /// unique key.
    async fn record<DB>(self, db: &DB) -> Result<(Transaction, Option<BudgetAlert>)>
    where
        DB: Insert<Transaction>
            + Query<Budget, Filter = BudgetFilter>
            + Query<Transaction, Filter = TransactionFilter>
            + Upsert<BudgetAlert>
            + Send
            + Sync;
}

#[async_trait]
impl RecordTransaction for Transaction {
    async fn record<DB>(self, db: &DB) -> Result<(Transaction, Option<BudgetAlert>)>
    where
        DB: Insert<Transaction>
            + Query<Budget, Filter = BudgetFilter>
            + Query<Transaction, Filter = TransactionFilter>
            + Upsert<BudgetAlert>
            + Send
            + Sync,
    {
        let transaction = db.insert(self).await?;
        let alert = transaction.check_budget_alerts(db).await?;
        Ok((transaction, alert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use fintrack_data::{BudgetAlertFilter, Category, User};
    use fintrack_db::Connection;

    async fn test_user(conn: &Connection) -> User {
        conn.insert(User {
            username: "erin".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    fn expense(user: &User, amount: u32, date: NaiveDate) -> Transaction {
        Transaction {
            user_id: user.id,
            kind: TransactionKind::Expense,
            category: Category::Food,
            amount: Decimal::from(amount),
            date,
            ..Default::default()
        }
    }

    async fn food_budget(conn: &Connection, user: &User, limit: u32) -> Budget {
        conn.insert(Budget {
            user_id: user.id,
            category: Category::Food,
            limit: Decimal::from(limit),
            month: 1,
            year: 2024,
            ..Default::default()
        })
        .await
        .unwrap()
    }

    async fn all_alerts(conn: &Connection, user: &User) -> Vec<BudgetAlert> {
        conn.query(&BudgetAlertFilter {
            user_id: Some(user.id),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[test]
    fn test_alert_level_thresholds() {
        assert_eq!(alert_level(Decimal::from(50)), None);
        assert_eq!(alert_level(Decimal::new(7499, 2)), None);
        assert_eq!(alert_level(Decimal::from(75)), Some(AlertLevel::Warning));
        assert_eq!(alert_level(Decimal::from(89)), Some(AlertLevel::Warning));
        assert_eq!(alert_level(Decimal::from(90)), Some(AlertLevel::Critical));
        assert_eq!(alert_level(Decimal::from(240)), Some(AlertLevel::Critical));
    }

    #[tokio::test]
    async fn test_no_budget_no_alert() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let (_, alert) = expense(&user, 95, date).record(&conn).await.unwrap();
        assert!(alert.is_none());
        assert!(all_alerts(&conn, &user).await.is_empty());
    }

    #[tokio::test]
    async fn test_critical_alert_on_high_spending() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        food_budget(&conn, &user, 100).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let (_, alert) = expense(&user, 95, date).record(&conn).await.unwrap();
        let alert = alert.unwrap();
        assert_eq!(alert.level, AlertLevel::Critical);
        assert_eq!(alert.spent_amount, Decimal::from(95));
        assert_eq!(alert.percentage, Decimal::from(95));

        assert_eq!(all_alerts(&conn, &user).await.len(), 1);
    }

    #[tokio::test]
    async fn test_warning_alert() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        food_budget(&conn, &user, 100).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let (_, alert) = expense(&user, 80, date).record(&conn).await.unwrap();
        assert_eq!(alert.unwrap().level, AlertLevel::Warning);
    }

    #[tokio::test]
    async fn test_below_warning_no_alert() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        food_budget(&conn, &user, 100).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let (_, alert) = expense(&user, 50, date).record(&conn).await.unwrap();
        assert!(alert.is_none());
        assert!(all_alerts(&conn, &user).await.is_empty());
    }

    #[tokio::test]
    async fn test_alert_snapshot_is_not_refreshed() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        food_budget(&conn, &user, 100).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let (_, alert) = expense(&user, 80, date).record(&conn).await.unwrap();
        let first = alert.unwrap();

        // More spending within the same level: same row, stale
        // snapshot, still only one alert.
        let (_, alert) = expense(&user, 5, date).record(&conn).await.unwrap();
        let second = alert.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.spent_amount, Decimal::from(80));
        assert_eq!(second.percentage, Decimal::from(80));
        assert_eq!(all_alerts(&conn, &user).await.len(), 1);
    }

    #[tokio::test]
    async fn test_crossing_critical_adds_second_alert() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        let budget = food_budget(&conn, &user, 100).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let (_, alert) = expense(&user, 80, date).record(&conn).await.unwrap();
        assert_eq!(alert.unwrap().level, AlertLevel::Warning);

        let (_, alert) = expense(&user, 15, date).record(&conn).await.unwrap();
        let critical = alert.unwrap();
        assert_eq!(critical.level, AlertLevel::Critical);
        assert_eq!(critical.spent_amount, Decimal::from(95));

        // Warning and critical are distinct keys
        let alerts = budget.get_alerts(&conn).await.unwrap();
        assert_eq!(alerts.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_limit_never_divides() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        food_budget(&conn, &user, 0).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let (_, alert) = expense(&user, 50, date).record(&conn).await.unwrap();
        assert!(alert.is_none());
    }

    #[tokio::test]
    async fn test_income_is_ignored() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        food_budget(&conn, &user, 100).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let tx = Transaction {
            user_id: user.id,
            kind: TransactionKind::Income,
            category: Category::Food,
            amount: Decimal::from(500),
            date,
            ..Default::default()
        };
        let (_, alert) = tx.record(&conn).await.unwrap();
        assert!(alert.is_none());
        assert!(all_alerts(&conn, &user).await.is_empty());
    }

    #[tokio::test]
    async fn test_budget_month_bounds_aggregation() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        food_budget(&conn, &user, 100).await;

        // Spending in december does not count against january
        let december = NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
        let (_, alert) = expense(&user, 95, december).record(&conn).await.unwrap();
        assert!(alert.is_none());

        let january = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let (_, alert) = expense(&user, 80, january).record(&conn).await.unwrap();
        let alert = alert.unwrap();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.spent_amount, Decimal::from(80));
    }

    #[tokio::test]
    async fn test_update_reevaluates() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        food_budget(&conn, &user, 100).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let (tx, alert) = expense(&user, 50, date).record(&conn).await.unwrap();
        assert!(alert.is_none());

        use fintrack_data::Update;
        let tx = conn
            .update(Transaction {
                amount: Decimal::from(92),
                ..tx
            })
            .await
            .unwrap();
        let alert = tx.check_budget_alerts(&conn).await.unwrap().unwrap();
        assert_eq!(alert.level, AlertLevel::Critical);
        assert_eq!(alert.spent_amount, Decimal::from(92));
    }

    #[tokio::test]
    async fn test_decimal_percentage_is_exact() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;

        conn.insert(Budget {
            user_id: user.id,
            category: Category::Food,
            limit: Decimal::new(12050, 2), // 120.50
            month: 1,
            year: 2024,
            ..Default::default()
        })
        .await
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let tx = Transaction {
            user_id: user.id,
            kind: TransactionKind::Expense,
            category: Category::Food,
            amount: Decimal::new(9037, 2), // 90.37 -> 74.995...%
            date,
            ..Default::default()
        };
        let (_, alert) = tx.record(&conn).await.unwrap();
        assert!(alert.is_none());
    }
}
