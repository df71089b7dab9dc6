use anyhow::Result;
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use fintrack_data::{
    Budget, BudgetAlert, BudgetAlertFilter, Category, Query, Transaction,
    TransactionFilter, TransactionKind,
};

use crate::datetime::{month_bounds, MonthWindow};

/// Total over a set of transactions; an empty set sums to zero.
pub fn total_amount(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(|tx| tx.amount).sum()
}

/// Share of a limit used by the spent amount, in percent.
/// A zero limit never divides and always reads as zero.
pub fn percentage_used(spent: Decimal, limit: Decimal) -> Decimal {
    if limit > Decimal::ZERO {
        spent / limit * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Income, spending and balance of one calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStats {
    pub month: u32,
    pub year: i32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

/// Aggregate all transactions of a user in a calendar month.
pub async fn monthly_stats<DB>(
    db: &DB,
    user_id: u32,
    month: u32,
    year: i32,
) -> Result<MonthlyStats>
where
    DB: Query<Transaction, Filter = TransactionFilter>,
{
    let (first, last) = month_bounds(year, month);
    let transactions = db
        .query(&TransactionFilter {
            user_id: Some(user_id),
            date_after: Some(first),
            date_before: Some(last),
            ..Default::default()
        })
        .await?;

    let income: Decimal = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Income)
        .map(|tx| tx.amount)
        .sum();
    let expenses: Decimal = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
        .map(|tx| tx.amount)
        .sum();

    Ok(MonthlyStats {
        month,
        year,
        income,
        expenses,
        balance: income - expenses,
    })
}

/// Spending per category in a calendar month, in category order,
/// omitting categories without any spending.
pub async fn category_breakdown<DB>(
    db: &DB,
    user_id: u32,
    month: u32,
    year: i32,
) -> Result<Vec<(Category, Decimal)>>
where
    DB: Query<Transaction, Filter = TransactionFilter>,
{
    let (first, last) = month_bounds(year, month);
    let expenses = db
        .query(&TransactionFilter {
            user_id: Some(user_id),
            kind: Some(TransactionKind::Expense),
            date_after: Some(first),
            date_before: Some(last),
            ..Default::default()
        })
        .await?;

    let mut breakdown = Vec::new();
    for category in Category::ALL {
        let total: Decimal = expenses
            .iter()
            .filter(|tx| tx.category == category)
            .map(|tx| tx.amount)
            .sum();
        if total > Decimal::ZERO {
            breakdown.push((category, total));
        }
    }
    Ok(breakdown)
}

/// Monthly stats for the `months` calendar months up to and
/// including the month of `until`, oldest first.
pub async fn spending_trends<DB>(
    db: &DB,
    user_id: u32,
    months: u32,
    until: NaiveDate,
) -> Result<Vec<MonthlyStats>>
where
    DB: Query<Transaction, Filter = TransactionFilter>,
{
    let mut trends = Vec::new();
    for back in (0..months).rev() {
        let date = until.checked_sub_months(Months::new(back)).unwrap();
        let stats = monthly_stats(db, user_id, date.month(), date.year()).await?;
        trends.push(stats);
    }
    Ok(trends)
}

/// A budget together with its current spending.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetUsage {
    pub budget: Budget,
    pub spent: Decimal,
    pub percentage: Decimal,
}

/// Compute the spending recorded against a budget: the sum of all
/// expense transactions of the budget's user and category within
/// its calendar month.
pub async fn budget_usage<DB>(db: &DB, budget: &Budget) -> Result<BudgetUsage>
where
    DB: Query<Transaction, Filter = TransactionFilter>,
{
    let (first, last) = budget.month_window();
    let expenses = db
        .query(&TransactionFilter {
            user_id: Some(budget.user_id),
            kind: Some(TransactionKind::Expense),
            category: Some(budget.category),
            date_after: Some(first),
            date_before: Some(last),
            ..Default::default()
        })
        .await?;

    let spent = total_amount(&expenses);
    Ok(BudgetUsage {
        budget: budget.clone(),
        spent,
        percentage: percentage_used(spent, budget.limit),
    })
}

/// Headline numbers for one month plus the unread alert count.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub transactions: usize,
    pub unread_alerts: usize,
}

pub async fn dashboard_stats<DB>(
    db: &DB,
    user_id: u32,
    month: u32,
    year: i32,
) -> Result<DashboardStats>
where
    DB: Query<Transaction, Filter = TransactionFilter>
        + Query<BudgetAlert, Filter = BudgetAlertFilter>,
{
    let (first, last) = month_bounds(year, month);
    let transactions: Vec<Transaction> = db
        .query(&TransactionFilter {
            user_id: Some(user_id),
            date_after: Some(first),
            date_before: Some(last),
            ..Default::default()
        })
        .await?;
    let unread: Vec<BudgetAlert> = db
        .query(&BudgetAlertFilter {
            user_id: Some(user_id),
            is_read: Some(false),
            ..Default::default()
        })
        .await?;

    let total_income: Decimal = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Income)
        .map(|tx| tx.amount)
        .sum();
    let total_expenses: Decimal = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
        .map(|tx| tx.amount)
        .sum();

    Ok(DashboardStats {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        transactions: transactions.len(),
        unread_alerts: unread.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fintrack_db::Connection;
    use fintrack_data::{Insert, User};

    async fn test_user(conn: &Connection) -> User {
        conn.insert(User {
            username: "erin".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    async fn record(
        conn: &Connection,
        user: &User,
        kind: TransactionKind,
        category: Category,
        amount: u32,
        date: NaiveDate,
    ) {
        conn.insert(Transaction {
            user_id: user.id,
            kind,
            category,
            amount: Decimal::from(amount),
            date,
            ..Default::default()
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_percentage_used() {
        assert_eq!(
            percentage_used(Decimal::from(95), Decimal::from(100)),
            Decimal::from(95)
        );
        assert_eq!(
            percentage_used(Decimal::from(50), Decimal::from(200)),
            Decimal::from(25)
        );
        // Zero limit short circuits instead of dividing
        assert_eq!(
            percentage_used(Decimal::from(50), Decimal::ZERO),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_total_amount_empty() {
        assert_eq!(total_amount(&[]), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_monthly_stats() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        record(&conn, &user, TransactionKind::Income, Category::Salary, 3000, date).await;
        record(&conn, &user, TransactionKind::Expense, Category::Food, 50, date).await;

        let stats = monthly_stats(&conn, user.id, 1, 2024).await.unwrap();
        assert_eq!(stats.income, Decimal::from(3000));
        assert_eq!(stats.expenses, Decimal::from(50));
        assert_eq!(stats.balance, Decimal::from(2950));
    }

    #[tokio::test]
    async fn test_category_breakdown_omits_empty() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        record(&conn, &user, TransactionKind::Expense, Category::Food, 120, date).await;
        record(&conn, &user, TransactionKind::Expense, Category::Food, 30, date).await;
        record(&conn, &user, TransactionKind::Expense, Category::Transport, 45, date).await;

        let breakdown = category_breakdown(&conn, user.id, 1, 2024).await.unwrap();
        assert_eq!(
            breakdown,
            vec![
                (Category::Food, Decimal::from(150)),
                (Category::Transport, Decimal::from(45)),
            ]
        );
    }

    #[tokio::test]
    async fn test_spending_trends_oldest_first() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;

        record(
            &conn,
            &user,
            TransactionKind::Expense,
            Category::Food,
            10,
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
        )
        .await;
        record(
            &conn,
            &user,
            TransactionKind::Expense,
            Category::Food,
            20,
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        )
        .await;

        let until = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let trends = spending_trends(&conn, user.id, 3, until).await.unwrap();
        assert_eq!(trends.len(), 3);
        assert_eq!((trends[0].month, trends[0].year), (1, 2024));
        assert_eq!(trends[0].expenses, Decimal::ZERO);
        assert_eq!(trends[1].expenses, Decimal::from(10));
        assert_eq!(trends[2].expenses, Decimal::from(20));
    }

    #[tokio::test]
    async fn test_budget_usage() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let budget = conn
            .insert(Budget {
                user_id: user.id,
                category: Category::Food,
                limit: Decimal::from(200),
                month: 1,
                year: 2024,
                ..Default::default()
            })
            .await
            .unwrap();

        record(&conn, &user, TransactionKind::Expense, Category::Food, 50, date).await;
        // Different category and different month stay out
        record(&conn, &user, TransactionKind::Expense, Category::Transport, 99, date).await;
        record(
            &conn,
            &user,
            TransactionKind::Expense,
            Category::Food,
            99,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .await;

        let usage = budget_usage(&conn, &budget).await.unwrap();
        assert_eq!(usage.spent, Decimal::from(50));
        assert_eq!(usage.percentage, Decimal::from(25));
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        record(&conn, &user, TransactionKind::Income, Category::Salary, 3000, date).await;
        record(&conn, &user, TransactionKind::Expense, Category::Food, 50, date).await;

        let stats = dashboard_stats(&conn, user.id, 1, 2024).await.unwrap();
        assert_eq!(stats.balance, Decimal::from(2950));
        assert_eq!(stats.transactions, 2);
        assert_eq!(stats.unread_alerts, 0);
    }
}
