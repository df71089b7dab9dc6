use anyhow::Result;

use fintrack_budget::stats::{BudgetUsage, DashboardStats, MonthlyStats};
use fintrack_data::{Budget, BudgetAlert, Transaction, User};
use fintrack_db::Connection;

pub trait PrintFormatted {
    fn print_formatted(&self);
}

impl PrintFormatted for User {
    fn print_formatted(&self) {
        println!("Id:\t\t{}", self.id);
        println!("Username:\t{}", self.username);
        println!("Email:\t\t{}", self.email);
        println!("Created:\t{}", self.created_at);
    }
}

impl PrintFormatted for Vec<User> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<24}\t{:<30}\t{}",
            "ID", "Username", "Email", "Created"
        );
        println!("{:-<100}", "-");
        for user in self {
            println!(
                "{:>4}\t{:<24}\t{:<30}\t{}",
                user.id, user.username, user.email, user.created_at
            );
        }
    }
}

impl PrintFormatted for Transaction {
    fn print_formatted(&self) {
        println!("Id:\t\t{}", self.id);
        println!("User:\t\t{}", self.user_id);
        println!("Kind:\t\t{}", self.kind);
        println!("Category:\t{}", self.category.label());
        println!("Amount:\t\t{}", self.amount);
        println!("Date:\t\t{}", self.date);
        println!("Description:\t{}", self.description);
    }
}

impl PrintFormatted for Vec<Transaction> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<12}\t{:<8}\t{:<16}\t{:>12}\t{}",
            "ID", "Date", "Kind", "Category", "Amount", "Description"
        );
        println!("{:-<120}", "-");
        for tx in self {
            println!(
                "{:>4}\t{:<12}\t{:<8}\t{:<16}\t{:>12}\t{}",
                tx.id,
                tx.date.to_string(),
                tx.kind.to_string(),
                tx.category.to_string(),
                tx.amount.to_string(),
                tx.description
            );
        }
    }
}

impl PrintFormatted for Budget {
    fn print_formatted(&self) {
        println!("Id:\t\t{}", self.id);
        println!("User:\t\t{}", self.user_id);
        println!("Category:\t{}", self.category.label());
        println!("Month:\t\t{}/{}", self.month, self.year);
        println!("Limit:\t\t{}", self.limit);
    }
}

impl PrintFormatted for Vec<BudgetUsage> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<16}\t{:<8}\t{:>12}\t{:>12}\t{:>8}",
            "ID", "Category", "Month", "Limit", "Spent", "Used"
        );
        println!("{:-<100}", "-");
        for usage in self {
            let budget = &usage.budget;
            println!(
                "{:>4}\t{:<16}\t{:<8}\t{:>12}\t{:>12}\t{:>7}%",
                budget.id,
                budget.category.to_string(),
                format!("{}/{}", budget.month, budget.year),
                budget.limit.to_string(),
                usage.spent.to_string(),
                usage.percentage.round_dp(2).to_string()
            );
        }
    }
}

impl PrintFormatted for Vec<(BudgetAlert, Budget)> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<10}\t{:<16}\t{:<8}\t{:>12}\t{:>8}\t{}",
            "ID", "Level", "Category", "Month", "Spent", "Used", "Read"
        );
        println!("{:-<120}", "-");
        for (alert, budget) in self {
            let read = if alert.is_read { "read" } else { "" };
            println!(
                "{:>4}\t{:<10}\t{:<16}\t{:<8}\t{:>12}\t{:>7}%\t{}",
                alert.id,
                alert.level.to_string(),
                budget.category.to_string(),
                format!("{}/{}", budget.month, budget.year),
                alert.spent_amount.to_string(),
                alert.percentage.round_dp(2).to_string(),
                read
            );
        }
    }
}

impl PrintFormatted for MonthlyStats {
    fn print_formatted(&self) {
        println!("Month:\t\t{}/{}", self.month, self.year);
        println!("Income:\t\t{}", self.income);
        println!("Expenses:\t{}", self.expenses);
        println!("Balance:\t{}", self.balance);
    }
}

impl PrintFormatted for Vec<MonthlyStats> {
    fn print_formatted(&self) {
        println!(
            "{:<8}\t{:>12}\t{:>12}\t{:>12}",
            "Month", "Income", "Expenses", "Balance"
        );
        println!("{:-<60}", "-");
        for stats in self {
            println!(
                "{:<8}\t{:>12}\t{:>12}\t{:>12}",
                format!("{}/{}", stats.month, stats.year),
                stats.income.to_string(),
                stats.expenses.to_string(),
                stats.balance.to_string()
            );
        }
    }
}

impl PrintFormatted for DashboardStats {
    fn print_formatted(&self) {
        println!("Income:\t\t\t{}", self.total_income);
        println!("Expenses:\t\t{}", self.total_expenses);
        println!("Balance:\t\t{}", self.balance);
        println!("Transactions:\t\t{}", self.transactions);
        println!("Unread alerts:\t\t{}", self.unread_alerts);
    }
}

/// One line notice after a transaction write raised an alert.
pub async fn print_alert_notice(
    alert: &BudgetAlert,
    db: &Connection,
) -> Result<()> {
    let budget = alert.get_budget(db).await?;
    println!(
        "{} alert: {}% of the {} budget for {}/{} used ({} of {}).",
        alert.level,
        alert.percentage.round_dp(2),
        budget.category,
        budget.month,
        budget.year,
        alert.spent_amount,
        budget.limit
    );
    Ok(())
}
