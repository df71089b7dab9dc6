use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Subcommand};
use inquire::Confirm;
use rust_decimal::Decimal;

use fintrack_budget::alerts::{CheckBudgetAlerts, RecordTransaction};
use fintrack_budget::datetime::{self, month_bounds};
use fintrack_data::{
    Category, Delete, Query, Retrieve, Transaction, TransactionFilter,
    TransactionKind, Update, User, UserFilter,
};
use fintrack_db::Connection;

use crate::formatting::{print_alert_notice, PrintFormatted};

#[derive(Subcommand, Debug)]
pub enum Transactions {
    /// Record a transaction
    #[clap(name = "add")]
    Add(AddTransaction),
    /// List transactions
    #[clap(name = "list")]
    List(ListTransactions),
    /// Update a transaction
    #[clap(name = "set")]
    Set(SetTransaction),
    /// Delete a transaction
    #[clap(name = "delete")]
    Delete(DeleteTransaction),
}

impl Transactions {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Transactions::Add(cmd) => cmd.run(db).await,
            Transactions::List(cmd) => cmd.run(db).await,
            Transactions::Set(cmd) => cmd.run(db).await,
            Transactions::Delete(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddTransaction {
    #[clap(short, long)]
    pub user_id: u32,
    #[clap(short, long, default_value = "expense")]
    pub kind: TransactionKind,
    #[clap(short, long)]
    pub category: Category,
    #[clap(short, long)]
    pub amount: Decimal,
    #[clap(short, long)]
    pub description: Option<String>,
    /// Defaults to today
    #[clap(long)]
    pub date: Option<NaiveDate>,
}

impl AddTransaction {
    pub async fn run(self, db: &Connection) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(anyhow!("Amount must be positive."));
        }

        // Make sure the owner exists before writing anything
        let user: User = db.retrieve(self.user_id).await?;

        let transaction = Transaction {
            user_id: user.id,
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            description: self.description.unwrap_or_default(),
            date: self.date.unwrap_or_else(datetime::today),
            ..Default::default()
        };

        let (transaction, alert) = transaction.record(db).await?;
        println!("Transaction recorded with id {}.", transaction.id);
        if let Some(alert) = alert {
            print_alert_notice(&alert, db).await?;
        }

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListTransactions {
    #[clap(long)]
    pub user_id: Option<u32>,
    #[clap(long)]
    pub username: Option<String>,
    #[clap(short, long)]
    pub kind: Option<TransactionKind>,
    #[clap(short, long)]
    pub category: Option<Category>,
    /// Limit to a calendar month (year defaults to the current one)
    #[clap(short, long)]
    pub month: Option<u32>,
    #[clap(short, long)]
    pub year: Option<i32>,
    #[clap(long)]
    pub after_date: Option<NaiveDate>,
    #[clap(long)]
    pub before_date: Option<NaiveDate>,
}

impl ListTransactions {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let mut filter = TransactionFilter {
            user_id: self.user_id,
            kind: self.kind,
            category: self.category,
            date_after: self.after_date,
            date_before: self.before_date,
            ..Default::default()
        };

        if let Some(username) = self.username {
            let users: Vec<User> = db
                .query(&UserFilter {
                    username: Some(username),
                    ..Default::default()
                })
                .await?;
            let user = users.first().ok_or(anyhow!("user not found"))?;
            filter.user_id = Some(user.id);
        }

        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(anyhow!("Month must be between 1 and 12."));
            }
            let year = self.year.unwrap_or_else(|| datetime::today().year());
            let (first, last) = month_bounds(year, month);
            filter.date_after = Some(first);
            filter.date_before = Some(last);
        }

        let transactions: Vec<Transaction> = db.query(&filter).await?;
        println!("{} transactions.", transactions.len());
        transactions.print_formatted();

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SetTransaction {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub kind: Option<TransactionKind>,
    #[clap(short, long)]
    pub category: Option<Category>,
    #[clap(short, long)]
    pub amount: Option<Decimal>,
    #[clap(short, long)]
    pub description: Option<String>,
    #[clap(long)]
    pub date: Option<NaiveDate>,
}

impl SetTransaction {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let transaction: Transaction = db.retrieve(self.id).await?;
        let mut update = transaction.clone();

        if let Some(kind) = self.kind {
            update.kind = kind;
        }
        if let Some(category) = self.category {
            update.category = category;
        }
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                return Err(anyhow!("Amount must be positive."));
            }
            update.amount = amount;
        }
        if let Some(description) = self.description {
            update.description = description;
        }
        if let Some(date) = self.date {
            update.date = date;
        }

        println!();
        update.print_formatted();
        println!();
        let confirm = Confirm::new("Update transaction?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let transaction = db.update(update).await?;
        if let Some(alert) = transaction.check_budget_alerts(db).await? {
            print_alert_notice(&alert, db).await?;
        }

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteTransaction {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteTransaction {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let transaction: Transaction = db.retrieve(self.id).await?;
        println!();
        transaction.print_formatted();
        println!();
        let confirm = Confirm::new("Delete transaction?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }
        db.delete(transaction).await?;
        Ok(())
    }
}
