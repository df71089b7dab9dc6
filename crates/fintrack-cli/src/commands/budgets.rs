use anyhow::{anyhow, Result};
use chrono::Datelike;
use clap::{Args, Subcommand};
use inquire::Confirm;
use rust_decimal::Decimal;

use fintrack_budget::datetime;
use fintrack_budget::stats::{budget_usage, BudgetUsage};
use fintrack_data::{
    Budget, BudgetFilter, Category, Delete, Insert, Query, Retrieve, Update,
    User,
};
use fintrack_db::Connection;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Budgets {
    /// Set up a budget
    #[clap(name = "add")]
    Add(AddBudget),
    /// List budgets with their current usage
    #[clap(name = "list")]
    List(ListBudgets),
    /// Change a budget's limit
    #[clap(name = "set")]
    Set(SetBudget),
    /// Delete a budget
    #[clap(name = "delete")]
    Delete(DeleteBudget),
}

impl Budgets {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Budgets::Add(cmd) => cmd.run(db).await,
            Budgets::List(cmd) => cmd.run(db).await,
            Budgets::Set(cmd) => cmd.run(db).await,
            Budgets::Delete(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddBudget {
    #[clap(short, long)]
    pub user_id: u32,
    #[clap(short, long)]
    pub category: Category,
    #[clap(short, long)]
    pub limit: Decimal,
    /// Defaults to the current month
    #[clap(short, long)]
    pub month: Option<u32>,
    #[clap(short, long)]
    pub year: Option<i32>,
}

impl AddBudget {
    pub async fn run(self, db: &Connection) -> Result<()> {
        if !self.category.is_expense() {
            return Err(anyhow!(
                "{} is an income category and can not be budgeted.",
                self.category
            ));
        }
        if self.limit < Decimal::ZERO {
            return Err(anyhow!("Limit must not be negative."));
        }

        let today = datetime::today();
        let month = self.month.unwrap_or_else(|| today.month());
        let year = self.year.unwrap_or_else(|| today.year());
        if !(1..=12).contains(&month) {
            return Err(anyhow!("Month must be between 1 and 12."));
        }

        let user: User = db.retrieve(self.user_id).await?;

        // One budget per user, category and month
        let existing: Vec<Budget> = db
            .query(&BudgetFilter {
                user_id: Some(user.id),
                category: Some(self.category),
                month: Some(month),
                year: Some(year),
                ..Default::default()
            })
            .await?;
        if !existing.is_empty() {
            return Err(anyhow!(
                "A {} budget for {}/{} already exists.",
                self.category,
                month,
                year
            ));
        }

        let budget = Budget {
            user_id: user.id,
            category: self.category,
            limit: self.limit,
            month,
            year,
            ..Default::default()
        };

        println!();
        budget.print_formatted();
        println!();
        let confirm = Confirm::new("Add budget?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let budget = db.insert(budget).await?;
        println!("Budget added with id {}.", budget.id);

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListBudgets {
    #[clap(short, long)]
    pub user_id: Option<u32>,
    #[clap(short, long)]
    pub month: Option<u32>,
    #[clap(short, long)]
    pub year: Option<i32>,
}

impl ListBudgets {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = BudgetFilter {
            user_id: self.user_id,
            month: self.month,
            year: self.year,
            ..Default::default()
        };

        let budgets: Vec<Budget> = db.query(&filter).await?;
        let mut usage: Vec<BudgetUsage> = Vec::with_capacity(budgets.len());
        for budget in &budgets {
            usage.push(budget_usage(db, budget).await?);
        }

        println!("{} budgets.", usage.len());
        usage.print_formatted();

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SetBudget {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub limit: Decimal,
}

impl SetBudget {
    pub async fn run(self, db: &Connection) -> Result<()> {
        if self.limit < Decimal::ZERO {
            return Err(anyhow!("Limit must not be negative."));
        }

        let budget: Budget = db.retrieve(self.id).await?;
        let update = Budget {
            limit: self.limit,
            ..budget.clone()
        };

        println!();
        update.print_formatted();
        println!();
        let confirm = Confirm::new("Update budget?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        db.update(update).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteBudget {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteBudget {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let budget: Budget = db.retrieve(self.id).await?;
        println!();
        budget.print_formatted();
        println!();
        let confirm = Confirm::new("Delete budget and its alerts?")
            .with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }
        db.delete(budget).await?;
        Ok(())
    }
}
