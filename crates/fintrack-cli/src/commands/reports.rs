use anyhow::{anyhow, Result};
use chrono::Datelike;
use clap::{Args, Subcommand};

use fintrack_budget::datetime;
use fintrack_budget::stats::{
    category_breakdown, dashboard_stats, monthly_stats, spending_trends,
};
use fintrack_db::Connection;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Reports {
    /// Income, spending and balance for one month
    #[clap(name = "summary")]
    Summary(MonthlySummary),
    /// Spending by category for one month
    #[clap(name = "breakdown")]
    Breakdown(CategoryBreakdown),
    /// Month by month income and spending
    #[clap(name = "trends")]
    Trends(SpendingTrends),
    /// Current month at a glance
    #[clap(name = "dashboard")]
    Dashboard(Dashboard),
}

impl Reports {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Reports::Summary(cmd) => cmd.run(db).await,
            Reports::Breakdown(cmd) => cmd.run(db).await,
            Reports::Trends(cmd) => cmd.run(db).await,
            Reports::Dashboard(cmd) => cmd.run(db).await,
        }
    }
}

fn resolve_month(month: Option<u32>, year: Option<i32>) -> Result<(u32, i32)> {
    let today = datetime::today();
    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());
    if !(1..=12).contains(&month) {
        return Err(anyhow!("Month must be between 1 and 12."));
    }
    Ok((month, year))
}

#[derive(Args, Debug)]
pub struct MonthlySummary {
    #[clap(short, long)]
    pub user_id: u32,
    #[clap(short, long)]
    pub month: Option<u32>,
    #[clap(short, long)]
    pub year: Option<i32>,
    /// Print as JSON
    #[clap(long)]
    pub json: bool,
}

impl MonthlySummary {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let (month, year) = resolve_month(self.month, self.year)?;
        let stats = monthly_stats(db, self.user_id, month, year).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            stats.print_formatted();
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CategoryBreakdown {
    #[clap(short, long)]
    pub user_id: u32,
    #[clap(short, long)]
    pub month: Option<u32>,
    #[clap(short, long)]
    pub year: Option<i32>,
}

impl CategoryBreakdown {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let (month, year) = resolve_month(self.month, self.year)?;
        let breakdown =
            category_breakdown(db, self.user_id, month, year).await?;

        println!("Spending {}/{}", month, year);
        for (category, total) in breakdown {
            println!("{:<20}\t{:>12}", category.label(), total);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SpendingTrends {
    #[clap(short, long)]
    pub user_id: u32,
    #[clap(short, long, default_value_t = 6)]
    pub months: u32,
    /// Print as JSON
    #[clap(long)]
    pub json: bool,
}

impl SpendingTrends {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let trends = spending_trends(
            db,
            self.user_id,
            self.months,
            datetime::today(),
        )
        .await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&trends)?);
        } else {
            trends.print_formatted();
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct Dashboard {
    #[clap(short, long)]
    pub user_id: u32,
}

impl Dashboard {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let today = datetime::today();
        let stats =
            dashboard_stats(db, self.user_id, today.month(), today.year())
                .await?;
        stats.print_formatted();
        Ok(())
    }
}
