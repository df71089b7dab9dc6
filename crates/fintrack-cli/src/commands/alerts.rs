use anyhow::Result;
use clap::{Args, Subcommand};

use fintrack_data::{
    Budget, BudgetAlert, BudgetAlertFilter, Query, Retrieve, Update,
};
use fintrack_db::Connection;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Alerts {
    /// List budget alerts
    #[clap(name = "list")]
    List(ListAlerts),
    /// Mark an alert as read
    #[clap(name = "mark-read")]
    MarkRead(MarkAlertRead),
}

impl Alerts {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Alerts::List(cmd) => cmd.run(db).await,
            Alerts::MarkRead(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListAlerts {
    #[clap(short, long)]
    pub user_id: Option<u32>,
    /// Only show alerts that have not been read yet
    #[clap(long)]
    pub unread: bool,
}

impl ListAlerts {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = BudgetAlertFilter {
            user_id: self.user_id,
            is_read: self.unread.then_some(false),
            ..Default::default()
        };

        let alerts: Vec<BudgetAlert> = db.query(&filter).await?;
        let mut rows: Vec<(BudgetAlert, Budget)> =
            Vec::with_capacity(alerts.len());
        for alert in alerts {
            let budget = alert.get_budget(db).await?;
            rows.push((alert, budget));
        }

        println!("{} alerts.", rows.len());
        rows.print_formatted();

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct MarkAlertRead {
    #[clap(short, long)]
    pub id: u32,
}

impl MarkAlertRead {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let alert: BudgetAlert = db.retrieve(self.id).await?;
        db.update(BudgetAlert {
            is_read: true,
            ..alert
        })
        .await?;
        println!("Alert {} marked as read.", self.id);
        Ok(())
    }
}
