use clap::{Parser, Subcommand};

use crate::commands::{Alerts, Budgets, Reports, Transactions, Users};

#[derive(Parser, Debug)]
#[clap(name = "fintrack", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to the tracker database
    #[clap(long, env = "FINTRACK_DB", default_value = "fintrack.sqlite3")]
    pub db: String,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the database
    #[clap(name = "init")]
    Init,

    /// Manage users
    #[clap(subcommand, name = "user")]
    User(Users),

    /// Manage transactions
    #[clap(subcommand, name = "tx")]
    Tx(Transactions),

    /// Manage budgets
    #[clap(subcommand, name = "budget")]
    Budget(Budgets),

    /// Budget alerts
    #[clap(subcommand, name = "alert")]
    Alert(Alerts),

    /// Spending reports
    #[clap(subcommand, name = "report")]
    Report(Reports),
}
