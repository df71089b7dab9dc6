use anyhow::Result;
use tracing_subscriber::EnvFilter;

use fintrack_cli::cli::{Cli, Command};
use fintrack_db::{schema, Connection};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::init();

    let db = Connection::open(&cli.db).await?;
    match cli.command {
        Command::Init => schema::install(&db).await,
        Command::User(cmd) => cmd.run(&db).await,
        Command::Tx(cmd) => cmd.run(&db).await,
        Command::Budget(cmd) => cmd.run(&db).await,
        Command::Alert(cmd) => cmd.run(&db).await,
        Command::Report(cmd) => cmd.run(&db).await,
    }?;

    Ok(())
}
